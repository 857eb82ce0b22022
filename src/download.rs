use futures_util::StreamExt;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{IacEnvError, Result};

/// Authentication attached to every outbound request for a tool.
///
/// Default is an anonymous request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub basic_auth: Option<(String, String)>,
    pub bearer_token: Option<String>,
}

impl RequestOptions {
    pub fn with_bearer_token(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token.map(str::to_string);
        self
    }
}

/// Fetch the raw bytes behind `url` in a single attempt.
///
/// The transfer aborts promptly when `cancel` fires, surfacing a cancellation
/// error distinct from transport failures. `verify` runs over the complete
/// body before the bytes are handed back. Retry policy, if any, belongs to
/// the caller.
pub async fn bytes<F>(
    client: &Client,
    cancel: &CancellationToken,
    url: &str,
    verify: F,
    options: &RequestOptions,
) -> Result<Vec<u8>>
where
    F: Fn(&[u8]) -> Result<()>,
{
    tracing::info!(%url, "downloading");

    let mut request = client.get(url);
    if let Some((user, password)) = &options.basic_auth {
        request = request.basic_auth(user, Some(password));
    }
    if let Some(token) = &options.bearer_token {
        request = request.bearer_auth(token);
    }

    let response = tokio::select! {
        _ = cancel.cancelled() => {
            return Err(IacEnvError::Cancelled { url: url.to_string() });
        }
        response = request.send() => response?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(IacEnvError::DownloadFailed {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut data = Vec::new();
    let mut stream = response.bytes_stream();
    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(IacEnvError::Cancelled { url: url.to_string() });
            }
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else {
            break;
        };
        data.extend_from_slice(&chunk?);
    }

    verify(&data)?;

    tracing::debug!(bytes = data.len(), %url, "download complete");

    Ok(data)
}

/// Join escaped path segments onto a base URL.
pub fn join_url(base: &str, segments: &[&str]) -> Result<String> {
    let mut url = Url::parse(base)?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| IacEnvError::UrlNotABase {
                url: base.to_string(),
            })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }

    Ok(url.into())
}

/// Apply a mirror/proxy prefix-rewrite rule to every candidate URL.
///
/// A rewritten URL that no longer parses aborts the whole operation rather
/// than letting a malformed URL reach the downloader.
pub fn apply_url_rewrite(
    rule: Option<&(String, String)>,
    urls: Vec<String>,
) -> Result<Vec<String>> {
    let Some((prefix, replacement)) = rule else {
        return Ok(urls);
    };

    urls.into_iter()
        .map(|url| {
            let rewritten = match url.strip_prefix(prefix.as_str()) {
                Some(rest) => format!("{replacement}{rest}"),
                None => url,
            };
            Url::parse(&rewritten)?;

            Ok(rewritten)
        })
        .collect()
}
