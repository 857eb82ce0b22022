use chrono::{Local, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::{Getenv, SKIP_LAST_USE_ENV};

const FILE_NAME: &str = "last-use.txt";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read the last-use date of an installation directory.
///
/// A missing file means the version was never used (or just installed) and
/// is not an error; any other failure is advisory and logged.
pub fn read(dir_path: &Path) -> Option<NaiveDate> {
    let content = match fs::read_to_string(dir_path.join(FILE_NAME)) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir_path.display(), "no last-use file");

            return None;
        }
        Err(err) => {
            tracing::warn!(dir = %dir_path.display(), error = %err, "unable to read last-use file");

            return None;
        }
    };

    match parse_date(&content) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(dir = %dir_path.display(), error = %err, "unable to parse date in last-use file");

            None
        }
    }
}

/// Record today's date as the last use of an installation directory.
///
/// Best-effort: every failure is logged and swallowed so usage tracking can
/// never abort the caller's operation. Honors the skip flag from the
/// environment; a malformed flag value is logged and treated as "do not
/// skip".
pub fn write_now(dir_path: &Path, getenv: &Getenv) {
    match getenv.bool(false, SKIP_LAST_USE_ENV) {
        Ok(true) => return,
        Ok(false) => {}
        Err(err) => {
            tracing::warn!(error = %err, "unable to read skip flag, recording last use anyway");
        }
    }

    let path = dir_path.join(FILE_NAME);
    let today = Local::now().date_naive().format(DATE_FORMAT).to_string();

    if let Err(err) = fs::write(&path, &today) {
        tracing::warn!(path = %path.display(), error = %err, "unable to write last-use file");
        return;
    }
    if let Err(err) = restrict_to_owner(&path) {
        tracing::warn!(path = %path.display(), error = %err, "unable to restrict last-use file permissions");
    }
}

fn parse_date(content: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(content.trim(), DATE_FORMAT)
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
