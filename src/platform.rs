use std::fmt::{self, Write};

const EXE_SUFFIX: &str = ".exe";
const ZIP_FORMAT: &str = ".zip";
const TAR_GZ_FORMAT: &str = ".tar.gz";

/// Operating system family as it appears in release asset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    pub fn name(self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }
}

/// The platform a binary is being selected for.
///
/// Always passed explicitly so that asset naming can be exercised for any
/// (OS, architecture) pair without touching process-global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
    pub arch: String,
}

impl Platform {
    pub fn new(os: Os, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    /// Detect the running host, mapped to release-asset naming conventions.
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "windows" => Os::Windows,
            "macos" => Os::Darwin,
            _ => Os::Linux,
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            other => other,
        };

        Self::new(os, arch)
    }

    /// Archive container format upstream projects publish for this platform.
    pub fn archive_format(&self) -> &'static str {
        if self.os == Os::Windows {
            ZIP_FORMAT
        } else {
            TAR_GZ_FORMAT
        }
    }

    /// Executable file name for a base name, with the platform suffix applied.
    pub fn binary_name(&self, exec_name: &str) -> String {
        if self.os == Os::Windows {
            format!("{exec_name}{EXE_SUFFIX}")
        } else {
            exec_name.to_string()
        }
    }

    /// Append the executable suffix (or nothing) to an in-progress name
    /// builder, returning the number of bytes written.
    pub fn write_suffix_to<W: Write>(&self, writer: &mut W) -> Result<usize, fmt::Error> {
        if self.os != Os::Windows {
            return Ok(0);
        }

        writer.write_str(EXE_SUFFIX)?;
        Ok(EXE_SUFFIX.len())
    }

    pub fn os_name(&self) -> &'static str {
        self.os.name()
    }
}
