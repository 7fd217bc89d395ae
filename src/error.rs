//! Error handling module for the PufferPanel installer
//!
//! Every provisioning step fails with one of these variants. All of them are
//! terminal: the sequencer stops at the first one and `main` turns it into a
//! single error line and a non-zero exit code.

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Main error type for the installer
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Not running with root privileges
    #[error("Permission error: {0}")]
    Permission(String),

    /// Host OS is not part of the Debian family
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// apt-get update/install returned non-zero
    #[error("Package manager error: {0}")]
    PackageManager(String),

    /// Key download, source-list write or index refresh failed
    #[error("Repository error: {0}")]
    Repository(String),

    /// The application's own CLI returned non-zero
    #[error("External command failed: {0}")]
    ExternalCommand(String),

    /// Service could not be enabled or did not come up
    #[error("Service start error: {0}")]
    ServiceStart(String),

    /// IO errors (terminal prompts, filesystem)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// `128 + SIGINT`
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Discriminant of [`ProvisionError`], used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    Permission,
    UnsupportedPlatform,
    PackageManager,
    Repository,
    ExternalCommand,
    ServiceStart,
    Io,
}

impl ErrorKind {
    /// Process exit code for this kind (sysexits.h where one fits).
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Permission => 77,
            Self::UnsupportedPlatform => 78,
            Self::Io => 74,
            Self::PackageManager => 100,
            Self::Repository => 101,
            Self::ExternalCommand => 102,
            Self::ServiceStart => 103,
        }
    }
}

// Convenient error constructors
impl ProvisionError {
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    pub fn unsupported_platform(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    pub fn package_manager(msg: impl Into<String>) -> Self {
        Self::PackageManager(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    pub fn external_command(msg: impl Into<String>) -> Self {
        Self::ExternalCommand(msg.into())
    }

    pub fn service_start(msg: impl Into<String>) -> Self {
        Self::ServiceStart(msg.into())
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Permission(_) => ErrorKind::Permission,
            Self::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            Self::PackageManager(_) => ErrorKind::PackageManager,
            Self::Repository(_) => ErrorKind::Repository,
            Self::ExternalCommand(_) => ErrorKind::ExternalCommand,
            Self::ServiceStart(_) => ErrorKind::ServiceStart,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this is a read cut short by Ctrl-C (e.g. at a prompt).
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }

    /// Exit code the process should terminate with
    ///
    /// An interrupted prompt exits like the SIGINT handler does.
    pub fn exit_code(&self) -> i32 {
        if self.is_interrupted() {
            return INTERRUPTED_EXIT_CODE;
        }
        self.kind().exit_code()
    }
}
