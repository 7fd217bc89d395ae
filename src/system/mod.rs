//! Host capabilities the provisioning steps drive.
//!
//! Each capability is a trait so the sequencer can run against scripted
//! fakes. Real implementations shell out through `run_command_safe`.
//! Failures are reported as `anyhow` errors; the calling step decides which
//! `ProvisionError` kind they become.

pub mod apt;
pub mod keyring;
pub mod pufferpanel;
pub mod systemd;

use anyhow::Result;
use std::path::PathBuf;

pub use apt::{Apt, WhichLocator};
pub use keyring::HttpKeyFetcher;
pub use pufferpanel::{PufferPanelCli, UserAddArgs};
pub use systemd::Systemd;

/// Distribution package manager.
pub trait PackageManager {
    /// Refresh the package index.
    fn update(&self) -> Result<()>;

    /// Install the named packages non-interactively.
    fn install_packages(&self, names: &[String]) -> Result<()>;

    /// Whether a package is installed.
    fn is_package_installed(&self, name: &str) -> bool;
}

/// Lookup of executables on `PATH`.
pub trait BinaryLocator {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Init system.
pub trait ServiceManager {
    /// Enable the unit at boot and start it now.
    fn enable_and_start(&self, service: &str) -> Result<()>;

    /// Whether the unit is currently active.
    fn is_active(&self, service: &str) -> bool;
}

/// Source of repository signing keys.
pub trait KeyFetcher {
    /// Download the key at `url` and return it in binary keyring form.
    fn fetch_key(&self, url: &str) -> Result<Vec<u8>>;
}

/// The panel's own account management CLI.
pub trait AccountCreator {
    fn create_user(&self, args: &UserAddArgs) -> Result<()>;
}
