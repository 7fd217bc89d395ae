//! Installer configuration
//!
//! Everything the installer would otherwise read ad hoc from the process or
//! hardcode inline lives here. `InstallerConfig::default()` is what the
//! binary runs with; tests build their own with a temporary `root`.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Debian-family OS identifiers accepted without consulting `ID_LIKE`.
pub const DEBIAN_FAMILY: &[&str] = &[
    "debian",
    "ubuntu",
    "raspbian",
    "linuxmint",
    "pop",
    "elementary",
    "zorin",
    "kali",
    "neon",
];

/// Packages required before the repository can be registered.
pub const BASE_DEPENDENCIES: &[&str] = &["curl", "gnupg", "ca-certificates", "apt-transport-https"];

/// Hardcoded installer settings.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Prefix applied to every file the installer reads or writes.
    /// `/` on a real host.
    pub root: PathBuf,
    /// OS identification file, relative to `root`.
    pub os_release_path: PathBuf,
    /// Package providing the panel.
    pub package_name: String,
    /// Binary that proves the package is already installed.
    pub binary_name: String,
    /// systemd unit name.
    pub service_name: String,
    pub dependencies: Vec<String>,
    /// packagecloud repository base, without the distro suffix.
    pub repo_url: String,
    /// ASCII-armored signing key.
    pub key_url: String,
    /// Dearmored keyring location as seen by APT.
    pub keyring_path: PathBuf,
    /// APT source list location as seen by APT.
    pub source_list_path: PathBuf,
    pub accepted_distros: Vec<String>,
    /// Panel web port.
    pub web_port: u16,
    /// Daemon SFTP port.
    pub sftp_port: u16,
    /// Wait between starting the service and checking it.
    pub settle_delay: Duration,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            os_release_path: PathBuf::from("/etc/os-release"),
            package_name: "pufferpanel".to_string(),
            binary_name: "pufferpanel".to_string(),
            service_name: "pufferpanel".to_string(),
            dependencies: BASE_DEPENDENCIES.iter().map(|s| s.to_string()).collect(),
            repo_url: "https://packagecloud.io/pufferpanel/pufferpanel".to_string(),
            key_url: "https://packagecloud.io/pufferpanel/pufferpanel/gpgkey".to_string(),
            keyring_path: PathBuf::from("/usr/share/keyrings/pufferpanel-archive-keyring.gpg"),
            source_list_path: PathBuf::from("/etc/apt/sources.list.d/pufferpanel.list"),
            accepted_distros: DEBIAN_FAMILY.iter().map(|s| s.to_string()).collect(),
            web_port: 8080,
            sftp_port: 5657,
            settle_delay: Duration::from_secs(5),
        }
    }
}

impl InstallerConfig {
    /// Default settings rebased onto another filesystem root.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolve a host-absolute path against `root`.
    pub fn host_path(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }

    /// On-disk location of the keyring.
    pub fn keyring_file(&self) -> PathBuf {
        self.host_path(&self.keyring_path)
    }

    /// On-disk location of the source list.
    pub fn source_list_file(&self) -> PathBuf {
        self.host_path(&self.source_list_path)
    }

    /// On-disk location of os-release.
    pub fn os_release_file(&self) -> PathBuf {
        self.host_path(&self.os_release_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InstallerConfig::default();
        assert_eq!(config.root, PathBuf::from("/"));
        assert_eq!(config.web_port, 8080);
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert!(config.dependencies.contains(&"gnupg".to_string()));
        assert!(config.accepted_distros.contains(&"ubuntu".to_string()));
    }

    #[test]
    fn test_host_path_on_real_root() {
        let config = InstallerConfig::default();
        assert_eq!(
            config.keyring_file(),
            PathBuf::from("/usr/share/keyrings/pufferpanel-archive-keyring.gpg")
        );
    }

    #[test]
    fn test_host_path_rebased() {
        let config = InstallerConfig::rooted_at("/tmp/sandbox");
        assert_eq!(
            config.source_list_file(),
            PathBuf::from("/tmp/sandbox/etc/apt/sources.list.d/pufferpanel.list")
        );
        assert_eq!(
            config.os_release_file(),
            PathBuf::from("/tmp/sandbox/etc/os-release")
        );
    }
}
