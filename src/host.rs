//! Host environment detection
//!
//! Reads the facts the installer gates on: who we are running as, which
//! distribution this is, and how the panel will be reachable afterwards.
//!
//! # Design
//!
//! - Detection happens once, in `main`, and the result is passed around as a
//!   plain `HostEnvironment` value. Steps never look at ambient process state.
//! - OS identity comes from `/etc/os-release` (parsed in Rust, no `lsb_release`).
//! - Address lookup uses a connected UDP socket, which consults the routing
//!   table without sending anything.

use crate::config::InstallerConfig;
use crate::process_guard::CommandProcessGroup;
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, UdpSocket};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Parsed subset of os-release(5).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    /// `ID`, lowercased
    pub id: String,
    /// `PRETTY_NAME`, falling back to `NAME` then `ID`
    pub pretty_name: String,
    /// `ID_LIKE`, split on whitespace
    pub id_like: Vec<String>,
    /// `VERSION_CODENAME`
    pub version_codename: Option<String>,
    /// `UBUNTU_CODENAME` (set by Ubuntu derivatives such as Mint)
    pub ubuntu_codename: Option<String>,
}

impl OsRelease {
    /// Parse os-release contents. Unknown keys, comments and malformed lines
    /// are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut fields: HashMap<&str, String> = HashMap::new();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            fields.insert(key.trim(), unquote(value.trim()));
        }

        let non_empty = |key: &str| fields.get(key).filter(|v| !v.is_empty()).cloned();

        let id = non_empty("ID").unwrap_or_default().to_lowercase();
        let pretty_name = non_empty("PRETTY_NAME")
            .or_else(|| non_empty("NAME"))
            .unwrap_or_else(|| id.clone());
        let id_like = non_empty("ID_LIKE")
            .map(|v| v.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default();

        Self {
            id,
            pretty_name,
            id_like,
            version_codename: non_empty("VERSION_CODENAME"),
            ubuntu_codename: non_empty("UBUNTU_CODENAME"),
        }
    }

    /// Read and parse an os-release file.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    fn is_ubuntu_like(&self) -> bool {
        self.id == "ubuntu" || self.id_like.iter().any(|l| l == "ubuntu")
    }

    fn is_debian_like(&self) -> bool {
        self.id == "debian" || self.id_like.iter().any(|l| l == "debian")
    }
}

/// Strip one layer of matching single or double quotes.
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

/// Facts about the host, captured once at startup.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    pub os: OsRelease,
    pub is_root: bool,
}

impl HostEnvironment {
    pub fn new(os: OsRelease, is_root: bool) -> Self {
        Self { os, is_root }
    }

    /// Detect the running host.
    ///
    /// Never fails: an unreadable os-release yields an empty identity, which
    /// the distro check then rejects.
    pub fn detect(config: &InstallerConfig) -> Self {
        let path = config.os_release_file();
        let os = match OsRelease::from_file(&path) {
            Ok(os) => os,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                OsRelease::default()
            }
        };
        let is_root = is_running_as_root();

        debug!("Host detection: os={:?} root={}", os.id, is_root);
        Self { os, is_root }
    }

    pub fn os_id(&self) -> &str {
        &self.os.id
    }

    pub fn os_pretty_name(&self) -> &str {
        if self.os.pretty_name.is_empty() {
            "unknown"
        } else {
            &self.os.pretty_name
        }
    }

    /// Whether this host belongs to the accepted Debian family.
    pub fn is_supported(&self, accepted: &[String]) -> bool {
        if self.os.id.is_empty() {
            return false;
        }
        accepted.iter().any(|a| *a == self.os.id)
            || self.os.is_debian_like()
            || self.os.is_ubuntu_like()
    }

    /// Repository flavour (`ubuntu` or `debian`) serving this host.
    pub fn repo_distro(&self) -> &'static str {
        if self.os.is_ubuntu_like() || self.os.id == "pop" || self.os.id == "neon" {
            "ubuntu"
        } else {
            "debian"
        }
    }

    /// Release codename to put in the source list.
    ///
    /// Ubuntu derivatives carry their own `VERSION_CODENAME` (e.g. Mint's
    /// `vera`), so `UBUNTU_CODENAME` wins when the repository is Ubuntu's.
    pub fn codename(&self) -> Option<&str> {
        let ubuntu = self.os.ubuntu_codename.as_deref();
        let version = self.os.version_codename.as_deref();
        if self.repo_distro() == "ubuntu" {
            ubuntu.or(version)
        } else {
            version
        }
    }
}

impl fmt::Display for HostEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (root: {})", self.os_pretty_name(), self.is_root)
    }
}

/// Check if running as root (EUID 0)
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

// ============================================================================
// Network
// ============================================================================

/// Source of the address the panel will be reachable at.
pub trait NetworkInfo {
    /// Primary address of this host, if one can be determined.
    fn primary_ip(&self) -> Option<IpAddr>;
}

/// Address lookup against the live host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNetwork;

impl NetworkInfo for SystemNetwork {
    fn primary_ip(&self) -> Option<IpAddr> {
        route_lookup().or_else(hostname_lookup)
    }
}

/// Ask the kernel which local address would route to a public host.
fn route_lookup() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("1.1.1.1:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    usable(ip)
}

/// First address reported by `hostname -I`.
fn hostname_lookup() -> Option<IpAddr> {
    let output = Command::new("hostname")
        .arg("-I")
        .in_new_process_group()
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    first_address(&String::from_utf8_lossy(&output.stdout))
}

fn first_address(listing: &str) -> Option<IpAddr> {
    listing
        .split_whitespace()
        .filter_map(|token| token.parse::<IpAddr>().ok())
        .find_map(usable)
}

fn usable(ip: IpAddr) -> Option<IpAddr> {
    if ip.is_unspecified() || ip.is_loopback() {
        None
    } else {
        Some(ip)
    }
}
