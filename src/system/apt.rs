//! APT package management via `apt-get` and `dpkg-query`.

use super::{BinaryLocator, PackageManager};
use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

// ============================================================================
// apt-get
// ============================================================================

/// Type-safe arguments for `apt-get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AptGetArgs {
    /// `apt-get update`
    Update,
    /// `apt-get install -y <packages>`
    Install(Vec<String>),
}

impl CommandArgs for AptGetArgs {
    fn program(&self) -> &'static str {
        "apt-get"
    }

    fn to_cli_args(&self) -> Vec<String> {
        match self {
            Self::Update => vec!["update".to_string()],
            Self::Install(packages) => {
                let mut args = vec!["install".to_string(), "-y".to_string()];
                args.extend(packages.iter().cloned());
                args
            }
        }
    }

    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())]
    }

    fn passthrough(&self) -> bool {
        true
    }
}

// ============================================================================
// dpkg-query
// ============================================================================

/// Type-safe arguments for `dpkg-query -W -f=${Status} <package>`.
#[derive(Debug, Clone)]
pub struct DpkgStatusArgs {
    pub package: String,
}

impl CommandArgs for DpkgStatusArgs {
    fn program(&self) -> &'static str {
        "dpkg-query"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-W".to_string(),
            "-f=${Status}".to_string(),
            self.package.clone(),
        ]
    }
}

/// Whether a dpkg status string means "installed".
fn status_is_installed(status: &str) -> bool {
    status.trim().ends_with(" installed")
}

// ============================================================================
// Implementations
// ============================================================================

/// `PackageManager` backed by the host's APT.
#[derive(Debug, Default, Clone, Copy)]
pub struct Apt;

impl PackageManager for Apt {
    fn update(&self) -> Result<()> {
        run_command_safe(&AptGetArgs::Update)?.ensure_success("apt-get update")
    }

    fn install_packages(&self, names: &[String]) -> Result<()> {
        let args = AptGetArgs::Install(names.to_vec());
        run_command_safe(&args)?.ensure_success(&args.describe())
    }

    fn is_package_installed(&self, name: &str) -> bool {
        let args = DpkgStatusArgs {
            package: name.to_string(),
        };
        match run_command_safe(&args) {
            Ok(output) if output.success => status_is_installed(&output.stdout_text()),
            Ok(_) => false,
            Err(e) => {
                debug!("dpkg-query unavailable: {:#}", e);
                false
            }
        }
    }
}

/// `BinaryLocator` backed by the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhichLocator;

impl BinaryLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
