//! systemd service control via `systemctl`.

use super::ServiceManager;
use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;
use anyhow::Result;
use tracing::debug;

/// Type-safe arguments for `systemctl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemctlArgs {
    /// `systemctl enable --now <unit>`
    EnableNow(String),
    /// `systemctl is-active --quiet <unit>`
    IsActive(String),
}

impl CommandArgs for SystemctlArgs {
    fn program(&self) -> &'static str {
        "systemctl"
    }

    fn to_cli_args(&self) -> Vec<String> {
        match self {
            Self::EnableNow(unit) => vec!["enable".to_string(), "--now".to_string(), unit.clone()],
            Self::IsActive(unit) => {
                vec!["is-active".to_string(), "--quiet".to_string(), unit.clone()]
            }
        }
    }
}

/// `ServiceManager` backed by systemd.
#[derive(Debug, Default, Clone, Copy)]
pub struct Systemd;

impl ServiceManager for Systemd {
    fn enable_and_start(&self, service: &str) -> Result<()> {
        let args = SystemctlArgs::EnableNow(service.to_string());
        run_command_safe(&args)?.ensure_success(&args.describe())
    }

    fn is_active(&self, service: &str) -> bool {
        match run_command_safe(&SystemctlArgs::IsActive(service.to_string())) {
            Ok(output) => output.success,
            Err(e) => {
                debug!("systemctl is-active failed to run: {:#}", e);
                false
            }
        }
    }
}
