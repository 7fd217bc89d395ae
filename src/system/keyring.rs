//! Repository signing key download.
//!
//! The key is published ASCII-armored; APT's `signed-by` wants the binary
//! form, so the download is piped through `gpg --dearmor`.

use super::KeyFetcher;
use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;
use anyhow::{Result, bail};

/// Type-safe arguments for `curl -fsSL <url>`.
#[derive(Debug, Clone)]
pub struct CurlArgs {
    pub url: String,
}

impl CommandArgs for CurlArgs {
    fn program(&self) -> &'static str {
        "curl"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["-fsSL".to_string(), self.url.clone()]
    }
}

/// Type-safe arguments for `gpg --batch --dearmor`, key on stdin.
#[derive(Debug, Clone)]
pub struct GpgDearmorArgs {
    pub armored: Vec<u8>,
}

impl CommandArgs for GpgDearmorArgs {
    fn program(&self) -> &'static str {
        "gpg"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["--batch".to_string(), "--dearmor".to_string()]
    }

    fn stdin(&self) -> Option<&[u8]> {
        Some(&self.armored)
    }
}

/// `KeyFetcher` using `curl` and `gpg`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpKeyFetcher;

impl KeyFetcher for HttpKeyFetcher {
    fn fetch_key(&self, url: &str) -> Result<Vec<u8>> {
        let curl = CurlArgs {
            url: url.to_string(),
        };
        let download = run_command_safe(&curl)?;
        download.ensure_success(&curl.describe())?;
        if download.stdout.is_empty() {
            bail!("{} returned an empty key", url);
        }

        let dearmor = GpgDearmorArgs {
            armored: download.stdout,
        };
        let keyring = run_command_safe(&dearmor)?;
        keyring.ensure_success("gpg --dearmor")?;
        if keyring.stdout.is_empty() {
            bail!("gpg --dearmor produced no output for {}", url);
        }

        Ok(keyring.stdout)
    }
}
