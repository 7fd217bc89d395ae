//! PufferPanel installer - main entry point
//!
//! Detects the host, wires the real capabilities into the sequencer, and
//! turns the first failure into an error line and exit code.

use pufferpanel_installer::cli::Cli;
use pufferpanel_installer::config::InstallerConfig;
use pufferpanel_installer::credentials::TerminalPrompter;
use pufferpanel_installer::host::{HostEnvironment, SystemNetwork};
use pufferpanel_installer::sequencer::{Capabilities, Provisioner};
use pufferpanel_installer::system::{Apt, HttpKeyFetcher, PufferPanelCli, Systemd, WhichLocator};
use pufferpanel_installer::{process_guard, ui};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr; RUST_LOG overrides the CLI level.
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.log_level());
    info!("PufferPanel installer starting");

    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    ui::print_banner();

    let config = InstallerConfig::default();
    let host = HostEnvironment::detect(&config);
    debug!("Host: {}", host);

    let caps = Capabilities {
        packages: &Apt,
        binaries: &WhichLocator,
        services: &Systemd,
        keys: &HttpKeyFetcher,
        accounts: &PufferPanelCli,
        network: &SystemNetwork,
    };
    let mut prompter = TerminalPrompter::new();

    let mut provisioner = Provisioner::new(&config, &host, caps, &mut prompter);
    match provisioner.run() {
        Ok(report) => {
            info!("Installation complete: {}", report.summary.access_url);
        }
        Err(e) => {
            let step = provisioner
                .failed_at()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "startup".to_string());
            debug!(kind = %e.kind(), "{} failed: {}", step, e);
            ui::print_error(&format!("{}: {}", step, e));
            std::process::exit(e.exit_code());
        }
    }
}
