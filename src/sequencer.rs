//! Provisioning sequencer
//!
//! Runs the eight installation steps in a fixed order and stops at the first
//! failure. Nothing is retried and nothing is rolled back: a failed run leaves
//! the host exactly as the last successful step left it.
//!
//! # Step Flow
//!
//! ```text
//! CheckPrivileges
//!     ↓
//! CheckDistro
//!     ↓
//! InstallDependencies
//!     ↓
//! RegisterRepository
//!     ↓
//! InstallTargetPackage      (skipped when the binary is already on PATH)
//!     ↓
//! CreateAdminAccount        (password confirmation loops until it matches)
//!     ↓
//! EnableAndStartService
//!     ↓
//! ReportCompletion
//! ```
//!
//! Each step reads only the facts it names in its documentation, all of
//! which arrive through `InstallerConfig`, `HostEnvironment` or a capability.

use crate::config::InstallerConfig;
use crate::credentials::{CredentialProvider, collect_admin_credentials};
use crate::error::{ProvisionError, Result};
use crate::host::{HostEnvironment, NetworkInfo};
use crate::repository::RepositoryRegistration;
use crate::summary::CompletionSummary;
use crate::system::{
    AccountCreator, BinaryLocator, KeyFetcher, PackageManager, ServiceManager, UserAddArgs,
};
use crate::ui;
use std::fmt;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::{debug, info, warn};

/// Provisioning steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum ProvisionStep {
    CheckPrivileges = 1,
    CheckDistro = 2,
    InstallDependencies = 3,
    RegisterRepository = 4,
    InstallTargetPackage = 5,
    CreateAdminAccount = 6,
    EnableAndStartService = 7,
    ReportCompletion = 8,
}

impl ProvisionStep {
    /// Number of steps in a full run.
    pub const COUNT: u8 = 8;

    /// The step every run starts with.
    pub const fn first() -> Self {
        Self::CheckPrivileges
    }

    /// 1-based position in the pipeline
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// The following step, or None after the last one
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::CheckPrivileges => Some(Self::CheckDistro),
            Self::CheckDistro => Some(Self::InstallDependencies),
            Self::InstallDependencies => Some(Self::RegisterRepository),
            Self::RegisterRepository => Some(Self::InstallTargetPackage),
            Self::InstallTargetPackage => Some(Self::CreateAdminAccount),
            Self::CreateAdminAccount => Some(Self::EnableAndStartService),
            Self::EnableAndStartService => Some(Self::ReportCompletion),
            Self::ReportCompletion => None,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::CheckPrivileges => "Checking privileges",
            Self::CheckDistro => "Checking operating system",
            Self::InstallDependencies => "Installing dependencies",
            Self::RegisterRepository => "Adding PufferPanel repository",
            Self::InstallTargetPackage => "Installing PufferPanel",
            Self::CreateAdminAccount => "Creating admin account",
            Self::EnableAndStartService => "Starting PufferPanel service",
            Self::ReportCompletion => "Finishing up",
        }
    }

    /// All steps in order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// How a successful step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did its work.
    Completed,
    /// Nothing to do; the host already had what the step provides.
    Skipped(String),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

/// Host capabilities used by the steps.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub packages: &'a dyn PackageManager,
    pub binaries: &'a dyn BinaryLocator,
    pub services: &'a dyn ServiceManager,
    pub keys: &'a dyn KeyFetcher,
    pub accounts: &'a dyn AccountCreator,
    pub network: &'a dyn NetworkInfo,
}

/// Result of a full successful run.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    /// Every step with its outcome, in execution order.
    pub steps: Vec<(ProvisionStep, StepOutcome)>,
    pub summary: CompletionSummary,
}

/// Drives the steps against one host.
pub struct Provisioner<'a> {
    config: &'a InstallerConfig,
    host: &'a HostEnvironment,
    caps: Capabilities<'a>,
    credentials: &'a mut dyn CredentialProvider,
    history: Vec<(ProvisionStep, StepOutcome)>,
    failed_at: Option<ProvisionStep>,
    summary: Option<CompletionSummary>,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &'a InstallerConfig,
        host: &'a HostEnvironment,
        caps: Capabilities<'a>,
        credentials: &'a mut dyn CredentialProvider,
    ) -> Self {
        Self {
            config,
            host,
            caps,
            credentials,
            history: Vec::with_capacity(ProvisionStep::COUNT as usize),
            failed_at: None,
            summary: None,
        }
    }

    /// Steps that finished, with their outcomes
    pub fn history(&self) -> &[(ProvisionStep, StepOutcome)] {
        &self.history
    }

    /// The step that failed, if any
    pub fn failed_at(&self) -> Option<ProvisionStep> {
        self.failed_at
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&mut self) -> Result<ProvisionReport> {
        let mut next = Some(ProvisionStep::first());

        while let Some(step) = next {
            ui::print_progress_step(step.order(), ProvisionStep::COUNT, step.description());
            info!("Step {}/{}: {}", step.order(), ProvisionStep::COUNT, step);

            match self.run_step(step) {
                Ok(outcome) => {
                    if let StepOutcome::Skipped(reason) = &outcome {
                        ui::print_info(&format!("Skipped: {}", reason));
                    }
                    info!("Step {} {}", step, outcome);
                    self.history.push((step, outcome));
                }
                Err(e) => {
                    debug!("Step {} failed: {}", step, e);
                    self.failed_at = Some(step);
                    return Err(e);
                }
            }

            next = step.next();
        }

        let summary = self
            .summary
            .clone()
            .unwrap_or_else(|| CompletionSummary::new(self.config, None));

        Ok(ProvisionReport {
            steps: self.history.clone(),
            summary,
        })
    }

    fn run_step(&mut self, step: ProvisionStep) -> Result<StepOutcome> {
        match step {
            ProvisionStep::CheckPrivileges => self.check_privileges(),
            ProvisionStep::CheckDistro => self.check_distro(),
            ProvisionStep::InstallDependencies => self.install_dependencies(),
            ProvisionStep::RegisterRepository => self.register_repository(),
            ProvisionStep::InstallTargetPackage => self.install_target_package(),
            ProvisionStep::CreateAdminAccount => self.create_admin_account(),
            ProvisionStep::EnableAndStartService => self.enable_and_start_service(),
            ProvisionStep::ReportCompletion => self.report_completion(),
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    /// Reads: `host.is_root`.
    pub fn check_privileges(&self) -> Result<StepOutcome> {
        if !self.host.is_root {
            return Err(ProvisionError::permission(
                "this installer must be run as root (try: sudo pufferpanel-installer)",
            ));
        }
        ui::print_success("Running as root");
        Ok(StepOutcome::Completed)
    }

    /// Reads: `host.os`, `config.accepted_distros`.
    pub fn check_distro(&self) -> Result<StepOutcome> {
        if !self.host.is_supported(&self.config.accepted_distros) {
            return Err(ProvisionError::unsupported_platform(format!(
                "only Debian and Ubuntu based systems are supported (detected: {})",
                self.host.os_pretty_name()
            )));
        }
        ui::print_success(&format!("Detected {}", self.host.os_pretty_name()));
        Ok(StepOutcome::Completed)
    }

    /// Reads: `config.dependencies`. Uses: package manager.
    pub fn install_dependencies(&self) -> Result<StepOutcome> {
        let packages = self.caps.packages;

        packages
            .update()
            .map_err(|e| ProvisionError::package_manager(format!("{:#}", e)))?;

        let missing: Vec<String> = self
            .config
            .dependencies
            .iter()
            .filter(|name| !packages.is_package_installed(name))
            .cloned()
            .collect();

        if missing.is_empty() {
            ui::print_success("Dependencies already installed");
            return Ok(StepOutcome::Completed);
        }

        packages
            .install_packages(&missing)
            .map_err(|e| ProvisionError::package_manager(format!("{:#}", e)))?;

        ui::print_success(&format!("Installed {}", missing.join(", ")));
        Ok(StepOutcome::Completed)
    }

    /// Reads: `config` repository settings and root, `host` codename.
    /// Uses: key fetcher, package manager. Writes: keyring, source list.
    pub fn register_repository(&self) -> Result<StepOutcome> {
        let registration = RepositoryRegistration::for_host(self.config, self.host)?;

        let keyring = self
            .caps
            .keys
            .fetch_key(&self.config.key_url)
            .map_err(|e| ProvisionError::repository(format!("{:#}", e)))?;

        registration.write_files(self.config, &keyring)?;

        self.caps
            .packages
            .update()
            .map_err(|e| ProvisionError::repository(format!("{:#}", e)))?;

        ui::print_success(&format!(
            "Repository added ({} {})",
            registration.distro, registration.codename
        ));
        Ok(StepOutcome::Completed)
    }

    /// Reads: `config.binary_name`, `config.package_name`.
    /// Uses: binary locator, package manager.
    pub fn install_target_package(&self) -> Result<StepOutcome> {
        let binary = &self.config.binary_name;

        if let Some(path) = self.caps.binaries.locate(binary) {
            return Ok(StepOutcome::Skipped(format!(
                "{} is already installed at {}",
                binary,
                path.display()
            )));
        }

        self.caps
            .packages
            .install_packages(std::slice::from_ref(&self.config.package_name))
            .map_err(|e| ProvisionError::package_manager(format!("{:#}", e)))?;

        if self.caps.binaries.locate(binary).is_none() {
            warn!("{} installed but {} is not on PATH", self.config.package_name, binary);
        }

        ui::print_success(&format!("Installed {}", self.config.package_name));
        Ok(StepOutcome::Completed)
    }

    /// Uses: credential provider, account creator.
    pub fn create_admin_account(&mut self) -> Result<StepOutcome> {
        ui::print_info("Create the first PufferPanel administrator");
        let creds = collect_admin_credentials(&mut *self.credentials)?;

        let args = UserAddArgs {
            name: creds.username,
            email: creds.email,
            password: creds.password,
            admin: true,
        };

        self.caps
            .accounts
            .create_user(&args)
            .map_err(|e| ProvisionError::external_command(format!("{:#}", e)))?;

        ui::print_success(&format!("Admin account '{}' created", args.name));
        Ok(StepOutcome::Completed)
    }

    /// Reads: `config.service_name`, `config.settle_delay`.
    /// Uses: service manager.
    pub fn enable_and_start_service(&self) -> Result<StepOutcome> {
        let service = &self.config.service_name;
        let services = self.caps.services;

        services
            .enable_and_start(service)
            .map_err(|e| ProvisionError::service_start(format!("{:#}", e)))?;

        info!("Waiting {:?} for {} to settle", self.config.settle_delay, service);
        std::thread::sleep(self.config.settle_delay);

        if !services.is_active(service) {
            return Err(ProvisionError::service_start(format!(
                "{} is not active after {}s (check: journalctl -u {})",
                service,
                self.config.settle_delay.as_secs(),
                service
            )));
        }

        ui::print_success(&format!("{} is running", service));
        Ok(StepOutcome::Completed)
    }

    /// Reads: `config` ports and service name. Uses: network info.
    /// Never fails.
    pub fn report_completion(&mut self) -> Result<StepOutcome> {
        let ip = self.caps.network.primary_ip();
        if ip.is_none() {
            warn!("Could not resolve a primary address");
        }

        let summary = CompletionSummary::new(self.config, ip);
        summary.print();
        self.summary = Some(summary);
        Ok(StepOutcome::Completed)
    }
}
