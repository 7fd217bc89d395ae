//! PufferPanel Installer Library
//!
//! Provisions PufferPanel on Debian-family hosts: precondition checks, APT
//! repository registration, package install, admin account creation and
//! service start, run as a fail-fast sequence of steps.

pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod config;
pub mod credentials;
pub mod error;
pub mod host;
pub mod process_guard;
pub mod repository;
pub mod sequencer;
pub mod summary;
pub mod system;
pub mod ui;

// Re-export main types for convenience
pub use config::InstallerConfig;
pub use credentials::{AdminCredentials, CredentialProvider, TerminalPrompter};
pub use error::{ErrorKind, ProvisionError};
pub use host::{HostEnvironment, NetworkInfo, OsRelease};
pub use repository::RepositoryRegistration;
pub use sequencer::{Capabilities, ProvisionReport, ProvisionStep, Provisioner, StepOutcome};
pub use summary::CompletionSummary;
pub use system::{AccountCreator, BinaryLocator, KeyFetcher, PackageManager, ServiceManager};
