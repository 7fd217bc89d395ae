//! Scripted fakes for driving the sequencer without touching the host.
//!
//! Every fake appends to a shared `Journal` so tests can assert both which
//! external operations ran and in what order.

#![allow(dead_code)]

use anyhow::{Result, bail};
use pufferpanel_installer::InstallerConfig;
use pufferpanel_installer::credentials::CredentialProvider;
use pufferpanel_installer::error::ProvisionError;
use pufferpanel_installer::host::{HostEnvironment, NetworkInfo, OsRelease};
use pufferpanel_installer::sequencer::{
    Capabilities, ProvisionReport, ProvisionStep, Provisioner, StepOutcome,
};
use pufferpanel_installer::system::{
    AccountCreator, BinaryLocator, KeyFetcher, PackageManager, ServiceManager, UserAddArgs,
};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tempfile::TempDir;

pub const UBUNTU_OS_RELEASE: &str = r#"PRETTY_NAME="Ubuntu 22.04.4 LTS"
NAME="Ubuntu"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
UBUNTU_CODENAME=jammy
"#;

pub const FEDORA_OS_RELEASE: &str = r#"NAME="Fedora Linux"
ID=fedora
PRETTY_NAME="Fedora Linux 39 (Workstation Edition)"
"#;

pub const FAKE_KEYRING: &[u8] = b"\x99\x01\x0dfake-binary-keyring";

/// Ordered record of external operations.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn record(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ============================================================================
// Capability fakes
// ============================================================================

#[derive(Default)]
pub struct FakePackages {
    pub journal: Journal,
    pub installed: Vec<String>,
    /// Fail the Nth index refresh (1-based): 1 is the dependency step,
    /// 2 the refresh after the repository is added.
    pub fail_update_on: Option<usize>,
    pub fail_install: bool,
    updates: Cell<usize>,
}

impl PackageManager for FakePackages {
    fn update(&self) -> Result<()> {
        self.journal.record("apt update");
        let call = self.updates.get() + 1;
        self.updates.set(call);
        if self.fail_update_on == Some(call) {
            bail!("apt-get update failed (exit code 100)");
        }
        Ok(())
    }

    fn install_packages(&self, names: &[String]) -> Result<()> {
        self.journal.record(format!("apt install {}", names.join(" ")));
        if self.fail_install {
            bail!("apt-get install failed (exit code 100)");
        }
        Ok(())
    }

    fn is_package_installed(&self, name: &str) -> bool {
        self.installed.iter().any(|p| p == name)
    }
}

#[derive(Default)]
pub struct FakeBinaries {
    pub present: Option<PathBuf>,
}

impl BinaryLocator for FakeBinaries {
    fn locate(&self, _name: &str) -> Option<PathBuf> {
        self.present.clone()
    }
}

#[derive(Default)]
pub struct FakeServices {
    pub journal: Journal,
    pub active: bool,
    pub fail_enable: bool,
}

impl ServiceManager for FakeServices {
    fn enable_and_start(&self, service: &str) -> Result<()> {
        self.journal.record(format!("systemctl enable {}", service));
        if self.fail_enable {
            bail!("systemctl enable --now {} failed (exit code 1)", service);
        }
        Ok(())
    }

    fn is_active(&self, service: &str) -> bool {
        self.journal.record(format!("systemctl is-active {}", service));
        self.active
    }
}

#[derive(Default)]
pub struct FakeKeys {
    pub journal: Journal,
    pub fail: bool,
}

impl KeyFetcher for FakeKeys {
    fn fetch_key(&self, url: &str) -> Result<Vec<u8>> {
        self.journal.record(format!("fetch key {}", url));
        if self.fail {
            bail!("curl -fsSL {} failed (exit code 22)", url);
        }
        Ok(FAKE_KEYRING.to_vec())
    }
}

#[derive(Default)]
pub struct FakeAccounts {
    pub journal: Journal,
    pub created: RefCell<Vec<UserAddArgs>>,
    pub fail: bool,
}

impl AccountCreator for FakeAccounts {
    fn create_user(&self, args: &UserAddArgs) -> Result<()> {
        self.journal.record(format!("user add {}", args.name));
        self.created.borrow_mut().push(args.clone());
        if self.fail {
            bail!("pufferpanel user add failed (exit code 1): email already in use");
        }
        Ok(())
    }
}

pub struct FakeNetwork(pub Option<IpAddr>);

impl NetworkInfo for FakeNetwork {
    fn primary_ip(&self) -> Option<IpAddr> {
        self.0
    }
}

/// Replays fixed prompt answers.
#[derive(Default)]
pub struct ScriptedCredentials {
    pub visible: VecDeque<String>,
    pub hidden: VecDeque<String>,
    pub visible_prompts: usize,
    pub hidden_prompts: usize,
}

impl ScriptedCredentials {
    pub fn new(visible: &[&str], hidden: &[&str]) -> Self {
        Self {
            visible: visible.iter().map(|s| s.to_string()).collect(),
            hidden: hidden.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl CredentialProvider for ScriptedCredentials {
    fn prompt_visible(&mut self, _label: &str) -> io::Result<String> {
        self.visible_prompts += 1;
        self.visible
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input"))
    }

    fn prompt_hidden(&mut self, _label: &str) -> io::Result<String> {
        self.hidden_prompts += 1;
        self.hidden
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted input"))
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A fake host: temp filesystem root plus scripted capabilities.
pub struct Harness {
    pub dir: TempDir,
    pub config: InstallerConfig,
    pub host: HostEnvironment,
    pub journal: Journal,
    pub packages: FakePackages,
    pub binaries: FakeBinaries,
    pub services: FakeServices,
    pub keys: FakeKeys,
    pub accounts: FakeAccounts,
    pub network: FakeNetwork,
    pub credentials: ScriptedCredentials,
}

pub struct RunResult {
    pub result: std::result::Result<ProvisionReport, ProvisionError>,
    pub failed_at: Option<ProvisionStep>,
    pub history: Vec<(ProvisionStep, StepOutcome)>,
}

impl RunResult {
    pub fn completed_steps(&self) -> Vec<ProvisionStep> {
        self.history.iter().map(|(step, _)| *step).collect()
    }
}

impl Harness {
    /// Root on Ubuntu, binary absent, service comes up, password `secret1`.
    pub fn ubuntu() -> Self {
        Self::with_os(UBUNTU_OS_RELEASE, true)
    }

    pub fn with_os(os_release: &str, is_root: bool) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InstallerConfig {
            settle_delay: Duration::ZERO,
            ..InstallerConfig::rooted_at(dir.path())
        };
        let journal = Journal::default();

        Self {
            host: HostEnvironment::new(OsRelease::parse(os_release), is_root),
            packages: FakePackages {
                journal: journal.clone(),
                ..FakePackages::default()
            },
            binaries: FakeBinaries::default(),
            services: FakeServices {
                journal: journal.clone(),
                active: true,
                fail_enable: false,
            },
            keys: FakeKeys {
                journal: journal.clone(),
                fail: false,
            },
            accounts: FakeAccounts {
                journal: journal.clone(),
                ..FakeAccounts::default()
            },
            network: FakeNetwork(Some("192.0.2.10".parse().expect("ip"))),
            credentials: ScriptedCredentials::new(
                &["admin", "admin@example.com"],
                &["secret1", "secret1"],
            ),
            journal,
            config,
            dir,
        }
    }

    pub fn provisioner(&mut self) -> Provisioner<'_> {
        let caps = Capabilities {
            packages: &self.packages,
            binaries: &self.binaries,
            services: &self.services,
            keys: &self.keys,
            accounts: &self.accounts,
            network: &self.network,
        };
        Provisioner::new(&self.config, &self.host, caps, &mut self.credentials)
    }

    pub fn run(&mut self) -> RunResult {
        let mut provisioner = self.provisioner();
        let result = provisioner.run();
        RunResult {
            failed_at: provisioner.failed_at(),
            history: provisioner.history().to_vec(),
            result,
        }
    }
}
