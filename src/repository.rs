//! APT repository registration for the PufferPanel packagecloud repo.
//!
//! Registration writes exactly two files, the keyring and the source list,
//! each replaced atomically with content that depends only on the host and
//! the key. Running it again rewrites identical bytes.

use crate::config::InstallerConfig;
use crate::error::{ProvisionError, Result};
use crate::host::HostEnvironment;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the repository lives and how APT is pointed at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRegistration {
    /// Keyring path as referenced by `signed-by`.
    pub gpg_key_path: PathBuf,
    /// Source list path as seen by APT.
    pub source_list_path: PathBuf,
    /// Repository base URL.
    pub repo_url: String,
    /// `ubuntu` or `debian`.
    pub distro: String,
    pub codename: String,
}

impl RepositoryRegistration {
    /// Build the registration for this host.
    ///
    /// Fails when the host does not report a release codename.
    pub fn for_host(config: &InstallerConfig, host: &HostEnvironment) -> Result<Self> {
        let codename = host.codename().ok_or_else(|| {
            ProvisionError::repository(format!(
                "cannot determine release codename for {}",
                host.os_pretty_name()
            ))
        })?;

        Ok(Self {
            gpg_key_path: config.keyring_path.clone(),
            source_list_path: config.source_list_path.clone(),
            repo_url: config.repo_url.trim_end_matches('/').to_string(),
            distro: host.repo_distro().to_string(),
            codename: codename.to_string(),
        })
    }

    /// The single `deb` line written to the source list.
    pub fn source_line(&self) -> String {
        format!(
            "deb [signed-by={}] {}/{}/ {} main",
            self.gpg_key_path.display(),
            self.repo_url,
            self.distro,
            self.codename
        )
    }

    /// Write keyring and source list under `config.root`.
    pub fn write_files(&self, config: &InstallerConfig, keyring: &[u8]) -> Result<()> {
        let key_file = config.host_path(&self.gpg_key_path);
        let list_file = config.host_path(&self.source_list_path);

        replace_file(&key_file, keyring, 0o644)?;
        replace_file(&list_file, format!("{}\n", self.source_line()).as_bytes(), 0o644)?;

        debug!(
            "Wrote {} and {}",
            key_file.display(),
            list_file.display()
        );
        Ok(())
    }
}

/// Replace `path` with `contents` via a temp file and rename.
fn replace_file(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let parent = path.parent().ok_or_else(|| {
        ProvisionError::repository(format!("{} has no parent directory", path.display()))
    })?;
    fs::create_dir_all(parent).map_err(|e| {
        ProvisionError::repository(format!("cannot create {}: {}", parent.display(), e))
    })?;

    let write = || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(mode))?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    };

    write().map_err(|e| {
        ProvisionError::repository(format!("cannot write {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OsRelease;

    fn ubuntu_host() -> HostEnvironment {
        HostEnvironment::new(
            OsRelease::parse("ID=ubuntu\nID_LIKE=debian\nVERSION_CODENAME=jammy\n"),
            true,
        )
    }

    #[test]
    fn test_source_line() {
        let config = InstallerConfig::default();
        let reg = RepositoryRegistration::for_host(&config, &ubuntu_host()).expect("registration");
        assert_eq!(
            reg.source_line(),
            "deb [signed-by=/usr/share/keyrings/pufferpanel-archive-keyring.gpg] \
             https://packagecloud.io/pufferpanel/pufferpanel/ubuntu/ jammy main"
        );
    }

    #[test]
    fn test_missing_codename_is_repository_error() {
        let host = HostEnvironment::new(OsRelease::parse("ID=debian\n"), true);
        let err = RepositoryRegistration::for_host(&InstallerConfig::default(), &host)
            .expect_err("no codename");
        assert!(matches!(err, ProvisionError::Repository(_)));
    }

    #[test]
    fn test_write_files_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InstallerConfig::rooted_at(dir.path());
        let reg = RepositoryRegistration::for_host(&config, &ubuntu_host()).expect("registration");

        reg.write_files(&config, b"KEY").expect("write");

        assert_eq!(fs::read(config.keyring_file()).expect("key"), b"KEY");
        let list = fs::read_to_string(config.source_list_file()).expect("list");
        assert_eq!(list, format!("{}\n", reg.source_line()));
    }

    #[test]
    fn test_write_files_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InstallerConfig::rooted_at(dir.path());
        let reg = RepositoryRegistration::for_host(&config, &ubuntu_host()).expect("registration");

        fs::create_dir_all(config.source_list_file().parent().unwrap()).unwrap();
        fs::write(config.source_list_file(), "stale contents that are longer\n").unwrap();

        reg.write_files(&config, b"KEY").expect("write");
        let list = fs::read_to_string(config.source_list_file()).expect("list");
        assert!(list.starts_with("deb [signed-by="));
    }
}
