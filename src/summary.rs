//! Post-install summary shown once the panel is running.

use crate::config::InstallerConfig;
use crate::ui;
use std::net::IpAddr;

/// Host shown when no address could be resolved.
pub const FALLBACK_HOST: &str = "localhost";

/// Everything the operator needs after a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    pub access_url: String,
    /// Whether `access_url` uses a resolved address rather than the fallback.
    pub address_resolved: bool,
    pub firewall_commands: Vec<String>,
    pub log_command: String,
    pub service_commands: Vec<String>,
}

impl CompletionSummary {
    pub fn new(config: &InstallerConfig, ip: Option<IpAddr>) -> Self {
        let host = match ip {
            Some(IpAddr::V6(v6)) => format!("[{}]", v6),
            Some(IpAddr::V4(v4)) => v4.to_string(),
            None => FALLBACK_HOST.to_string(),
        };
        let service = &config.service_name;

        Self {
            access_url: format!("http://{}:{}", host, config.web_port),
            address_resolved: ip.is_some(),
            firewall_commands: vec![
                format!("ufw allow {}/tcp", config.web_port),
                format!("ufw allow {}/tcp", config.sftp_port),
            ],
            log_command: format!("journalctl -u {} -f", service),
            service_commands: ["status", "restart", "stop"]
                .iter()
                .map(|action| format!("systemctl {} {}", action, service))
                .collect(),
        }
    }

    /// Print the summary block.
    pub fn print(&self) {
        ui::print_section("PufferPanel is installed");

        ui::print_kv("Panel URL", &self.access_url);
        if !self.address_resolved {
            ui::print_warning("Could not determine this host's address, replace localhost with it");
        }

        println!();
        ui::print_info("If a firewall is active, open the panel and SFTP ports:");
        for cmd in &self.firewall_commands {
            ui::print_list_item(cmd);
        }

        println!();
        ui::print_info("Follow the panel logs with:");
        ui::print_list_item(&self.log_command);

        println!();
        ui::print_info("Manage the service with:");
        for cmd in &self.service_commands {
            ui::print_list_item(cmd);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_url() {
        let ip = "10.0.0.5".parse().ok();
        let summary = CompletionSummary::new(&InstallerConfig::default(), ip);
        assert_eq!(summary.access_url, "http://10.0.0.5:8080");
        assert!(summary.address_resolved);
    }

    #[test]
    fn test_ipv6_url_is_bracketed() {
        let ip = "2001:db8::1".parse().ok();
        let summary = CompletionSummary::new(&InstallerConfig::default(), ip);
        assert_eq!(summary.access_url, "http://[2001:db8::1]:8080");
    }

    #[test]
    fn test_unresolved_falls_back() {
        let summary = CompletionSummary::new(&InstallerConfig::default(), None);
        assert_eq!(summary.access_url, "http://localhost:8080");
        assert!(!summary.address_resolved);
    }

    #[test]
    fn test_hints() {
        let summary = CompletionSummary::new(&InstallerConfig::default(), None);
        assert_eq!(
            summary.firewall_commands,
            vec!["ufw allow 8080/tcp", "ufw allow 5657/tcp"]
        );
        assert_eq!(summary.log_command, "journalctl -u pufferpanel -f");
        assert!(summary
            .service_commands
            .contains(&"systemctl restart pufferpanel".to_string()));
    }
}
