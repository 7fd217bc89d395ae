//! PufferPanel's own CLI: `pufferpanel user add`.

use super::AccountCreator;
use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;
use anyhow::Result;
use std::fmt;

/// Type-safe arguments for `pufferpanel user add`.
#[derive(Clone)]
pub struct UserAddArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub admin: bool,
}

impl fmt::Debug for UserAddArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAddArgs")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("admin", &self.admin)
            .finish()
    }
}

impl UserAddArgs {
    fn args_with_password(&self, password: &str) -> Vec<String> {
        let mut args = vec![
            "user".to_string(),
            "add".to_string(),
            "--name".to_string(),
            self.name.clone(),
            "--email".to_string(),
            self.email.clone(),
            "--password".to_string(),
            password.to_string(),
        ];
        if self.admin {
            args.push("--admin".to_string());
        }
        args
    }
}

impl CommandArgs for UserAddArgs {
    fn program(&self) -> &'static str {
        "pufferpanel"
    }

    fn to_cli_args(&self) -> Vec<String> {
        self.args_with_password(&self.password)
    }

    fn display_args(&self) -> Vec<String> {
        self.args_with_password("********")
    }
}

/// `AccountCreator` invoking the installed `pufferpanel` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct PufferPanelCli;

impl AccountCreator for PufferPanelCli {
    fn create_user(&self, args: &UserAddArgs) -> Result<()> {
        run_command_safe(args)?.ensure_success("pufferpanel user add")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> UserAddArgs {
        UserAddArgs {
            name: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "secret1".to_string(),
            admin: true,
        }
    }

    #[test]
    fn test_user_add_args() {
        assert_eq!(
            admin().to_cli_args(),
            vec![
                "user",
                "add",
                "--name",
                "admin",
                "--email",
                "admin@example.com",
                "--password",
                "secret1",
                "--admin"
            ]
        );
    }

    #[test]
    fn test_non_admin_omits_flag() {
        let args = UserAddArgs {
            admin: false,
            ..admin()
        };
        assert!(!args.to_cli_args().contains(&"--admin".to_string()));
    }

    #[test]
    fn test_password_never_displayed() {
        let args = admin();
        assert!(!args.describe().contains("secret1"));
        assert!(args.describe().contains("--password ********"));
        assert!(!format!("{:?}", args).contains("secret1"));
    }
}
