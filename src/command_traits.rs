//! Type-safe external command contracts.
//!
//! Every external tool the installer drives (`apt-get`, `systemctl`, `curl`,
//! `gpg`, `pufferpanel`) is described by a struct implementing `CommandArgs`
//! instead of an ad hoc string vector. The struct definition is the
//! contract: flag spelling is fixed in one place and checked by the compiler.

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: the executable, resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `display_args()`: what may appear in logs. Override to hide secrets.
pub trait CommandArgs {
    /// Executable name.
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Environment variables to set on the child.
    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![]
    }

    /// Bytes to feed on stdin. `None` means stdin is closed.
    fn stdin(&self) -> Option<&[u8]> {
        None
    }

    /// Let the child write straight to the terminal instead of capturing.
    ///
    /// Used for long-running package operations so the operator sees
    /// progress. Captured output is empty in this mode.
    fn passthrough(&self) -> bool {
        false
    }

    /// Arguments safe to log.
    fn display_args(&self) -> Vec<String> {
        self.to_cli_args()
    }

    /// One-line rendering for logs and error messages.
    fn describe(&self) -> String {
        let args = self.display_args();
        if args.is_empty() {
            self.program().to_string()
        } else {
            format!("{} {}", self.program(), args.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(Vec<String>);

    impl CommandArgs for Echo {
        fn program(&self) -> &'static str {
            "echo"
        }

        fn to_cli_args(&self) -> Vec<String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_describe_joins_args() {
        let cmd = Echo(vec!["hello".to_string(), "world".to_string()]);
        assert_eq!(cmd.describe(), "echo hello world");
    }

    #[test]
    fn test_describe_without_args() {
        assert_eq!(Echo(vec![]).describe(), "echo");
    }

    #[test]
    fn test_defaults() {
        let cmd = Echo(vec![]);
        assert!(cmd.get_env_vars().is_empty());
        assert!(cmd.stdin().is_none());
        assert!(!cmd.passthrough());
    }
}
