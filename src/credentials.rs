//! Admin credential collection
//!
//! Prompts go through a `CredentialProvider` so the confirmation loop can be
//! driven by a script in tests. The terminal implementation uses
//! `dialoguer`, which disables echo for hidden input.

use crate::ui;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use std::fmt;
use std::io;
use tracing::debug;

/// Interactive input source.
pub trait CredentialProvider {
    /// Prompt for a value that may be shown while typed.
    fn prompt_visible(&mut self, label: &str) -> io::Result<String>;

    /// Prompt for a value that must not echo.
    fn prompt_hidden(&mut self, label: &str) -> io::Result<String>;
}

/// `CredentialProvider` reading from the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for TerminalPrompter {
    fn prompt_visible(&mut self, label: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::from)
    }

    fn prompt_hidden(&mut self, label: &str) -> io::Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
            .map_err(io::Error::from)
    }
}

/// Admin account details, held only in memory until handed to the panel.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Minimal shape check: something on both sides of a single `@`.
pub fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Collect admin credentials.
///
/// Re-prompts blank usernames and malformed emails. The password and its
/// confirmation are asked again, together, until they are non-empty and
/// equal; there is no retry limit.
pub fn collect_admin_credentials(
    provider: &mut dyn CredentialProvider,
) -> io::Result<AdminCredentials> {
    let username = loop {
        let value = provider.prompt_visible("Admin username")?.trim().to_string();
        if !value.is_empty() {
            break value;
        }
        ui::print_warning("Username cannot be empty");
    };

    let email = loop {
        let value = provider.prompt_visible("Admin email")?.trim().to_string();
        if looks_like_email(&value) {
            break value;
        }
        ui::print_warning("Please enter a valid email address");
    };

    let mut attempt = 0u32;
    let password = loop {
        attempt += 1;
        let password = provider.prompt_hidden("Admin password")?;
        let confirmation = provider.prompt_hidden("Confirm password")?;

        if password.is_empty() {
            ui::print_warning("Password cannot be empty, try again");
        } else if password != confirmation {
            ui::print_warning("Passwords do not match, try again");
        } else {
            break password;
        }
        debug!("Password attempt {} rejected", attempt);
    };

    Ok(AdminCredentials {
        username,
        email,
        password,
    })
}
