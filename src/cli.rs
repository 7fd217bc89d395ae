use clap::Parser;

/// PufferPanel installer for Debian and Ubuntu
#[derive(Parser, Debug)]
#[command(name = "pufferpanel-installer")]
#[command(about = "Installs PufferPanel from its APT repository and creates an admin account")]
#[command(version)]
pub struct Cli {
    /// Increase diagnostic logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default tracing filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
