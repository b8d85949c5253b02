use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dialer-admin-api")]
#[command(about = "Administrative REST gateway over the dialer database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Listen port (overrides API_PORT)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Connect to the database, ping it and exit")]
    CheckDb,

    #[command(about = "Print the effective configuration without secrets")]
    ShowConfig,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["dialer-admin-api"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve);
        assert!(cli.port.is_none());
    }

    #[test]
    fn port_flag_and_subcommand() {
        let cli = Cli::try_parse_from(["dialer-admin-api", "check-db", "--port", "9090"]).unwrap();
        assert_eq!(cli.command(), Commands::CheckDb);
        assert_eq!(cli.port, Some(9090));
    }
}
