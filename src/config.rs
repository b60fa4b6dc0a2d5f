use std::time::Duration;

use clap::ValueEnum;

/// Default base URL for the shortener's read path (GET redirects).
pub const DEFAULT_READ_URL: &str = "http://localhost:8080";

/// Default base URL for the shortener's write path (PUT registrations).
pub const DEFAULT_WRITE_URL: &str = "http://localhost:8012/";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which side of the URL-shortening service to exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Workload {
    /// GET a random short path, as a user following a shortened link.
    Read,

    /// PUT a random short/long pair, as a user registering a new link.
    Write,
}

impl Workload {
    /// The CLI spelling of this workload, usable when rebuilding a command
    /// line for a remote invocation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Workload::Read => "read",
            Workload::Write => "write",
        }
    }

    /// HTTP method this workload uses.
    pub fn method(&self) -> &'static str {
        match self {
            Workload::Read => "GET",
            Workload::Write => "PUT",
        }
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main configuration for a load run, shared by all modes.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workload: Workload,
    pub read_url: String,
    pub write_url: String,
    pub timeout: Duration,
}

impl RunConfig {
    /// The base URL the configured workload targets.
    pub fn target_url(&self) -> &str {
        match self.workload {
            Workload::Read => &self.read_url,
            Workload::Write => &self.write_url,
        }
    }

    /// Prints the configuration summary.
    pub fn print_summary(&self, mode: &str) {
        println!("Starting load run:");
        println!("  Mode: {}", mode);
        println!(
            "  Workload: {} ({})",
            self.workload.as_str(),
            self.workload.method()
        );
        println!("  Target URL: {}", self.target_url());
        println!("  Request timeout: {:?}", self.timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_cli_spelling() {
        assert_eq!(Workload::Read.as_str(), "read");
        assert_eq!(Workload::Write.as_str(), "write");
    }

    #[test]
    fn workload_methods() {
        assert_eq!(Workload::Read.method(), "GET");
        assert_eq!(Workload::Write.method(), "PUT");
    }

    #[test]
    fn target_url_follows_workload() {
        let config = RunConfig {
            workload: Workload::Read,
            read_url: "http://localhost:8080".to_string(),
            write_url: "http://localhost:8012/".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(config.target_url(), "http://localhost:8080");

        let config = RunConfig {
            workload: Workload::Write,
            ..config
        };
        assert_eq!(config.target_url(), "http://localhost:8012/");
    }
}
