use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    RunConfig, Workload, DEFAULT_READ_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_WRITE_URL,
};

fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;
    if value == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(value)
}

fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid integer", s))?;
    if value == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(value)
}

#[derive(Debug, Parser, Clone)]
#[command(
    version,
    about = "Synthetic GET/PUT load generator for a URL-shortening service"
)]
pub struct Cli {
    /// Which side of the service to exercise
    #[arg(long, value_enum, default_value_t = Workload::Read, global = true)]
    pub workload: Workload,

    /// Base URL of the read path
    #[arg(long = "read-url", default_value = DEFAULT_READ_URL, global = true)]
    pub read_url: String,

    /// Base URL of the write path
    #[arg(long = "write-url", default_value = DEFAULT_WRITE_URL, global = true)]
    pub write_url: String,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-secs", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Mode {
    /// Issue requests from a single worker
    Single(SingleArgs),

    /// Issue requests from several concurrent workers
    Threads(ThreadsArgs),

    /// Fan the single-worker run out across remote hosts
    Hosts(HostsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SingleArgs {
    /// The number of requests to send
    #[arg(value_parser = parse_positive_u64)]
    pub requests: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ThreadsArgs {
    /// The number of requests each user sends
    #[arg(value_parser = parse_positive_u64)]
    pub requests: u64,

    /// The number of users
    #[arg(value_parser = parse_positive_usize)]
    pub users: usize,
}

#[derive(Debug, Args, Clone)]
pub struct HostsArgs {
    /// The number of requests each host sends
    #[arg(value_parser = parse_positive_u64)]
    pub requests: u64,

    /// File listing remote hosts, one per line
    #[arg(long = "hosts-file", default_value = "hosts")]
    pub hosts_file: PathBuf,

    /// Program to invoke on each remote host (defaults to this binary's path)
    #[arg(long = "remote-prog")]
    pub remote_prog: Option<String>,

    /// Dispatch all hosts at once instead of one after another
    #[arg(long)]
    pub parallel: bool,
}

impl Cli {
    /// Builds the run configuration shared by all modes.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            workload: self.workload,
            read_url: self.read_url.clone(),
            write_url: self.write_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}
