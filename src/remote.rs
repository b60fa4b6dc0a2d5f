//! Remote-host fanout: run the single-worker mode on each host over ssh.
//!
//! Each host gets one child process running `<launcher> <host> <remote
//! command>`. The remote command re-invokes this program's `single` mode
//! with the same workload and targets. Child stdout/stderr are inherited,
//! so each remote run's own summary stays visible.

use std::path::Path;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::errors::AppError;

/// Options for a remote fanout run.
#[derive(Debug, Clone)]
pub struct FanoutOptions {
    /// Program to run on each remote host, normally this binary's own path.
    pub remote_prog: String,

    /// Dispatch every host before awaiting any, instead of one at a time.
    pub parallel: bool,

    /// Launcher used to reach a host. `ssh` in production; tests substitute
    /// a local command.
    pub launcher: String,
}

impl FanoutOptions {
    pub fn new(remote_prog: String, parallel: bool) -> Self {
        Self {
            remote_prog,
            parallel,
            launcher: "ssh".to_string(),
        }
    }
}

/// Result of a remote fanout run.
#[derive(Debug, Clone)]
pub struct FanoutReport {
    pub hosts_dispatched: usize,
    pub hosts_succeeded: usize,
    pub hosts_failed: usize,

    /// Total requests the fanout asked the remote workers to attempt.
    pub attempted: u64,

    pub elapsed: Duration,
}

impl FanoutReport {
    /// Requests per second across the whole fanout: attempted / elapsed.
    pub fn throughput(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.attempted as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Format the end-of-run report, uniform with the local modes.
    pub fn format_report(&self) -> String {
        let mut output = String::new();
        output.push_str("\n--- RUN SUMMARY (hosts) ---\n");
        output.push_str(&format!("Hosts dispatched:   {}\n", self.hosts_dispatched));
        output.push_str(&format!("Hosts succeeded:    {}\n", self.hosts_succeeded));
        output.push_str(&format!("Hosts failed:       {}\n", self.hosts_failed));
        output.push_str(&format!("Requests attempted: {}\n", self.attempted));
        output.push_str(&format!(
            "Elapsed:            {:.2}s\n",
            self.elapsed.as_secs_f64()
        ));
        output.push_str(&format!(
            "Throughput:         {:.2} req/s\n",
            self.throughput()
        ));
        output
    }
}

/// Reads the host list: one hostname per line, whitespace trimmed, blank
/// lines skipped.
///
/// A missing or unreadable file, or a file with no usable entries, is a
/// configuration error.
pub fn load_hosts(path: &Path) -> Result<Vec<String>, AppError> {
    let contents = std::fs::read_to_string(path).map_err(|source| AppError::HostsFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let hosts: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    if hosts.is_empty() {
        return Err(AppError::EmptyHostList {
            path: path.to_path_buf(),
        });
    }

    Ok(hosts)
}

/// Runs the single-worker command on every host in order.
///
/// The join policy is explicit. Serial (the default): each host is awaited
/// before the next is dispatched, so hosts run one after another. Parallel
/// (`options.parallel`): every host is dispatched first, then all children
/// are awaited; hosts run concurrently.
///
/// A host whose child fails to start, exits non-zero, or cannot be awaited
/// counts as failed; the fanout itself always runs to completion.
pub async fn run_distributed(
    requests: u64,
    hosts: &[String],
    config: &RunConfig,
    options: &FanoutOptions,
) -> FanoutReport {
    info!(
        hosts = hosts.len(),
        requests,
        parallel = options.parallel,
        "Starting remote fanout"
    );
    let start = Instant::now();
    let mut succeeded = 0usize;

    if options.parallel {
        let children: Vec<(&String, std::io::Result<Child>)> = hosts
            .iter()
            .map(|host| (host, spawn_remote(host, requests, config, options)))
            .collect();

        for (host, child) in children {
            if await_child(host, child).await {
                succeeded += 1;
            }
        }
    } else {
        for host in hosts {
            let child = spawn_remote(host, requests, config, options);
            if await_child(host, child).await {
                succeeded += 1;
            }
        }
    }

    let hosts_dispatched = hosts.len();
    FanoutReport {
        hosts_dispatched,
        hosts_succeeded: succeeded,
        hosts_failed: hosts_dispatched - succeeded,
        attempted: requests * hosts.len() as u64,
        elapsed: start.elapsed(),
    }
}

fn spawn_remote(
    host: &str,
    requests: u64,
    config: &RunConfig,
    options: &FanoutOptions,
) -> std::io::Result<Child> {
    let remote_cmd = format!(
        "{} single {} --workload {} --read-url {} --write-url {}",
        options.remote_prog,
        requests,
        config.workload.as_str(),
        config.read_url,
        config.write_url
    );

    debug!(host, command = %remote_cmd, "Dispatching remote run");
    Command::new(&options.launcher)
        .arg(host)
        .arg(remote_cmd)
        .spawn()
}

async fn await_child(host: &str, child: std::io::Result<Child>) -> bool {
    match child {
        Ok(mut child) => match child.wait().await {
            Ok(status) if status.success() => {
                debug!(host, "Remote run finished");
                true
            }
            Ok(status) => {
                error!(host, code = ?status.code(), "Remote run exited with failure");
                false
            }
            Err(e) => {
                error!(host, error = %e, "Failed waiting for remote run");
                false
            }
        },
        Err(e) => {
            error!(host, error = %e, "Failed to start remote run");
            false
        }
    }
}
