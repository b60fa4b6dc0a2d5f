use clap::Parser;
use tracing_subscriber::EnvFilter;

use shortlink_loadtest::cli::{Cli, Mode};
use shortlink_loadtest::client::build_client;
use shortlink_loadtest::errors::AppError;
use shortlink_loadtest::remote::{load_hosts, run_distributed, FanoutOptions};
use shortlink_loadtest::worker::{run_concurrent, run_single};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = cli.run_config();

    match cli.mode {
        Mode::Single(args) => {
            config.print_summary("single");
            let client = build_client(config.timeout)?;
            let summary = run_single(&client, &config, args.requests).await;
            print!("{}", summary.format_report("single"));
        }
        Mode::Threads(args) => {
            config.print_summary("threads");
            println!("  Users: {}", args.users);
            let client = build_client(config.timeout)?;
            let summary = run_concurrent(client, config, args.requests, args.users).await;
            print!("{}", summary.format_report("threads"));
        }
        Mode::Hosts(args) => {
            config.print_summary("hosts");
            let hosts = load_hosts(&args.hosts_file)?;
            println!("  Hosts: {}", hosts.len());

            let remote_prog = args.remote_prog.unwrap_or_else(default_remote_prog);
            let options = FanoutOptions::new(remote_prog, args.parallel);
            let report = run_distributed(args.requests, &hosts, &config, &options).await;
            print!("{}", report.format_report());
        }
    }

    Ok(())
}

/// Path of this binary; the fanout assumes it is installed at the same
/// path on every remote host unless --remote-prog overrides it.
fn default_remote_prog() -> String {
    std::env::current_exe()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| "shortlink_loadtest".to_string())
}
