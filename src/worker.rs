use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::errors::ErrorCategory;
use crate::request::build_request;
use crate::summary::{RequestOutcome, RunSummary};

/// Runs one worker: issues exactly `requests` sequential requests, each
/// with freshly randomized parameters, and records every outcome.
///
/// A failed request is counted and categorized, never fatal; the loop
/// always attempts the full count.
pub async fn run_single(
    client: &reqwest::Client,
    config: &RunConfig,
    requests: u64,
) -> RunSummary {
    let mut rng = StdRng::from_entropy();
    let mut summary = RunSummary::new();
    let start = Instant::now();

    for seq in 0..requests {
        let request = build_request(client, config, &mut rng);
        let request_start = Instant::now();

        match request.send().await {
            Ok(mut response) => {
                let status = response.status().as_u16();

                // Consume the body in chunks so responses don't buffer.
                while let Ok(Some(_chunk)) = response.chunk().await {
                    // Chunk read and immediately dropped
                }

                debug!(seq, status_code = status, "Request completed");
                summary.record(RequestOutcome::Completed {
                    status,
                    latency: request_start.elapsed(),
                });
            }
            Err(e) => {
                let category = ErrorCategory::from_reqwest_error(&e);
                error!(
                    seq,
                    error = %e,
                    error_category = %category.label(),
                    "Request failed"
                );
                summary.record(RequestOutcome::Failed {
                    category,
                    latency: request_start.elapsed(),
                });
            }
        }
    }

    summary.set_elapsed(start.elapsed());
    summary
}

/// Starts `users` independent workers, each issuing `requests` requests,
/// and waits for all of them to finish.
///
/// The effective total issued is `requests * users`. Ordering between
/// workers is unspecified; they share nothing but the pooled client.
pub async fn run_concurrent(
    client: reqwest::Client,
    config: RunConfig,
    requests: u64,
    users: usize,
) -> RunSummary {
    info!(requests, users, "Starting concurrent workers");
    let start = Instant::now();

    let mut handles = Vec::with_capacity(users);
    for task_id in 0..users {
        let client = client.clone();
        let config = config.clone();
        let handle = tokio::spawn(async move {
            debug!(task_id, "Worker starting");
            run_single(&client, &config, requests).await
        });
        handles.push(handle);
    }

    let mut merged = RunSummary::new();
    for (task_id, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(worker_summary) => merged.merge(&worker_summary),
            Err(e) => {
                // Join only fails on panic or cancellation; account for the
                // worker's whole batch so attempted stays requests * users.
                error!(task_id, error = %e, "Worker task lost");
                merged.record_aborted(requests);
            }
        }
    }

    merged.set_elapsed(start.elapsed());
    merged
}
