//! Randomized request construction for the read and write workloads.
//!
//! Every request gets freshly drawn tokens. The randomness source is an
//! explicit parameter so production code can pass `thread_rng()` while
//! tests pass a seeded generator.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::{RunConfig, Workload};

/// Length of every generated token, for both short keys and long-URL stems.
pub const TOKEN_LEN: usize = 10;

/// Generates a random token drawn uniformly, with replacement, from the
/// 62-character alphabet `[A-Za-z0-9]`.
pub fn random_token<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// Generates a random long URL shaped `https://<token>.com`.
pub fn random_long_url<R: Rng>(rng: &mut R) -> String {
    format!("https://{}.com", random_token(rng, TOKEN_LEN))
}

/// Builds one randomized request for the configured workload.
///
/// Read: `GET <read_url>/<token>`, following a random shortened link.
/// Write: `PUT <write_url>?short=<token>&long=https://<token>.com`,
/// registering a random short/long pair. Both values are randomized in
/// every mode.
pub fn build_request<R: Rng>(
    client: &reqwest::Client,
    config: &RunConfig,
    rng: &mut R,
) -> reqwest::RequestBuilder {
    match config.workload {
        Workload::Read => {
            let short = random_token(rng, TOKEN_LEN);
            let url = format!("{}/{}", config.read_url.trim_end_matches('/'), short);
            client.get(url)
        }
        Workload::Write => {
            let short = random_token(rng, TOKEN_LEN);
            let long = random_long_url(rng);
            client
                .put(&config.write_url)
                .query(&[("short", short.as_str()), ("long", long.as_str())])
        }
    }
}
