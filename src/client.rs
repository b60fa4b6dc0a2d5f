use std::time::Duration;

use crate::errors::AppError;

/// Builds the reqwest HTTP client shared by every worker in a run.
///
/// The client pools connections across workers; `timeout` bounds each
/// individual request.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_timeout() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
