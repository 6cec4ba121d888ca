use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    /// Delay before the first poll and between polls of an active game.
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: "http://localhost:8080/".to_owned(),
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(1000),
            retry: RetryPolicy::default(),
        }
    }
}
