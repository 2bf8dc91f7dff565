use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cascade::{Fetch, Response, ResponseError, Source, SourceParams, SourceType};

/// A pretend remote service: slow, counts its calls, stores nothing.
pub struct SlowNetwork {
    latency: Duration,
    calls: Mutex<u32>,
}

impl SlowNetwork {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self {
            latency,
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Fetch<String> for SlowNetwork {
    async fn get(&self, params: &SourceParams) -> Result<Response<String>, ResponseError> {
        tokio::time::sleep(self.latency).await;
        let n = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        let who = params
            .payload::<String>()
            .cloned()
            .unwrap_or_else(|| "world".into());
        Ok(Response::new(format!("hello {who} (#{n})"), SourceType::Network).with_origin_id("api"))
    }
}

#[async_trait]
impl Source<String> for SlowNetwork {
    fn name(&self) -> &'static str {
        "api"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Network
    }

    async fn store(&self, _response: &Response<String>) {}

    fn peek(&self, _params: &SourceParams) -> Option<String> {
        None
    }

    fn clear(&self, _params: &SourceParams) {}
}
