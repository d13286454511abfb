// Repository trait for power telemetry access
use crate::domain::device::DeviceSnapshot;
use crate::domain::power::SampleSeries;
use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the orchestrator. Analysis never produces these.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network error, timeout or connection refused
    #[error("request failed: {0}")]
    Request(String),

    /// Orchestrator answered with a non-success status
    #[error("orchestrator returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Power samples for one device in `[from_epoch, to_epoch]`, ascending by epoch
    async fn fetch_samples(
        &self,
        device_id: &str,
        from_epoch: i64,
        to_epoch: i64,
        limit: usize,
    ) -> Result<SampleSeries, FetchError>;

    /// Latest check-in state of every known device
    async fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, FetchError>;
}
