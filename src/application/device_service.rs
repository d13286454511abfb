// Device service - Use case for listing frames
use crate::application::sample_repository::{FetchError, SampleRepository};
use crate::domain::device::DeviceSnapshot;
use std::sync::Arc;

#[derive(Clone)]
pub struct DeviceService {
    repository: Arc<dyn SampleRepository>,
}

impl DeviceService {
    pub fn new(repository: Arc<dyn SampleRepository>) -> Self {
        Self { repository }
    }

    /// Devices sorted by id so the selector is stable between refreshes.
    pub async fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, FetchError> {
        let mut devices = self.repository.list_devices().await?;
        devices.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        devices.dedup_by(|a, b| a.device_id == b.device_id);
        Ok(devices)
    }
}
