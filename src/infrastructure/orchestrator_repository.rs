// Photo-frame orchestrator HTTP repository implementation
use crate::application::sample_repository::{FetchError, SampleRepository};
use crate::domain::device::DeviceSnapshot;
use crate::domain::power::{
    Sample, SampleSeries, wire_flag, wire_integer, wire_millivolts, wire_percent,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const TOKEN_HEADER: &str = "X-PhotoFrame-Token";

#[derive(Debug, Clone)]
pub struct OrchestratorRepository {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SamplesResponse {
    #[serde(default)]
    items: Vec<RawSample>,
    #[serde(default)]
    from_epoch: Value,
    #[serde(default)]
    to_epoch: Value,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    #[serde(default)]
    sample_epoch: Value,
    #[serde(default)]
    battery_percent: Value,
    #[serde(default)]
    battery_mv: Value,
    #[serde(default)]
    vbus_good: Value,
    #[serde(default)]
    charging: Value,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
struct RawDevice {
    device_id: String,
    #[serde(default)]
    last_checkin_epoch: Value,
    #[serde(default)]
    battery_percent: Value,
    #[serde(default)]
    battery_mv: Value,
    #[serde(default)]
    vbus_good: Value,
    #[serde(default)]
    charging: Value,
}

impl OrchestratorRepository {
    pub fn new(base_url: String, token: Option<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn build_samples_url(&self, device_id: &str, from_epoch: i64, to_epoch: i64, limit: usize) -> String {
        format!(
            "{}/api/v1/power-samples?device_id={}&from_epoch={}&to_epoch={}&limit={}",
            self.base_url,
            urlencoding::encode(device_id),
            from_epoch,
            to_epoch,
            limit
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

fn decode_samples(
    device_id: &str,
    from_epoch: i64,
    to_epoch: i64,
    body: Value,
) -> Result<SampleSeries, FetchError> {
    let response: SamplesResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let total = response.items.len();
    let mut samples: Vec<Sample> = response
        .items
        .iter()
        .filter_map(|raw| {
            Sample::from_wire(
                &raw.sample_epoch,
                &raw.battery_percent,
                &raw.battery_mv,
                &raw.vbus_good,
                &raw.charging,
            )
        })
        .collect();

    if samples.len() < total {
        tracing::warn!(
            "Dropped {} power samples without a usable epoch for {}",
            total - samples.len(),
            device_id
        );
    }

    // Ordering is promised upstream; a stable sort keeps equal epochs in place.
    samples.sort_by_key(|s| s.sample_epoch);

    Ok(SampleSeries::new(
        device_id.to_string(),
        wire_integer(&response.from_epoch).unwrap_or(from_epoch),
        wire_integer(&response.to_epoch).unwrap_or(to_epoch),
        samples,
    ))
}

fn decode_devices(body: Value) -> Result<Vec<DeviceSnapshot>, FetchError> {
    let response: DevicesResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(response
        .devices
        .into_iter()
        .map(|raw| {
            let mut device = DeviceSnapshot::new(raw.device_id);
            device.last_checkin_epoch = wire_integer(&raw.last_checkin_epoch).filter(|e| *e > 0);
            device.battery_percent = wire_percent(&raw.battery_percent);
            device.battery_mv = wire_millivolts(&raw.battery_mv);
            device.vbus_good = wire_flag(&raw.vbus_good);
            device.charging = wire_flag(&raw.charging);
            device
        })
        .filter(|d| !d.device_id.is_empty())
        .collect())
}

#[async_trait]
impl SampleRepository for OrchestratorRepository {
    async fn fetch_samples(
        &self,
        device_id: &str,
        from_epoch: i64,
        to_epoch: i64,
        limit: usize,
    ) -> Result<SampleSeries, FetchError> {
        let url = self.build_samples_url(device_id, from_epoch, to_epoch, limit);
        tracing::debug!("Fetching power samples: {}", url);

        let body = self.get_json(&url).await?;
        let series = decode_samples(device_id, from_epoch, to_epoch, body)?;

        tracing::debug!(
            "Got {} power samples for {}",
            series.samples.len(),
            device_id
        );
        Ok(series)
    }

    async fn list_devices(&self) -> Result<Vec<DeviceSnapshot>, FetchError> {
        let url = format!("{}/api/v1/devices", self.base_url);
        let body = self.get_json(&url).await?;
        decode_devices(body)
    }
}
