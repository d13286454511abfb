// Power panel - Orchestrates fetch, analysis and chart rendering for one device
use crate::application::sample_repository::SampleRepository;
use crate::application::summary::build_summary;
use crate::domain::cadence;
use crate::domain::chart::{self, ChartWindow};
use crate::domain::device::{DeviceSnapshot, normalize_device_id};
use crate::domain::discharge::{self, DischargeReport};
use crate::domain::power::SampleSeries;
use crate::infrastructure::config::PanelSettings;
use crate::infrastructure::svg_surface::SvgSurface;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

const SECONDS_PER_DAY: i64 = 24 * 3600;
const MAX_WINDOW_DAYS: i64 = 365;

pub const SELECT_DEVICE_PROMPT: &str = "Select a device to view its power history.";

/// Raw panel inputs as they arrive from the shell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PanelRequest {
    pub device_id: Option<String>,
    pub days: Option<i64>,
    pub threshold: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl ChartSize {
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.clamp(200, 4000),
            height: self.height.clamp(120, 2000),
        }
    }
}

/// Identity of one refresh. A response is applied only while its key is
/// still the latest one issued.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RequestKey {
    seq: u64,
    device_id: String,
    from_epoch: i64,
    to_epoch: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelStatus {
    Idle,
    Prompt { message: String },
    Loading,
    Ready,
    Failed { message: String },
}

/// Everything the shell shows besides the chart itself.
#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub status: PanelStatus,
    pub device_id: Option<String>,
    pub from_epoch: Option<i64>,
    pub to_epoch: Option<i64>,
    pub threshold_percent: u8,
    pub sample_count: usize,
    pub cadence_seconds: Option<i64>,
    pub summary: Option<String>,
    pub notice: Option<String>,
    pub report: Option<DischargeReport>,
    pub chart_revision: u64,
}

impl PanelView {
    fn idle(threshold_percent: u8) -> Self {
        Self {
            status: PanelStatus::Idle,
            device_id: None,
            from_epoch: None,
            to_epoch: None,
            threshold_percent,
            sample_count: 0,
            cadence_seconds: None,
            summary: None,
            notice: None,
            report: None,
            chart_revision: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Prompted,
    Applied,
    Failed,
    /// A newer refresh was issued while this one was in flight.
    Superseded,
}

/// Last rendered input, kept so a resize can redraw without refetching.
struct RenderCache {
    device_id: String,
    window: ChartWindow,
    series: Arc<SampleSeries>,
}

struct PanelState {
    next_seq: u64,
    latest: Option<RequestKey>,
    view: PanelView,
    cache: Option<Arc<RenderCache>>,
    chart: Option<Arc<str>>,
    size: ChartSize,
    devices: HashMap<String, DeviceSnapshot>,
    pending_resize: Option<JoinHandle<()>>,
    resize_generation: u64,
}

pub struct PowerPanel {
    repository: Arc<dyn SampleRepository>,
    settings: PanelSettings,
    sample_limit: usize,
    state: Mutex<PanelState>,
}

impl PowerPanel {
    pub fn new(
        repository: Arc<dyn SampleRepository>,
        settings: PanelSettings,
        sample_limit: usize,
    ) -> Self {
        let state = PanelState {
            next_seq: 0,
            latest: None,
            view: PanelView::idle(settings.default_threshold.min(100)),
            cache: None,
            chart: None,
            size: ChartSize {
                width: settings.chart_width,
                height: settings.chart_height,
            }
            .clamped(),
            devices: HashMap::new(),
            pending_resize: None,
            resize_generation: 0,
        };

        Self {
            repository,
            settings,
            sample_limit,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn view(&self) -> PanelView {
        self.lock().view.clone()
    }

    pub fn chart_svg(&self) -> Option<Arc<str>> {
        self.lock().chart.clone()
    }

    /// Replace the known device map with a fresh listing.
    pub fn set_devices(&self, devices: &[DeviceSnapshot]) {
        let map = devices
            .iter()
            .map(|d| (d.device_id.clone(), d.clone()))
            .collect();
        self.lock().devices = map;
    }

    /// Fetch, analyze and render the requested device and window.
    ///
    /// Results arriving after a newer refresh was issued are dropped, so
    /// overlapping triggers always settle on the latest request.
    pub async fn refresh(&self, request: PanelRequest, now_epoch: i64) -> RefreshOutcome {
        let device_id = request
            .device_id
            .as_deref()
            .map(normalize_device_id)
            .filter(|id| !id.is_empty());

        let days = request
            .days
            .unwrap_or(self.settings.default_days)
            .clamp(1, MAX_WINDOW_DAYS);
        let threshold = request
            .threshold
            .unwrap_or(i64::from(self.settings.default_threshold))
            .clamp(0, 100) as u8;

        let Some(device_id) = device_id else {
            let mut state = self.lock();
            state.latest = None;
            state.cache = None;
            state.chart = None;
            let revision = state.view.chart_revision + 1;
            state.view = PanelView {
                status: PanelStatus::Prompt {
                    message: SELECT_DEVICE_PROMPT.to_string(),
                },
                chart_revision: revision,
                ..PanelView::idle(threshold)
            };
            return RefreshOutcome::Prompted;
        };

        let to_epoch = now_epoch;
        let from_epoch = now_epoch - days * SECONDS_PER_DAY;

        let key = {
            let mut state = self.lock();
            state.next_seq += 1;
            let key = RequestKey {
                seq: state.next_seq,
                device_id: device_id.clone(),
                from_epoch,
                to_epoch,
            };
            state.latest = Some(key.clone());
            state.view.status = PanelStatus::Loading;
            key
        };

        tracing::debug!(
            "Fetching power samples for {} ({} days, request {})",
            device_id,
            days,
            key.seq
        );

        let result = self
            .repository
            .fetch_samples(&device_id, from_epoch, to_epoch, self.sample_limit)
            .await;

        let mut state = self.lock();
        if state.latest.as_ref() != Some(&key) {
            tracing::debug!(
                "Discarding stale power samples for {} (request {})",
                device_id,
                key.seq
            );
            return RefreshOutcome::Superseded;
        }

        let series = match result {
            Ok(series) => Arc::new(series),
            Err(e) => {
                tracing::warn!("Failed to load power samples for {}: {}", device_id, e);
                state.view.status = PanelStatus::Failed {
                    message: format!("Failed to load power samples: {}", e),
                };
                return RefreshOutcome::Failed;
            }
        };

        let offset = self.settings.utc_offset_minutes;
        let cadence_seconds = cadence::estimate(&series.samples);
        let report = discharge::analyze(&series.samples, threshold);
        let summary = build_summary(&report, cadence_seconds, threshold, offset);

        let notice = if !state.devices.is_empty() && !state.devices.contains_key(&device_id) {
            Some(format!("{} is not in the current device list", device_id))
        } else {
            None
        };

        let cache = Arc::new(RenderCache {
            device_id: device_id.clone(),
            window: ChartWindow::new(from_epoch, to_epoch, offset),
            series: series.clone(),
        });
        let svg = draw_chart(&cache, state.size);
        let revision = state.view.chart_revision + 1;

        state.view = PanelView {
            status: PanelStatus::Ready,
            device_id: Some(device_id),
            from_epoch: Some(from_epoch),
            to_epoch: Some(to_epoch),
            threshold_percent: threshold,
            sample_count: series.samples.len(),
            cadence_seconds,
            summary: Some(summary),
            notice,
            report: Some(report),
            chart_revision: revision,
        };
        state.cache = Some(cache);
        state.chart = Some(svg);

        RefreshOutcome::Applied
    }

    /// Redraw the cached series at a new size after the debounce delay.
    /// A resize arriving while one is pending replaces it.
    pub fn schedule_resize(self: &Arc<Self>, size: ChartSize) {
        let size = size.clamped();
        let delay = Duration::from_millis(self.settings.resize_debounce_ms);
        let panel = Arc::clone(self);

        let mut state = self.lock();
        state.resize_generation += 1;
        let generation = state.resize_generation;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            panel.redraw(size, generation);
        });

        if let Some(previous) = state.pending_resize.replace(task) {
            previous.abort();
        }
    }

    /// Only the most recently scheduled resize may redraw. A replaced task
    /// that was already running when aborted leaves the newer one alone.
    fn redraw(&self, size: ChartSize, generation: u64) {
        let mut state = self.lock();
        if state.resize_generation != generation {
            return;
        }
        state.size = size;
        state.pending_resize = None;

        let Some(cache) = state.cache.clone() else {
            return;
        };

        tracing::debug!(
            "Redrawing power chart for {} at {}x{}",
            cache.device_id,
            size.width,
            size.height
        );
        state.chart = Some(draw_chart(&cache, size));
        state.view.chart_revision += 1;
    }
}

fn draw_chart(cache: &RenderCache, size: ChartSize) -> Arc<str> {
    let mut svg = String::new();
    let mut surface = SvgSurface::new(&mut svg, size.width, size.height);
    chart::render(&mut surface, &cache.series.samples, &cache.window);
    if let Err(e) = surface.finish() {
        tracing::warn!("{} ({})", e, cache.device_id);
    }
    Arc::from(svg)
}
