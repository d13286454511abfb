// Application state for HTTP handlers
use crate::application::device_service::DeviceService;
use crate::application::power_panel::PowerPanel;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub device_service: DeviceService,
    pub power_panel: Arc<PowerPanel>,
}
