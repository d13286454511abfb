// Device check-in snapshot
use serde::Serialize;

/// Latest check-in state of one frame as reported by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub last_checkin_epoch: Option<i64>,
    pub battery_percent: Option<u8>,
    pub battery_mv: Option<u32>,
    pub vbus_good: Option<bool>,
    pub charging: Option<bool>,
}

impl DeviceSnapshot {
    pub fn new(device_id: String) -> Self {
        Self {
            device_id: normalize_device_id(&device_id),
            last_checkin_epoch: None,
            battery_percent: None,
            battery_mv: None,
            vbus_good: None,
            charging: None,
        }
    }

    pub fn power_source(&self) -> &'static str {
        match (self.vbus_good, self.charging) {
            (Some(true), Some(true)) => "USB (charging)",
            (Some(true), _) => "USB",
            (Some(false), _) => "battery",
            (None, _) => "unknown",
        }
    }
}

/// Device ids are compared trimmed; the orchestrator caps them at 64 chars.
pub fn normalize_device_id(raw: &str) -> String {
    raw.trim().chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_device_id() {
        assert_eq!(normalize_device_id("  frame-01 "), "frame-01");
        assert_eq!(normalize_device_id(&"x".repeat(80)).len(), 64);
    }

    #[test]
    fn test_power_source() {
        let mut device = DeviceSnapshot::new("frame-01".to_string());
        assert_eq!(device.power_source(), "unknown");

        device.vbus_good = Some(true);
        device.charging = Some(true);
        assert_eq!(device.power_source(), "USB (charging)");

        device.charging = Some(false);
        assert_eq!(device.power_source(), "USB");

        device.vbus_good = Some(false);
        assert_eq!(device.power_source(), "battery");
    }
}
