// Power telemetry domain models
use serde::Serialize;
use serde_json::Value;

/// One telemetry point reported by a frame at check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub sample_epoch: i64,
    pub battery_percent: Option<u8>,
    pub battery_mv: Option<u32>,
    pub vbus_good: Option<bool>,
    pub charging: Option<bool>,
}

impl Sample {
    pub fn new(sample_epoch: i64) -> Self {
        Self {
            sample_epoch,
            battery_percent: None,
            battery_mv: None,
            vbus_good: None,
            charging: None,
        }
    }

    pub fn with_percent(mut self, percent: Option<u8>) -> Self {
        self.battery_percent = percent.filter(|p| *p <= 100);
        self
    }

    pub fn with_mv(mut self, mv: Option<u32>) -> Self {
        self.battery_mv = mv.filter(|mv| *mv > 0);
        self
    }

    pub fn with_vbus(mut self, vbus_good: Option<bool>) -> Self {
        self.vbus_good = vbus_good;
        self
    }

    pub fn with_charging(mut self, charging: Option<bool>) -> Self {
        self.charging = charging;
        self
    }

    /// Build a sample from loosely typed wire fields.
    ///
    /// Returns `None` only when the epoch itself is unusable; every other
    /// field degrades to absent on its own.
    pub fn from_wire(
        epoch: &Value,
        battery_percent: &Value,
        battery_mv: &Value,
        vbus_good: &Value,
        charging: &Value,
    ) -> Option<Self> {
        let sample_epoch = wire_integer(epoch).filter(|e| *e > 0)?;
        Some(
            Self::new(sample_epoch)
                .with_percent(wire_percent(battery_percent))
                .with_mv(wire_millivolts(battery_mv))
                .with_vbus(wire_flag(vbus_good))
                .with_charging(wire_flag(charging)),
        )
    }
}

/// Samples for one device over a queried window, in ascending epoch order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSeries {
    pub device_id: String,
    pub from_epoch: i64,
    pub to_epoch: i64,
    pub samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new(device_id: String, from_epoch: i64, to_epoch: i64, samples: Vec<Sample>) -> Self {
        Self {
            device_id,
            from_epoch,
            to_epoch,
            samples,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Integer field as reported by the orchestrator. Accepts JSON numbers and
/// numeric strings; fractional values are truncated.
pub fn wire_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Battery percent; the orchestrator stores -1 for "not reported".
pub fn wire_percent(value: &Value) -> Option<u8> {
    wire_integer(value)
        .filter(|p| (0..=100).contains(p))
        .map(|p| p as u8)
}

pub fn wire_millivolts(value: &Value) -> Option<u32> {
    wire_integer(value)
        .filter(|mv| *mv > 0 && *mv <= i64::from(u32::MAX))
        .map(|mv| mv as u32)
}

/// Tri-state 0/1 flag; anything else (including the -1 sentinel) is unknown.
pub fn wire_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        other => match wire_integer(other) {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
    }
}
