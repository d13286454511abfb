// Domain layer - Power telemetry models and the pure analysis engine
pub mod cadence;
pub mod chart;
pub mod device;
pub mod discharge;
pub mod format;
pub mod power;
