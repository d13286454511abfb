// Presentation layer - HTTP shell around the power panel
pub mod app_state;
pub mod handlers;
