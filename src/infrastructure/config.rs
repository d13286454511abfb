use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "PHOTOFRAME";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub orchestrator: OrchestratorSettings,
    pub panel: PanelSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrchestratorSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub sample_limit: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PanelSettings {
    pub default_days: i64,
    pub default_threshold: u8,
    pub chart_width: u32,
    pub chart_height: u32,
    pub resize_debounce_ms: u64,
    /// Fixed offset used for every displayed timestamp.
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("orchestrator.base_url", "http://127.0.0.1:8000")?
        .set_default("orchestrator.sample_limit", 5000)?
        .set_default("orchestrator.timeout_seconds", 15)?
        .set_default("panel.default_days", 7)?
        .set_default("panel.default_threshold", 10)?
        .set_default("panel.chart_width", 900)?
        .set_default("panel.chart_height", 260)?
        .set_default("panel.resize_debounce_ms", 200)?
        .set_default("panel.utc_offset_minutes", 0)?
        .set_default("server.bind_address", "0.0.0.0:8080")?)
}

/// Defaults, then `config/dashboard.{toml,yaml,json}` if present, then
/// `PHOTOFRAME__SECTION__KEY` environment variables.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
