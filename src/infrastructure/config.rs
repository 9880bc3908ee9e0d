use crate::application::dashboard_session::SessionSettings;
use crate::domain::chart::StyleConfig;
use serde::Deserialize;
use std::collections::HashMap;

const CONFIG_FILE: &str = "config/dashboard";
const ENV_PREFIX: &str = "FLEET";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub session: String,
    pub schema_id: String,
    pub timeout_secs: u64,
    /// Telemetry query template; `${session}`, `${schema}`, `${device}`,
    /// `${from}` and `${to}` are substituted per request.
    pub track_path: String,
    /// Vehicle listing template; `${session}` and `${schema}` are substituted.
    pub vehicles_path: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            session: String::new(),
            schema_id: String::new(),
            timeout_secs: 10,
            track_path: "/analytics/track/?session=${session}&schema_id=${schema}&device_id=${device}&from=${from}&to=${to}"
                .to_string(),
            vehicles_path: "/vehicles/?session_id=${session}&schema_id=${schema}".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub grid_cols: u32,
    /// Zero disables periodic refresh.
    pub refresh_interval_secs: u64,
    pub auto_create_chart: bool,
    pub default_style: StyleConfig,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            grid_cols: crate::application::chart_registry::DEFAULT_GRID_COLS,
            refresh_interval_secs: 0,
            auto_create_chart: true,
            default_style: StyleConfig::default(),
        }
    }
}

impl DashboardSettings {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            grid_cols: self.grid_cols,
            default_style: self.default_style.clone(),
            auto_create_chart: self.auto_create_chart,
        }
    }
}

/// `config/dashboard.{toml,...}` if present, overlaid by `FLEET__SECTION__KEY`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_config(config::File::with_name(CONFIG_FILE).required(false), None)
}

fn build_config<S>(file: S, env: Option<HashMap<String, String>>) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
