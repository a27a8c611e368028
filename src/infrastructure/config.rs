use crate::domain::dashboard::Dashboard;
use crate::error::{AppError, AppResult};
use crate::infrastructure::grafana_client::{ClientCertificate, RenderAuth};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/graph";
const ENV_PREFIX: &str = "GRAPH";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub slack: SlackSettings,
    pub grafana: GrafanaSettings,
    #[serde(default)]
    pub dashboards: Vec<DashboardConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackSettings {
    #[serde(deserialize_with = "secret")]
    pub token: SecretString,
    #[serde(deserialize_with = "secret")]
    pub secret: SecretString,
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrafanaSettings {
    pub endpoint: String,
    #[serde(default)]
    pub auth_header: Option<String>,
    #[serde(default, deserialize_with = "optional_secret")]
    pub auth_value: Option<SecretString>,
    #[serde(default)]
    pub use_client_auth: bool,
    #[serde(default)]
    pub client_auth_p12: Option<PathBuf>,
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
}

// Keys follow the dashboard URL vocabulary; lowercase aliases cover sources
// that fold key case (environment variables).
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub name: String,
    #[serde(rename = "dashboardId", alias = "dashboardid")]
    pub dashboard_id: String,
    #[serde(rename = "dashboardName", alias = "dashboardname")]
    pub dashboard_name: String,
    #[serde(rename = "orgId", alias = "orgid")]
    pub org_id: String,
    #[serde(rename = "panelId", alias = "panelid")]
    pub panel_id: String,
}

impl From<DashboardConfig> for Dashboard {
    fn from(config: DashboardConfig) -> Self {
        Dashboard::new(
            config.name,
            config.dashboard_id,
            config.dashboard_name,
            config.org_id,
            config.panel_id,
        )
    }
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_command() -> String {
    crate::application::command_service::DEFAULT_TRIGGER.to_string()
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Read the configuration file, overlaid by `GRAPH_*` environment variables
/// (`GRAPH_SLACK__SECRET` sets `slack.secret`).
pub fn load_app_config(path: &str) -> AppResult<AppConfig> {
    load_with_environment(path, None)
}

/// `environment` replaces the process environment when set.
fn load_with_environment(
    path: &str,
    environment: Option<config::Map<String, String>>,
) -> AppResult<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(environment),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

impl AppConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.grafana.endpoint.trim().is_empty() {
            return Err(AppError::Config("grafana.endpoint is empty".to_string()));
        }
        if self.dashboards.iter().any(|d| d.name.is_empty()) {
            return Err(AppError::Config("dashboard with an empty name".to_string()));
        }
        self.grafana.check_auth()
    }

    pub fn dashboards(&self) -> Vec<Dashboard> {
        self.dashboards.iter().cloned().map(Dashboard::from).collect()
    }
}

impl GrafanaSettings {
    fn check_auth(&self) -> AppResult<()> {
        let header_mode = self.auth_header.is_some() || self.auth_value.is_some();
        if header_mode && self.use_client_auth {
            return Err(AppError::Config(
                "grafana header auth and client certificate auth are mutually exclusive".to_string(),
            ));
        }
        if header_mode && (self.auth_header.is_none() || self.auth_value.is_none()) {
            return Err(AppError::Config(
                "grafana.auth_header and grafana.auth_value must be set together".to_string(),
            ));
        }
        if self.use_client_auth && self.client_auth_p12.is_none() {
            return Err(AppError::Config(
                "grafana.use_client_auth requires grafana.client_auth_p12".to_string(),
            ));
        }
        Ok(())
    }

    /// Select the single authentication mode for the render client.
    pub fn render_auth(&self, p12_password: SecretString) -> AppResult<RenderAuth> {
        self.check_auth()?;

        if self.use_client_auth {
            if let Some(p12_path) = &self.client_auth_p12 {
                return Ok(RenderAuth::Certificate(ClientCertificate {
                    p12_path: p12_path.clone(),
                    password: p12_password,
                    ca_bundle: self.ca_bundle.clone(),
                }));
            }
        }

        match (&self.auth_header, &self.auth_value) {
            (Some(name), Some(value)) => Ok(RenderAuth::Header {
                name: name.clone(),
                value: value.clone(),
            }),
            _ => Ok(RenderAuth::None),
        }
    }
}
