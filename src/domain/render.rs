// Render request/result values passed between the dispatcher and the render client
use super::dashboard::Dashboard;
use bytes::Bytes;

pub const DEFAULT_TO: &str = "now";

/// Optional query parameters for a solo-panel render.
///
/// `to` falls back to `now` whenever `from` is set. With neither set the
/// backend's own dashboard time range applies. The overrides replace the
/// dashboard's configured org and panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub org_id_override: Option<String>,
    pub panel_id_override: Option<String>,
}

impl RenderOptions {
    pub fn since(from: String) -> Self {
        Self {
            from: Some(from),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub dashboard: Dashboard,
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(dashboard: Dashboard, options: RenderOptions) -> Self {
        Self { dashboard, options }
    }

    /// Query parameters in the order they are sent.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        let org_id = self
            .options
            .org_id_override
            .as_deref()
            .unwrap_or(&self.dashboard.org_id);
        let panel_id = self
            .options
            .panel_id_override
            .as_deref()
            .unwrap_or(&self.dashboard.panel_id);

        let mut params = vec![("orgId", org_id), ("panelId", panel_id)];
        let to = match (&self.options.from, &self.options.to) {
            (Some(_), None) => Some(DEFAULT_TO),
            (_, to) => to.as_deref(),
        };
        if let Some(from) = &self.options.from {
            params.push(("from", from.as_str()));
        }
        if let Some(to) = to {
            params.push(("to", to));
        }
        params
    }
}

#[derive(Debug, Clone)]
pub struct RenderResult {
    pub image: Bytes,
    pub source_url: String,
}
