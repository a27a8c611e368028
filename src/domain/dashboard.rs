// Dashboard domain model

/// A named render target. `name` is the key users type after the slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub name: String,
    pub dashboard_id: String,
    pub dashboard_slug: String,
    pub org_id: String,
    pub panel_id: String,
}

impl Dashboard {
    pub fn new(
        name: String,
        dashboard_id: String,
        dashboard_slug: String,
        org_id: String,
        panel_id: String,
    ) -> Self {
        Self {
            name,
            dashboard_id,
            dashboard_slug,
            org_id,
            panel_id,
        }
    }
}
