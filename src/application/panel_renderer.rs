// Port for the dashboard rendering backend
use crate::domain::render::{RenderRequest, RenderResult};
use crate::error::AppResult;
use async_trait::async_trait;

#[async_trait]
pub trait PanelRenderer: Send + Sync {
    /// Render one dashboard panel to PNG bytes. Single attempt, no retry.
    async fn fetch_solo_panel(&self, request: &RenderRequest) -> AppResult<RenderResult>;
}
