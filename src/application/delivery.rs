// Delivery task - Render a panel and post it to the originating channel
use crate::application::chat_uploader::{ChatUploader, FileUpload};
use crate::application::panel_renderer::PanelRenderer;
use crate::domain::render::RenderRequest;
use chrono::Utc;
use std::sync::Arc;

pub struct DeliveryTask {
    renderer: Arc<dyn PanelRenderer>,
    uploader: Arc<dyn ChatUploader>,
    request: RenderRequest,
    channel_id: String,
}

impl DeliveryTask {
    pub fn new(
        renderer: Arc<dyn PanelRenderer>,
        uploader: Arc<dyn ChatUploader>,
        request: RenderRequest,
        channel_id: String,
    ) -> Self {
        Self {
            renderer,
            uploader,
            request,
            channel_id,
        }
    }

    /// Fire and forget. No handle is returned: each accepted command gets at
    /// most one delivery attempt, which can be neither joined nor cancelled.
    pub fn spawn(self) {
        tokio::spawn(self.run());
    }

    pub(crate) async fn run(self) {
        let dashboard = self.request.dashboard.name.clone();

        let rendered = match self.renderer.fetch_solo_panel(&self.request).await {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(%dashboard, channel = %self.channel_id, "render failed: {}", e);
                return;
            }
        };

        tracing::debug!(
            %dashboard,
            bytes = rendered.image.len(),
            url = %rendered.source_url,
            "panel rendered"
        );

        let upload = FileUpload {
            channel_id: self.channel_id.clone(),
            filename: snapshot_filename(),
            initial_comment: rendered.source_url,
            content: rendered.image,
        };

        match self.uploader.upload_file(upload).await {
            Ok(()) => tracing::info!(%dashboard, channel = %self.channel_id, "graph delivered"),
            Err(e) => {
                tracing::error!(%dashboard, channel = %self.channel_id, "upload failed: {}", e)
            }
        }
    }
}

fn snapshot_filename() -> String {
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_millis() * 1_000_000);
    format!("graph_{}.png", nanos)
}
