// Recording fakes for the renderer and uploader ports
use crate::application::chat_uploader::{ChatUploader, FileUpload};
use crate::application::panel_renderer::PanelRenderer;
use crate::domain::dashboard::Dashboard;
use crate::domain::render::{RenderRequest, RenderResult};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

pub fn sample_dashboard() -> Dashboard {
    Dashboard::new(
        "cpu-usage".to_string(),
        "abc123".to_string(),
        "node-exporter".to_string(),
        "1".to_string(),
        "4".to_string(),
    )
}

pub struct RecordingRenderer {
    fail: bool,
    requests: Mutex<Vec<RenderRequest>>,
    called: Notify,
}

impl RecordingRenderer {
    pub const IMAGE: &'static [u8] = b"\x89PNG fake image";
    pub const SOURCE_URL: &'static str = "http://grafana.test/render/d-solo/abc123/node-exporter";

    pub fn succeeding() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
            called: Notify::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding()
        }
    }

    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until at least `count` renders were requested.
    pub async fn wait_for(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.requests.lock().unwrap().len() < count {
                self.called.notified().await;
            }
        })
        .await
        .expect("renderer was not called in time");
    }
}

#[async_trait]
impl PanelRenderer for RecordingRenderer {
    async fn fetch_solo_panel(&self, request: &RenderRequest) -> AppResult<RenderResult> {
        self.requests.lock().unwrap().push(request.clone());
        self.called.notify_one();
        if self.fail {
            return Err(AppError::Render("backend returned 500".to_string()));
        }
        Ok(RenderResult {
            image: Bytes::from_static(Self::IMAGE),
            source_url: Self::SOURCE_URL.to_string(),
        })
    }
}

pub struct RecordingUploader {
    fail: bool,
    uploads: Mutex<Vec<FileUpload>>,
    called: Notify,
}

impl RecordingUploader {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            uploads: Mutex::new(Vec::new()),
            called: Notify::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::succeeding()
        }
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.uploads.lock().unwrap().clone()
    }

    /// Wait until at least `count` uploads were attempted.
    pub async fn wait_for(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.uploads.lock().unwrap().len() < count {
                self.called.notified().await;
            }
        })
        .await
        .expect("uploader was not called in time");
    }
}

#[async_trait]
impl ChatUploader for RecordingUploader {
    async fn upload_file(&self, upload: FileUpload) -> AppResult<()> {
        self.uploads.lock().unwrap().push(upload);
        self.called.notify_one();
        if self.fail {
            return Err(AppError::Upload("channel_not_found".to_string()));
        }
        Ok(())
    }
}
