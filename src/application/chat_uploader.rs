// Port for posting files into a chat channel
use crate::error::AppResult;
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub channel_id: String,
    pub filename: String,
    pub initial_comment: String,
    pub content: Bytes,
}

#[async_trait]
pub trait ChatUploader: Send + Sync {
    async fn upload_file(&self, upload: FileUpload) -> AppResult<()>;
}
