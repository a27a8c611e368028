// Slack Web API client - File uploads into channels
use crate::application::chat_uploader::{ChatUploader, FileUpload};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

#[derive(Debug, Clone)]
pub struct SlackClient {
    api_base: String,
    token: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadUrlResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    upload_url: Option<String>,
    #[serde(default)]
    file_id: Option<String>,
}

impl SlackClient {
    pub fn new(api_base: String, token: SecretString) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, method: &str) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upload(format!("{} returned {}: {}", method, status, body)));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upload(format!("{} returned an unreadable body: {}", method, e)))
    }

    async fn request_upload_url(&self, filename: &str, length: usize) -> AppResult<(String, String)> {
        let method = "files.getUploadURLExternal";
        let length = length.to_string();
        let response = self
            .client
            .post(self.method_url(method))
            .bearer_auth(self.token.expose_secret())
            .form(&[("filename", filename), ("length", length.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("{} failed: {}", method, e)))?;

        let data: UploadUrlResponse = Self::read_json(response, method).await?;
        if !data.ok {
            return Err(AppError::Upload(format!(
                "{}: {}",
                method,
                data.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        match (data.upload_url, data.file_id) {
            (Some(url), Some(id)) => Ok((url, id)),
            _ => Err(AppError::Upload(format!("{} response missing upload_url or file_id", method))),
        }
    }

    async fn send_content(&self, upload_url: &str, upload: &FileUpload) -> AppResult<()> {
        let response = self
            .client
            .post(upload_url)
            .bearer_auth(self.token.expose_secret())
            .header("content-type", "application/octet-stream")
            .body(upload.content.clone())
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("sending file content failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(format!(
                "file content upload returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn complete_upload(&self, file_id: &str, upload: &FileUpload) -> AppResult<()> {
        let method = "files.completeUploadExternal";
        let payload = json!({
            "files": [{ "id": file_id, "title": upload.filename }],
            "channel_id": upload.channel_id,
            "initial_comment": upload.initial_comment,
        });

        let response = self
            .client
            .post(self.method_url(method))
            .bearer_auth(self.token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("{} failed: {}", method, e)))?;

        let data: ApiResponse = Self::read_json(response, method).await?;
        if !data.ok {
            return Err(AppError::Upload(format!(
                "{}: {}",
                method,
                data.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatUploader for SlackClient {
    /// Three-step external upload: reserve a URL, send the bytes, then share
    /// the file into the channel with the comment attached.
    async fn upload_file(&self, upload: FileUpload) -> AppResult<()> {
        let (upload_url, file_id) = self
            .request_upload_url(&upload.filename, upload.content.len())
            .await?;
        self.send_content(&upload_url, &upload).await?;
        self.complete_upload(&file_id, &upload).await?;

        tracing::debug!(file_id = %file_id, channel = %upload.channel_id, "file shared");
        Ok(())
    }
}
