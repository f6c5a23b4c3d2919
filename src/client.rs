use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::models::{
    parse_chat_response, parse_process_response, ChatReply, ChatRequest, ProcessRequest, Segment,
};

/// The remote processing service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Submits a video reference and waits for its segments.
    async fn process_video(&self, request: &ProcessRequest) -> Result<Vec<Segment>>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply>;

    /// Fetches the audio artifact of the 1-based segment `index`.
    async fn download_segment(&self, index: usize) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    service_url: String,
}

impl HttpBackend {
    pub fn new(service_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), service_url)
    }

    pub fn with_client(client: reqwest::Client, service_url: &str) -> Self {
        Self {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    pub fn segment_url(&self, index: usize) -> String {
        segment_url(&self.service_url, index)
    }
}

pub fn segment_url(service_url: &str, index: usize) -> String {
    format!(
        "{}/temp/segments/chunk_{}",
        service_url.trim_end_matches('/'),
        index
    )
}

struct Body {
    bytes: Vec<u8>,
    is_json: bool,
}

async fn success_body(response: reqwest::Response) -> Result<Body> {
    let status = response.status();
    if !status.is_success() {
        debug!(%status, "service returned an error status");
        return Err(ClientError::from_status(status));
    }
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);
    let bytes = response.bytes().await?.to_vec();
    Ok(Body { bytes, is_json })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn process_video(&self, request: &ProcessRequest) -> Result<Vec<Segment>> {
        info!(url = %request.youtube_url, language = %request.language, "submitting video");
        let response = self
            .client
            .post(format!("{}/process-youtube", self.service_url))
            .json(request)
            .send()
            .await?;

        let body = success_body(response).await?;
        let segments = parse_process_response(&body.bytes)?;
        info!(count = segments.len(), "video processed");
        Ok(segments)
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        debug!("sending chat query");
        let response = self
            .client
            .post(format!("{}/chat", self.service_url))
            .json(request)
            .send()
            .await?;

        let body = success_body(response).await?;
        parse_chat_response(&body.bytes)
    }

    async fn download_segment(&self, index: usize) -> Result<Vec<u8>> {
        if index == 0 {
            return Err(ClientError::InvalidRequest(
                "segment numbers start at 1".to_string(),
            ));
        }

        let response = self.client.get(self.segment_url(index)).send().await?;
        let body = success_body(response).await?;

        // The service answers a missing chunk with a 200 JSON error object.
        if body.is_json {
            let value: serde_json::Value = serde_json::from_slice(&body.bytes)?;
            let message = value
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unexpected JSON body");
            return Err(ClientError::Backend(format!(
                "chunk_{}: {}",
                index, message
            )));
        }

        Ok(body.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_url_is_one_based_and_ignores_trailing_slash() {
        assert_eq!(
            segment_url("http://localhost:8000/", 3),
            "http://localhost:8000/temp/segments/chunk_3"
        );
        let backend = HttpBackend::new("http://example.com//");
        assert_eq!(backend.service_url(), "http://example.com");
        assert_eq!(
            backend.segment_url(1),
            "http://example.com/temp/segments/chunk_1"
        );
    }

    #[tokio::test]
    async fn test_download_rejects_index_zero() {
        let backend = HttpBackend::new("http://127.0.0.1:9");
        let err = backend.download_segment(0).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
