use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Transcription language hint sent with a job.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProcessRequest {
    pub youtube_url: String,
    pub auto_transcribe: bool,
    pub language: Language,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatRequest {
    pub user_message: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Segment {
    pub audio_path: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Segment {
    /// File name of `audio_path` with directory and extension removed.
    pub fn display_name(&self) -> &str {
        let file = self.audio_path.rsplit('/').next().unwrap_or_default();
        file.split('.').next().unwrap_or_default()
    }

    pub fn contains(&self, start_time: f64, end_time: f64) -> bool {
        self.start_time <= start_time && end_time <= self.end_time
    }
}

/// Snapshot of the last settled job: segments or an error message, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultModel {
    Segments(Vec<Segment>),
    Error(String),
}

impl ResultModel {
    pub fn segments(&self) -> Option<&[Segment]> {
        match self {
            ResultModel::Segments(segments) => Some(segments),
            ResultModel::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultModel::Error(message) => Some(message),
            ResultModel::Segments(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResultModel::Error(_))
    }
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    audio_path: Option<String>,
    start_time: Option<f64>,
    end_time: Option<f64>,
    text: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProcessResponse {
    #[serde(default)]
    segments: Option<Vec<RawSegment>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl RawSegment {
    fn validate(self, index: usize) -> Result<Segment> {
        let missing =
            |field: &str| ClientError::MalformedResponse(format!("segment {} has no {}", index, field));

        let start_time = self.start_time.ok_or_else(|| missing("start_time"))?;
        let end_time = self.end_time.ok_or_else(|| missing("end_time"))?;
        if start_time > end_time {
            return Err(ClientError::MalformedResponse(format!(
                "segment {} starts at {} after it ends at {}",
                index, start_time, end_time
            )));
        }

        Ok(Segment {
            audio_path: self.audio_path.ok_or_else(|| missing("audio_path"))?,
            start_time,
            end_time,
            text: self.text.ok_or_else(|| missing("text"))?,
            summary: non_empty(self.summary),
            source: non_empty(self.source),
        })
    }
}

/// Parses a `/process-youtube` body. An `error` or `detail` field wins over
/// `segments`.
pub fn parse_process_response(body: &[u8]) -> Result<Vec<Segment>> {
    let raw: RawProcessResponse = serde_json::from_slice(body)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    if let Some(error) = raw.error {
        return Err(ClientError::Backend(error));
    }
    if let Some(detail) = raw.detail {
        let message = match detail {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        };
        return Err(ClientError::Backend(message));
    }

    let segments = raw
        .segments
        .ok_or_else(|| ClientError::MalformedResponse("body has neither segments nor error".to_string()))?;

    segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| segment.validate(index))
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
}

pub fn parse_chat_response(body: &[u8]) -> Result<ChatReply> {
    serde_json::from_slice(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Uuid>,
}

impl ChatMessage {
    pub fn user(id: Uuid, content: String) -> Self {
        Self {
            id,
            role: Role::User,
            content,
            start_time: None,
            end_time: None,
            reply_to: None,
        }
    }

    pub fn assistant(reply_to: Uuid, reply: ChatReply) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: reply.response,
            start_time: reply.start_time,
            end_time: reply.end_time,
            reply_to: Some(reply_to),
        }
    }

    /// Both bounds of the backend's attribution, when it supplied both.
    pub fn timestamp(&self) -> Option<(f64, f64)> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}
