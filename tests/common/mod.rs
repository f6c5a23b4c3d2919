#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use ytachunker_client::{
    Backend, ChatReply, ChatRequest, ClientError, ProcessRequest, Result, Segment,
};

/// Backend that replays scripted outcomes and records what it was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    pub jobs: Mutex<VecDeque<Result<Vec<Segment>>>>,
    pub replies: Mutex<VecDeque<Result<ChatReply>>>,
    pub process_requests: Mutex<Vec<ProcessRequest>>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedBackend {
    pub fn with_job(self, outcome: Result<Vec<Segment>>) -> Self {
        self.jobs.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_reply(self, outcome: Result<ChatReply>) -> Self {
        self.replies.lock().unwrap().push_back(outcome);
        self
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn process_video(&self, request: &ProcessRequest) -> Result<Vec<Segment>> {
        self.process_requests.lock().unwrap().push(request.clone());
        self.jobs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Backend("no scripted job".to_string())))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Backend("no scripted reply".to_string())))
    }

    async fn download_segment(&self, index: usize) -> Result<Vec<u8>> {
        Ok(vec![index as u8])
    }
}

pub fn segment(audio_path: &str, start_time: f64, end_time: f64, text: &str) -> Segment {
    Segment {
        audio_path: audio_path.to_string(),
        start_time,
        end_time,
        text: text.to_string(),
        summary: None,
        source: None,
    }
}

pub fn reply(response: &str, start_time: Option<f64>, end_time: Option<f64>) -> ChatReply {
    ChatReply {
        response: response.to_string(),
        start_time,
        end_time,
    }
}

pub fn server_error() -> ClientError {
    ClientError::Status {
        status: 500,
        reason: "Internal Server Error".to_string(),
    }
}
