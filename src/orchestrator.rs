use std::sync::Arc;

use tracing::{info, warn};

use crate::chat::ChatSession;
use crate::client::Backend;
use crate::error::{ClientError, Result};
use crate::history::HistoryStore;
use crate::models::{Language, ProcessRequest, ResultModel};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// One submission of a video reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub reference: String,
    pub language: Language,
    pub manual_transcribe: bool,
    pub status: JobStatus,
}

impl Job {
    fn new(reference: &str, manual_transcribe: bool, language: Language) -> Self {
        Self {
            reference: reference.to_string(),
            language,
            manual_transcribe,
            status: JobStatus::Idle,
        }
    }

    fn request(&self) -> ProcessRequest {
        ProcessRequest {
            youtube_url: self.reference.clone(),
            auto_transcribe: !self.manual_transcribe,
            language: self.language,
        }
    }
}

/// Holds a job in `Loading` and puts it back to `Idle` if the submit future is
/// dropped before it settles.
struct LoadingGuard<'a> {
    status: &'a mut JobStatus,
}

impl<'a> LoadingGuard<'a> {
    fn new(status: &'a mut JobStatus) -> Self {
        *status = JobStatus::Loading;
        Self { status }
    }

    fn settle(self, outcome: JobStatus) {
        *self.status = outcome;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if *self.status == JobStatus::Loading {
            *self.status = JobStatus::Idle;
        }
    }
}

pub struct RequestOrchestrator<B, S> {
    backend: Arc<B>,
    history: HistoryStore<S>,
    job: Option<Job>,
    result: Option<ResultModel>,
}

impl<B: Backend + 'static, S: Storage> RequestOrchestrator<B, S> {
    pub fn new(backend: Arc<B>, history: HistoryStore<S>) -> Self {
        Self {
            backend,
            history,
            job: None,
            result: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.job
            .as_ref()
            .map(|job| job.status)
            .unwrap_or(JobStatus::Idle)
    }

    pub fn is_loading(&self) -> bool {
        self.status() == JobStatus::Loading
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn result(&self) -> Option<&ResultModel> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<S> {
        &mut self.history
    }

    /// Runs one job to completion, replacing the previous job and result.
    ///
    /// Returns `None` without touching any state when `reference` is blank.
    /// Failures never escape: they land in the result as an error message.
    pub async fn submit(
        &mut self,
        reference: &str,
        manual_transcribe: bool,
        language: Language,
    ) -> Option<JobStatus> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }

        self.result = None;
        let job = self.job.insert(Job::new(reference, manual_transcribe, language));
        let request = job.request();
        let guard = LoadingGuard::new(&mut job.status);

        let outcome = match self.backend.process_video(&request).await {
            Ok(segments) => {
                info!(reference, segments = segments.len(), "job succeeded");
                self.result = Some(ResultModel::Segments(segments));
                if let Err(e) = self.history.record(reference) {
                    warn!("could not update history: {}", e);
                }
                JobStatus::Succeeded
            }
            Err(e) => {
                warn!(reference, "job failed: {}", e);
                self.result = Some(ResultModel::Error(e.to_string()));
                JobStatus::Failed
            }
        };

        guard.settle(outcome);
        Some(outcome)
    }

    pub fn can_open_chat(&self) -> bool {
        self.status() == JobStatus::Succeeded
            && matches!(self.result, Some(ResultModel::Segments(_)))
    }

    /// Starts a fresh chat thread over the current segments.
    pub fn open_chat(&self) -> Result<ChatSession<B>> {
        match (&self.result, self.can_open_chat()) {
            (Some(result), true) => ChatSession::open(Arc::clone(&self.backend), result),
            _ => Err(ClientError::InvalidRequest(
                "chat is only available after a successful job".to_string(),
            )),
        }
    }

    pub fn share_text(&self) -> Option<String> {
        self.result.as_ref()?;
        let job = self.job.as_ref()?;
        Some(share_text(&job.reference))
    }
}

pub fn share_text(reference: &str) -> String {
    format!(
        "Check out these YouTube segments I processed with YTAChunker: {}",
        reference
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_inverts_manual_flag() {
        let job = Job::new("https://youtu.be/x", true, Language::Fr);
        let request = job.request();
        assert!(!request.auto_transcribe);
        assert_eq!(request.language, Language::Fr);

        let job = Job::new("https://youtu.be/x", false, Language::En);
        assert!(job.request().auto_transcribe);
    }

    #[test]
    fn test_loading_guard_releases_on_drop() {
        let mut status = JobStatus::Succeeded;
        {
            let _guard = LoadingGuard::new(&mut status);
        }
        assert_eq!(status, JobStatus::Idle);

        let guard = LoadingGuard::new(&mut status);
        guard.settle(JobStatus::Failed);
        assert_eq!(status, JobStatus::Failed);
    }

    #[test]
    fn test_share_text() {
        assert_eq!(
            share_text("https://youtu.be/abc"),
            "Check out these YouTube segments I processed with YTAChunker: https://youtu.be/abc"
        );
    }
}
