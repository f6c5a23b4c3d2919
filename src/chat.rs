use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::Backend;
use crate::error::{ClientError, Result};
use crate::models::{ChatMessage, ChatReply, ChatRequest, ResultModel, Segment};

/// Assistant text appended when a query fails.
pub const FALLBACK_REPLY: &str = "Error fetching response.";

/// A user query that has been appended to the thread and awaits its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingQuery {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug)]
pub enum QueryOutcome {
    Reply(ChatReply),
    Failed(ClientError),
    Cancelled,
}

/// Conversation over the segments of one completed job.
///
/// The thread only grows. Replies are appended in the order they arrive and
/// carry the id of the query they answer. Dropping the session aborts every
/// query still in flight.
pub struct ChatSession<B> {
    backend: Arc<B>,
    segments: Vec<Segment>,
    messages: Vec<ChatMessage>,
    input: String,
    in_flight: HashSet<Uuid>,
    abort: CancellationToken,
}

impl<B: Backend + 'static> ChatSession<B> {
    pub fn open(backend: Arc<B>, result: &ResultModel) -> Result<Self> {
        let segments = result.segments().ok_or_else(|| {
            ClientError::InvalidRequest("chat needs a result with segments".to_string())
        })?;

        Ok(Self {
            backend,
            segments: segments.to_vec(),
            messages: Vec::new(),
            input: String::new(),
            in_flight: HashSet::new(),
            abort: CancellationToken::new(),
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_sending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Appends the current input as a user message and registers it as in
    /// flight. Blank input is ignored; anything else is sent as typed.
    pub fn dispatch(&mut self) -> Option<PendingQuery> {
        if self.input.trim().is_empty() {
            return None;
        }

        let pending = PendingQuery {
            id: Uuid::new_v4(),
            text: self.input.clone(),
        };
        self.messages
            .push(ChatMessage::user(pending.id, pending.text.clone()));
        self.in_flight.insert(pending.id);
        debug!(id = %pending.id, "chat query dispatched");
        Some(pending)
    }

    /// The network half of a query. Resolves to `Cancelled` once the session
    /// is closed.
    pub fn query(
        &self,
        pending: &PendingQuery,
    ) -> impl Future<Output = QueryOutcome> + Send + 'static {
        let backend = Arc::clone(&self.backend);
        let token = self.abort.child_token();
        let request = ChatRequest {
            user_message: pending.text.clone(),
        };

        async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => QueryOutcome::Cancelled,
                reply = backend.chat(&request) => match reply {
                    Ok(reply) => QueryOutcome::Reply(reply),
                    Err(e) => QueryOutcome::Failed(e),
                },
            }
        }
    }

    /// Settles the query `id`, appending at most one assistant message.
    pub fn resolve(&mut self, id: Uuid, outcome: QueryOutcome) {
        if !self.in_flight.remove(&id) {
            warn!(%id, "dropping reply for unknown chat query");
            return;
        }

        match outcome {
            QueryOutcome::Reply(reply) => {
                self.messages.push(ChatMessage::assistant(id, reply));
            }
            QueryOutcome::Failed(e) => {
                warn!(%id, "chat query failed: {}", e);
                self.messages.push(ChatMessage::assistant(
                    id,
                    ChatReply {
                        response: FALLBACK_REPLY.to_string(),
                        start_time: None,
                        end_time: None,
                    },
                ));
            }
            QueryOutcome::Cancelled => debug!(%id, "chat query cancelled"),
        }

        self.input.clear();
    }

    /// Sends `text` and waits for its reply. Returns the appended assistant
    /// message, if any.
    pub async fn send(&mut self, text: &str) -> Option<&ChatMessage> {
        self.set_input(text);
        let pending = self.dispatch()?;
        let outcome = self.query(&pending).await;
        self.resolve(pending.id, outcome);
        self.messages
            .iter()
            .rev()
            .find(|message| message.reply_to == Some(pending.id))
    }

    /// Token cancelled when the session closes.
    pub fn abort_handle(&self) -> CancellationToken {
        self.abort.clone()
    }

    pub fn close(&self) {
        self.abort.cancel();
    }

    /// Row (0-based) and segment whose interval holds the message's attribution.
    pub fn attributed_segment(&self, message: &ChatMessage) -> Option<(usize, &Segment)> {
        let (start, end) = message.timestamp()?;
        self.segments
            .iter()
            .enumerate()
            .find(|(_, segment)| segment.contains(start, end))
    }
}

impl<B> Drop for ChatSession<B> {
    fn drop(&mut self) {
        self.abort.cancel();
    }
}
