//! Chat transcript with request correlation.
//!
//! Every question gets a [`RequestId`] and a pending placeholder. A reply
//! (or failure) replaces only the placeholder carrying its own id, so
//! replies arriving out of order land next to the question that caused them.

use std::collections::VecDeque;
use std::fmt;

use super::TutorError;

/// Entries kept on screen. Older resolved entries are dropped first;
/// pending placeholders always stay until their reply arrives.
pub const TRANSCRIPT_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Tutor,
    System,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub sender: Sender,
    pub text: String,
    pub request_id: Option<RequestId>,
    /// Placeholder awaiting a reply.
    pub pending: bool,
}

/// One side of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub sender: Sender,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    next_id: u64,
    transcript: Vec<ChatEntry>,
    history: VecDeque<Turn>,
    history_limit: usize,
}

impl ChatSession {
    pub fn new(history_limit: usize) -> Self {
        Self {
            next_id: 1,
            transcript: Vec::new(),
            history: VecDeque::new(),
            history_limit,
        }
    }

    /// Record a question and its pending placeholder.
    pub fn begin(&mut self, question: &str) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        self.transcript.push(ChatEntry {
            sender: Sender::User,
            text: question.to_string(),
            request_id: Some(id),
            pending: false,
        });
        self.transcript.push(ChatEntry {
            sender: Sender::Tutor,
            text: String::new(),
            request_id: Some(id),
            pending: true,
        });
        self.trim_transcript();
        id
    }

    /// Resolve the placeholder for `id`.
    ///
    /// Returns the resolved entry, or `None` if no placeholder with that id
    /// is pending. History only grows on success.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<String, TutorError>,
        now_millis: i64,
    ) -> Option<ChatEntry> {
        let Some(slot) = self
            .transcript
            .iter()
            .position(|e| e.pending && e.request_id == Some(id))
        else {
            tracing::debug!("No pending chat request {}", id);
            return None;
        };

        let entry = match result {
            Ok(reply) => {
                if let Some(question) = self.question_for(id) {
                    self.push_history(Sender::User, question, now_millis);
                }
                self.push_history(Sender::Tutor, reply.clone(), now_millis);
                ChatEntry {
                    sender: Sender::Tutor,
                    text: reply,
                    request_id: Some(id),
                    pending: false,
                }
            }
            Err(e) => ChatEntry {
                sender: Sender::System,
                text: format!("ERROR: {}", e),
                request_id: Some(id),
                pending: false,
            },
        };

        self.transcript[slot] = entry.clone();
        Some(entry)
    }

    /// Append a system message outside any request.
    pub fn system_message(&mut self, text: &str) -> ChatEntry {
        let entry = ChatEntry {
            sender: Sender::System,
            text: text.to_string(),
            request_id: None,
            pending: false,
        };
        self.transcript.push(entry.clone());
        self.trim_transcript();
        entry
    }

    fn trim_transcript(&mut self) {
        while self.transcript.len() > TRANSCRIPT_LIMIT {
            match self.transcript.iter().position(|e| !e.pending) {
                Some(oldest) => {
                    self.transcript.remove(oldest);
                }
                None => break,
            }
        }
    }

    fn question_for(&self, id: RequestId) -> Option<String> {
        self.transcript
            .iter()
            .find(|e| e.sender == Sender::User && e.request_id == Some(id))
            .map(|e| e.text.clone())
    }

    fn push_history(&mut self, sender: Sender, content: String, timestamp: i64) {
        self.history.push_back(Turn {
            sender,
            content,
            timestamp,
        });
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }

    /// Forget past exchanges; the exercise context changed.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    pub fn history(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.transcript.iter().filter(|e| e.pending).count()
    }
}
