//! Core data types used throughout docqa.
//!
//! These types represent the chunks flowing through the indexing and
//! retrieval pipeline, and the session-scoped chat transcript.

/// A bounded segment of a document's extracted text, the unit of
/// embedding and retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: i64,
    pub text: String,
}

/// A chunk returned by retrieval, ranked by cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub index: i64,
    pub text: String,
    pub score: f32,
}

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One role-tagged message in a chat session.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only log of chat turns for one interactive session.
///
/// Owned by the session loop and passed by reference into rendering code.
/// Never persisted.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
