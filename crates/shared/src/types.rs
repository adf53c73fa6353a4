//! Common types used across Campusline clients

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Chat thread ID wrapper (server-issued)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub Uuid);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ThreadId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Class division ID wrapper (server-issued)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassDivisionId(pub Uuid);

impl ClassDivisionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClassDivisionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ClassDivisionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ClassDivisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Opaque bearer token issued by the authentication layer.
///
/// The token is owned by the surrounding application; no refresh or
/// rotation logic lives in this workspace. Debug output is redacted so the
/// token never leaks into logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

/// Number of leading characters exposed for cache keying and diagnostics
const TOKEN_PREFIX_LEN: usize = 8;

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Full token value, for request authentication only
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters of the token, safe to use as a cache key
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(TOKEN_PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken({}…)", self.prefix())
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Role of the authenticated user, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Teacher,
    Admin,
    Principal,
}

impl UserRole {
    /// Roles with elevated visibility see every chat thread in the school,
    /// not just their own, and are eligible for background thread polling.
    pub fn can_view_all_threads(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Principal)
    }
}

/// Chat thread category filter accepted by the thread-list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    All,
    Personal,
    Group,
}

impl ChatType {
    /// Wire value used in query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::All => "all",
            ChatType::Personal => "personal",
            ChatType::Group => "group",
        }
    }
}

/// Message payload kind; only text messages exist today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
}

// =============================================================================
// Chat Entities
// =============================================================================

/// Sender descriptor attached to every chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub name: String,
    pub role: UserRole,
}

/// A single chat message as carried over the socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub content: String,
    pub message_type: MessageType,
    pub sender: SenderInfo,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Condensed view of the newest message in a thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub content: String,
    pub sender_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A chat thread as returned by the thread-list endpoint.
///
/// Threads are fetched, not owned: their lifecycle is entirely
/// server-side and clients only cache the most recent page in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: ThreadId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageSummary>,
}

/// A class division (e.g. "Grade 5 B") used to scope thread filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDivision {
    pub id: ClassDivisionId,
    pub name: String,
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination metadata returned alongside every thread page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_debug_redacts() {
        let token = SessionToken::new("secret-bearer-value");
        let debug = format!("{:?}", token);
        assert!(debug.contains("secret-b"));
        assert!(!debug.contains("bearer-value"));
    }

    #[test]
    fn test_session_token_prefix_short_token() {
        let token = SessionToken::new("abc");
        assert_eq!(token.prefix(), "abc");
    }

    #[test]
    fn test_role_visibility_gate() {
        assert!(UserRole::Admin.can_view_all_threads());
        assert!(UserRole::Principal.can_view_all_threads());
        assert!(!UserRole::Teacher.can_view_all_threads());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&UserRole::Principal).unwrap();
        assert_eq!(json, r#""principal""#);
        let role: UserRole = serde_json::from_str(r#""teacher""#).unwrap();
        assert_eq!(role, UserRole::Teacher);
    }

    #[test]
    fn test_thread_deserialization() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "Grade 5 Parents",
            "last_message": {
                "content": "Homework is posted",
                "sender_name": "Ms. Patel",
                "created_at": "2025-09-01T10:15:00Z"
            }
        }"#;
        let thread: ChatThread = serde_json::from_str(json).unwrap();
        assert_eq!(thread.title, "Grade 5 Parents");
        let last = thread.last_message.unwrap();
        assert_eq!(last.sender_name, "Ms. Patel");
    }

    #[test]
    fn test_pagination_total_optional() {
        let page: Pagination = serde_json::from_str(
            r#"{"page": 1, "limit": 20, "has_next": true}"#,
        )
        .unwrap();
        assert!(page.has_next);
        assert_eq!(page.total, None);
    }
}
