//! Socket frame types and serialization
//!
//! One tagged union covers both directions: clients send
//! `subscribe_thread` and `send_message`, the backend pushes
//! `message_received` and `thread_updated`. Frames travel as UTF-8 JSON
//! text; there is no schema validation beyond parse success.

use serde::{Deserialize, Serialize};

use campusline_shared::{ChatMessage, MessageSummary, MessageType, ThreadId};

/// One discrete JSON message unit exchanged over the chat socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SocketFrame {
    /// Subscribe to updates for a thread
    SubscribeThread { thread_id: ThreadId },

    /// Send a message into a thread
    SendMessage {
        thread_id: ThreadId,
        content: String,
        message_type: MessageType,
    },

    /// A message arrived in a subscribed thread
    MessageReceived {
        thread_id: ThreadId,
        message: ChatMessage,
    },

    /// A thread's summary changed (title, latest message)
    ThreadUpdated {
        thread_id: ThreadId,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_message: Option<MessageSummary>,
    },
}

impl SocketFrame {
    /// Build the outbound send-message frame; `message_type` is always text
    pub fn send_text(thread_id: ThreadId, content: impl Into<String>) -> Self {
        SocketFrame::SendMessage {
            thread_id,
            content: content.into(),
            message_type: MessageType::Text,
        }
    }
}
