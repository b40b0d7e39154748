//! Argument validation against documented server limits
//!
//! Ill-formed identifiers and oversized content are rejected synchronously,
//! before any request is admitted or any frame is enqueued.

use crate::error::DomainError;

/// Maximum length of message content
pub const MAX_MESSAGE_CONTENT: usize = 2000;

/// Maximum length of a channel topic
pub const MAX_CHANNEL_TOPIC: usize = 1024;

/// Maximum length of a member nickname
pub const MAX_NICKNAME: usize = 32;

/// Maximum length of an audit-log reason
pub const MAX_AUDIT_REASON: usize = 512;

/// Validate a raw identifier string.
///
/// Only non-empty ASCII digit strings are accepted.
pub fn validate_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Validate message content: non-empty, at most [`MAX_MESSAGE_CONTENT`] characters.
pub fn validate_message_content(content: &str) -> Result<(), DomainError> {
    if content.is_empty() {
        return Err(DomainError::Empty { field: "content" });
    }
    check_length("content", content, MAX_MESSAGE_CONTENT)
}

/// Validate a channel topic (may be empty).
pub fn validate_channel_topic(topic: &str) -> Result<(), DomainError> {
    check_length("topic", topic, MAX_CHANNEL_TOPIC)
}

/// Validate a member nickname: non-empty, at most [`MAX_NICKNAME`] characters.
pub fn validate_nickname(nickname: &str) -> Result<(), DomainError> {
    if nickname.is_empty() {
        return Err(DomainError::Empty { field: "nickname" });
    }
    check_length("nickname", nickname, MAX_NICKNAME)
}

/// Validate an audit-log reason (may be empty).
pub fn validate_audit_reason(reason: &str) -> Result<(), DomainError> {
    check_length("reason", reason, MAX_AUDIT_REASON)
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::TooLong { field, len, max });
    }
    Ok(())
}
