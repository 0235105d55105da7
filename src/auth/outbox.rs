//! Outgoing e-mail and SMS
//!
//! The identity providers never talk to a mail or SMS gateway directly;
//! they hand messages to a [`MessageSender`]. The default sender appends
//! each message as a JSON line to `outbox.log` in the data directory.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FedhaResult;
use crate::storage::file_io::{append_json_line, read_json_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub channel: Channel,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl OutboxMessage {
    pub fn email(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: Channel::Email,
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn sms(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: Channel::Sms,
            to: to.into(),
            subject: String::new(),
            body: body.into(),
            sent_at: Utc::now(),
        }
    }
}

/// Delivers messages on behalf of the identity providers
pub trait MessageSender {
    fn send(&self, message: &OutboxMessage) -> FedhaResult<()>;
}

/// Appends messages to a JSON-lines file
pub struct FileOutbox {
    path: PathBuf,
}

impl FileOutbox {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Every message sent so far, oldest first
    pub fn read_all(&self) -> FedhaResult<Vec<OutboxMessage>> {
        read_json_lines(&self.path)
    }

    /// The most recent message sent to `to`
    pub fn last_to(&self, to: &str) -> FedhaResult<Option<OutboxMessage>> {
        Ok(self.read_all()?.into_iter().rev().find(|m| m.to == to))
    }
}

impl MessageSender for FileOutbox {
    fn send(&self, message: &OutboxMessage) -> FedhaResult<()> {
        append_json_line(&self.path, message)?;
        tracing::info!(
            channel = ?message.channel,
            to = %message.to,
            "message queued in outbox"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_send_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let outbox = FileOutbox::new(temp_dir.path().join("outbox.log"));

        outbox
            .send(&OutboxMessage::email("a@b.co", "Hi", "first"))
            .unwrap();
        outbox.send(&OutboxMessage::sms("+254700000001", "code 1")).unwrap();
        outbox.send(&OutboxMessage::sms("+254700000001", "code 2")).unwrap();

        assert_eq!(outbox.read_all().unwrap().len(), 3);
        let last = outbox.last_to("+254700000001").unwrap().unwrap();
        assert_eq!(last.body, "code 2");
        assert_eq!(last.channel, Channel::Sms);
        assert!(outbox.last_to("nobody").unwrap().is_none());
    }
}
