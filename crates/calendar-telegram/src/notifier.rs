//! Delivery of responses through the Telegram Bot API.

use std::time::Duration;

use async_trait::async_trait;
use calendar_orchestrator::{NotificationSink, TransportError};
use teloxide::prelude::*;
use tracing::{debug, info};

/// Longest text sent as a single message, in UTF-16 code units.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Size of each part when a message has to be split, in UTF-16 code units.
pub const CHUNK_LEN: usize = 4000;

/// Marker appended to every part but the last.
pub const CONTINUED_MARKER: &str = "\n\n[Message continued...]";

/// Pause between the parts of a split message.
const PART_DELAY: Duration = Duration::from_millis(100);

/// Length of `text` as Telegram counts it.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Splits `text` into parts that fit in a Telegram message.
///
/// Text of at most [`MAX_MESSAGE_LEN`] UTF-16 code units is returned whole.
/// Longer text is cut into parts of at most [`CHUNK_LEN`] units, breaking
/// after the last newline of a window when that newline lies in its second
/// half. Cuts fall on char boundaries, so concatenating the parts yields
/// the original text.
pub fn split_message(text: &str) -> Vec<&str> {
    if utf16_len(text) <= MAX_MESSAGE_LEN {
        return vec![text];
    }

    let mut parts = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let window_end = fitting_prefix(rest, CHUNK_LEN);

        let mut end = window_end;
        if window_end < rest.len() {
            let window = &rest[..window_end];
            if let Some(newline) = window.rfind('\n') {
                if utf16_len(&window[..newline]) > CHUNK_LEN / 2 {
                    end = newline + 1;
                }
            }
        }

        parts.push(&rest[..end]);
        rest = &rest[end..];
    }
    parts
}

/// Byte length of the longest prefix of `text` within `units` UTF-16 code units.
fn fitting_prefix(text: &str, units: usize) -> usize {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        used += c.len_utf16();
        if used > units {
            return i;
        }
    }
    text.len()
}

/// Parts of `text` as they are sent, continuation markers included.
pub fn outgoing_parts(text: &str) -> Vec<String> {
    let parts = split_message(text);
    let last = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            if i < last {
                format!("{part}{CONTINUED_MARKER}")
            } else {
                part.to_string()
            }
        })
        .collect()
}

/// [`NotificationSink`] that sends plain-text Telegram messages.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    /// Creates a notifier sending through `bot`.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        let parts = outgoing_parts(text);
        let total = parts.len();
        if total > 1 {
            info!(chat_id, len = text.len(), parts = total, "Splitting long message");
        }

        for (i, part) in parts.into_iter().enumerate() {
            self.bot
                .send_message(ChatId(chat_id), part)
                .await
                .map_err(|e| {
                    TransportError::new(
                        chat_id,
                        format!("failed to send message part {}/{}: {e}", i + 1, total),
                    )
                })?;

            if total > 1 {
                tokio::time::sleep(PART_DELAY).await;
            }
        }

        debug!(chat_id, parts = total, "Message delivered");
        Ok(())
    }
}
