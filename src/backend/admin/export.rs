/**
 * CSV Export
 *
 * Two layouts:
 *
 * - chat export: one row per question/answer pair. Messages are taken two
 *   at a time in timestamp order; a row is written when the first of a pair
 *   is a user message, with the second message's content as the answer
 *   when it is an assistant message.
 * - session export: one row per message with its chat title and sender.
 *
 * Rows end with `\n`; fields are quoted only when they need it.
 */
use std::collections::HashMap;
use std::string::FromUtf8Error;

use csv::{Terminator, Writer, WriterBuilder};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::messaging::db::Message;
use crate::shared::messaging::Role;

pub const CHAT_CSV_HEADER: [&str; 2] = ["User's Question", "Assistant's Response"];

pub const SESSION_CSV_HEADER: [&str; 7] = [
    "Message ID",
    "Role",
    "Content",
    "Chat Title",
    "Sender",
    "Timestamp",
    "Created At",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Question/answer pairs of a chat's messages (ascending timestamp)
pub fn conversation_pairs(messages: &[Message]) -> Vec<(&str, &str)> {
    messages
        .chunks(2)
        .filter(|pair| pair[0].role == Role::User)
        .map(|pair| {
            let answer = match pair.get(1) {
                Some(reply) if reply.role == Role::Assistant => reply.content.as_str(),
                _ => "",
            };
            (pair[0].content.as_str(), answer)
        })
        .collect()
}

/// Chat export as question/answer CSV
pub fn chat_csv(messages: &[Message]) -> Result<String, ExportError> {
    let mut csv = writer();
    csv.write_record(CHAT_CSV_HEADER)?;
    for (question, answer) in conversation_pairs(messages) {
        csv.write_record([question, answer])?;
    }
    finish(csv)
}

/// Session export as one CSV row per message
///
/// `chat_titles` maps chat ids to titles and `senders` user ids to
/// usernames; misses become "Unknown Chat" and "System".
pub fn session_csv(
    messages: &[Message],
    chat_titles: &HashMap<Uuid, String>,
    senders: &HashMap<Uuid, String>,
) -> Result<String, ExportError> {
    let mut csv = writer();
    csv.write_record(SESSION_CSV_HEADER)?;
    for message in messages {
        let title = chat_titles
            .get(&message.chat_id)
            .map_or("Unknown Chat", String::as_str);
        let sender = message
            .sender
            .and_then(|id| senders.get(&id))
            .map_or("System", String::as_str);

        csv.write_record([
            message.id.to_string().as_str(),
            message.role.as_str(),
            message.content.as_str(),
            title,
            sender,
            message.timestamp.to_rfc3339().as_str(),
            message.created_at.to_rfc3339().as_str(),
        ])?;
    }
    finish(csv)
}
