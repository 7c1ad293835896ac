//! `WhatsApp` TXT export parser.
//!
//! Android exports look like:
//!
//! ```text
//! 26.10.2025, 20:40 - Sender: Message
//! 26.10.2025, 20:41 - Sender: First line
//! continued on a second line
//! 26.10.2025, 20:42 - Someone joined using this group's invite link
//! ```
//!
//! Every timestamp at the start of a line followed by `" - "` opens a new
//! record, so multi-line bodies are kept whole. Records whose timestamp does
//! not parse, status lines without a `sender:` part, and messages that are
//! empty once `<...>` placeholders are removed are skipped.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use super::{ParseReport, ParsedChat};
use crate::Message;
use crate::error::Result;
use crate::parsing::timestamp::{TIMESTAMP_PREFIX, parse_timestamp};

/// Record delimiter: a timestamp at the start of a line, then `" - "`.
static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?m)^[ \t]*({TIMESTAMP_PREFIX}) - ")).unwrap());

/// Media/attachment placeholders such as `<Media omitted>`, never spanning lines.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>\n]+>").unwrap());

/// Parser for WhatsApp TXT exports.
///
/// # Example
///
/// ```rust,no_run
/// use chatscroll::parsers::WhatsAppParser;
///
/// let chat = WhatsAppParser::new().parse("whatsapp_chat.txt".as_ref())?;
/// println!("{} messages from {} users", chat.len(), chat.users.len());
/// # Ok::<(), chatscroll::ChatscrollError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatsAppParser;

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    BadTimestamp,
    SystemMessage,
    EmptyMessage,
}

impl WhatsAppParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Returns the name of the parser.
    pub fn name(&self) -> &'static str {
        "WhatsApp"
    }

    /// Reads and parses an export file.
    ///
    /// # Errors
    ///
    /// Only I/O failures (missing file, invalid UTF-8) are errors; content
    /// problems are skipped record by record.
    pub fn parse(&self, path: &Path) -> Result<ParsedChat> {
        let content = fs::read_to_string(path)?;
        Ok(self.parse_str(&content))
    }

    /// Parses the full text of an export.
    pub fn parse_str(&self, content: &str) -> ParsedChat {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut messages = Vec::new();
        let mut users = BTreeSet::new();
        let mut report = ParseReport::default();

        for (timestamp, block) in records(content) {
            report.records += 1;
            match parse_record(timestamp, block) {
                Ok(msg) => {
                    if !users.contains(msg.user.as_str()) {
                        users.insert(msg.user.clone());
                    }
                    messages.push(msg);
                }
                Err(Skip::BadTimestamp) => {
                    debug!(timestamp, "skipping record with unrecognized timestamp");
                    report.bad_timestamps += 1;
                }
                Err(Skip::SystemMessage) => {
                    trace!(timestamp, "skipping system message");
                    report.system_messages += 1;
                }
                Err(Skip::EmptyMessage) => {
                    trace!(timestamp, "skipping empty message");
                    report.empty_messages += 1;
                }
            }
        }

        debug!(
            messages = messages.len(),
            users = users.len(),
            skipped = report.skipped(),
            "parsed WhatsApp export"
        );

        ParsedChat {
            messages,
            users: users.into_iter().collect(),
            report,
        }
    }
}

/// Splits the export into `(timestamp, block)` pairs. Text before the first
/// recognized timestamp is discarded.
fn records(content: &str) -> Vec<(&str, &str)> {
    let starts: Vec<_> = RECORD_START.captures_iter(content).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let timestamp = caps.get(1).map_or("", |m| m.as_str());
            let end = starts
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(content.len(), |m| m.start());
            Some((timestamp, &content[whole.end()..end]))
        })
        .collect()
}

fn parse_record(timestamp: &str, block: &str) -> std::result::Result<Message, Skip> {
    let time = parse_timestamp(timestamp).map_err(|_| Skip::BadTimestamp)?;

    let (user, text) = block.split_once(':').ok_or(Skip::SystemMessage)?;
    let user = user.trim();
    if user.is_empty() {
        return Err(Skip::SystemMessage);
    }

    let text = text.trim().replace("\r\n", "\n");
    let text = MARKUP.replace_all(&text, "");
    let text = text.trim();
    if text.is_empty() {
        return Err(Skip::EmptyMessage);
    }

    Ok(Message::new(time, user, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn parse(content: &str) -> ParsedChat {
        WhatsAppParser::new().parse_str(content)
    }

    #[test]
    fn test_parser_name() {
        assert_eq!(WhatsAppParser::new().name(), "WhatsApp");
    }

    #[test]
    fn test_basic_messages() {
        let chat = parse(
            "01.07.2025, 10:12 - Alex: Morning!\n\
             01.07.2025, 10:13 - Jamie: Hey Alex",
        );
        assert_eq!(chat.len(), 2);
        assert_eq!(chat.messages[0].user(), "Alex");
        assert_eq!(chat.messages[0].message(), "Morning!");
        assert_eq!(
            chat.messages[0].time(),
            Utc.with_ymd_and_hms(2025, 7, 1, 10, 12, 0).unwrap()
        );
        assert_eq!(chat.messages[1].user(), "Jamie");
    }

    #[test]
    fn test_multiline_message_kept_whole() {
        let chat = parse(
            "01.07.2025, 10:12 - Alex: Shopping list:\n\
             - milk\n\
             - eggs\n\
             01.07.2025, 10:13 - Jamie: ok",
        );
        assert_eq!(chat.len(), 2);
        assert_eq!(chat.messages[0].message(), "Shopping list:\n- milk\n- eggs");
        assert_eq!(chat.messages[1].message(), "ok");
    }

    #[test]
    fn test_system_message_skipped() {
        let chat = parse(
            "01.07.2025, 10:12 - Alex created group \"Trip\"\n\
             01.07.2025, 10:13 - Alex: Welcome",
        );
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.report.system_messages, 1);
    }

    #[test]
    fn test_media_placeholder_removed() {
        let chat = parse(
            "01.07.2025, 10:12 - Alex: <Media omitted>\n\
             01.07.2025, 10:13 - Sam: look <attached: photo.jpg> here",
        );
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.messages[0].message(), "look  here");
        assert_eq!(chat.report.empty_messages, 1);
        assert_eq!(chat.users, vec!["Sam"]);
    }

    #[test]
    fn test_bad_timestamp_skipped() {
        let chat = parse(
            "31.02.2025, 10:12 - Alex: impossible date\n\
             01.07.2025, 10:13 - Alex: fine",
        );
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.report.bad_timestamps, 1);
        assert_eq!(chat.report.records, 2);
    }

    #[test]
    fn test_leading_text_discarded() {
        let chat = parse(
            "Messages and calls are end-to-end encrypted.\n\
             01.07.2025, 10:12 - Alex: hi",
        );
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.report.records, 1);
    }

    #[test]
    fn test_users_sorted_and_deduplicated() {
        let chat = parse(
            "01.07.2025, 10:12 - sam: a\n\
             01.07.2025, 10:13 - Bob: b\n\
             01.07.2025, 10:14 - Alex: c\n\
             01.07.2025, 10:15 - Bob: d",
        );
        assert_eq!(chat.users, vec!["Alex", "Bob", "sam"]);
    }

    #[test]
    fn test_split_on_first_colon_only() {
        let chat = parse("01.07.2025, 10:12 - Alex: meet at 10:30: ok?");
        assert_eq!(chat.messages[0].message(), "meet at 10:30: ok?");
    }

    #[test]
    fn test_mixed_formats() {
        let chat = parse(
            "01.07.2025, 10:12 - Alex: dot\n\
             01/07/2025, 10:13 - Alex: slash\n\
             01/07/25, 10:14 - Alex: short",
        );
        assert_eq!(chat.len(), 3);
        assert!(
            chat.messages
                .iter()
                .all(|m| m.time().date_naive().to_string() == "2025-07-01")
        );
    }

    #[test]
    fn test_crlf_and_bom() {
        let chat = parse("\u{feff}01.07.2025, 10:12 - Alex: one\r\ntwo\r\n01.07.2025, 10:13 - Sam: three\r\n");
        assert_eq!(chat.len(), 2);
        assert_eq!(chat.messages[0].message(), "one\ntwo");
        assert_eq!(chat.messages[1].message(), "three");
    }

    #[test]
    fn test_empty_input() {
        let chat = parse("");
        assert!(chat.is_empty());
        assert!(chat.users.is_empty());

        let chat = parse("nothing here\nat all");
        assert!(chat.is_empty());
        assert_eq!(chat.report.records, 0);
    }

    #[test]
    fn test_timestamp_mid_line_is_not_a_delimiter() {
        let chat = parse("01.07.2025, 10:12 - Alex: quoting 01.07.2025, 10:00 - Sam: earlier");
        assert_eq!(chat.len(), 1);
        assert_eq!(
            chat.messages[0].message(),
            "quoting 01.07.2025, 10:00 - Sam: earlier"
        );
    }

    #[test]
    fn test_markup_does_not_span_lines() {
        let chat = parse("01.07.2025, 10:12 - Alex: if a < b\nand c > d\n<Media omitted> later");
        assert_eq!(chat.messages[0].message(), "if a < b\nand c > d\n later");
    }
}
