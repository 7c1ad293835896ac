//! Edge case tests for chatscroll
//!
//! These tests cover various edge cases and boundary conditions
//! that might not be covered by regular unit and integration tests.

use chatscroll::Message;
use chatscroll::core::filter::FilterConfig;
use chatscroll::core::splitter::ChatSplitter;
use chatscroll::core::stats::{ChatStats, Stopwords};
use chatscroll::core::{apply_filters, search_messages};
use chatscroll::parsers::WhatsAppParser;
use chatscroll::parsing::parse_timestamp;
use chatscroll::retrieval::Retriever;
use chrono::{Duration, TimeZone, Utc};

fn parse(content: &str) -> chatscroll::parsers::ParsedChat {
    WhatsAppParser::new().parse_str(content)
}

// =========================================================================
// Export text quirks
// =========================================================================

#[test]
fn test_empty_input() {
    let chat = parse("");
    assert!(chat.is_empty());
    assert!(chat.users.is_empty());
    assert_eq!(chat.report.records, 0);
}

#[test]
fn test_byte_order_mark_and_crlf() {
    let chat = parse("\u{feff}01.07.2025, 10:12 - Alex: Morning!\r\n01.07.2025, 10:13 - Sam: Hi\r\n");
    assert_eq!(chat.len(), 2);
    assert_eq!(chat.messages[0].user, "Alex");
    assert_eq!(chat.messages[0].message, "Morning!");
    assert_eq!(chat.messages[1].message, "Hi");
}

#[test]
fn test_text_before_first_record_is_dropped() {
    let chat = parse("garbage header\nmore garbage\n01.07.2025, 10:12 - Alex: Morning!");
    assert_eq!(chat.len(), 1);
    assert_eq!(chat.report.records, 1);
}

#[test]
fn test_timestamp_inside_body_is_not_a_delimiter() {
    let chat = parse("01.07.2025, 10:12 - Alex: last time we said 02.07.2025, 11:00 - Sam: ok");
    assert_eq!(chat.len(), 1);
    assert_eq!(chat.messages[0].message, "last time we said 02.07.2025, 11:00 - Sam: ok");
}

#[test]
fn test_colons_in_body_kept() {
    let chat = parse("01.07.2025, 10:12 - Alex: meet at 18:30: bring snacks");
    assert_eq!(chat.messages[0].user, "Alex");
    assert_eq!(chat.messages[0].message, "meet at 18:30: bring snacks");
}

#[test]
fn test_invalid_calendar_date_skipped() {
    let chat = parse(
        "32.13.2025, 10:12 - Alex: impossible date\n\
         01.07.2025, 10:13 - Sam: fine",
    );
    assert_eq!(chat.len(), 1);
    assert_eq!(chat.report.bad_timestamps, 1);
    assert_eq!(chat.messages[0].user, "Sam");
}

#[test]
fn test_status_lines_and_media_skipped() {
    let chat = parse(
        "01.07.2025, 10:12 - Messages and calls are end-to-end encrypted.\n\
         01.07.2025, 10:13 - Alex created group \"Trip\"\n\
         01.07.2025, 10:14 - Alex: <Media omitted>\n\
         01.07.2025, 10:15 - Sam: photo <Media omitted>",
    );
    assert_eq!(chat.len(), 1);
    assert_eq!(chat.messages[0].message, "photo");
    assert_eq!(chat.report.system_messages, 2);
    assert_eq!(chat.report.empty_messages, 1);
}

#[test]
fn test_all_supported_timestamp_formats() {
    let expected = Utc.with_ymd_and_hms(2025, 10, 26, 20, 40, 0).unwrap();
    for input in ["26.10.2025, 20:40", "26/10/2025, 20:40", "26/10/25, 20:40"] {
        assert_eq!(parse_timestamp(input).unwrap(), expected, "{input}");
    }
    assert!(parse_timestamp("10/26/2025, 8:40 PM").unwrap_err().is_format());
    assert!(parse_timestamp("").is_err());
}

#[test]
fn test_single_digit_day_and_hour() {
    let chat = parse("1.7.2025, 9:05 - Alex: early");
    assert_eq!(chat.messages[0].time, Utc.with_ymd_and_hms(2025, 7, 1, 9, 5, 0).unwrap());
}

#[test]
fn test_unicode_users_sorted() {
    let chat = parse(
        "01.07.2025, 10:12 - Иван: Привет мир!\n\
         01.07.2025, 10:13 - 田中太郎: こんにちは\n\
         01.07.2025, 10:14 - +44 7700 900123: who is this?\n\
         01.07.2025, 10:15 - Иван: 👋",
    );
    assert_eq!(chat.len(), 4);
    assert_eq!(chat.users, vec!["+44 7700 900123", "Иван", "田中太郎"]);
}

// =========================================================================
// Splitter boundaries
// =========================================================================

fn messages(count: usize) -> Vec<Message> {
    let base = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();
    (0..count)
        .map(|i| Message::new(base + Duration::minutes(i as i64), "Alex", format!("message {i}")))
        .collect()
}

#[test]
fn test_fewer_messages_than_chunk_size() {
    let splitter = ChatSplitter::new(10, 5, 300).unwrap();
    let chunks = splitter.split_messages(&messages(3));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text.lines().count(), 3);
}

#[test]
fn test_no_messages_no_chunks() {
    let splitter = ChatSplitter::default();
    assert!(splitter.split_messages(&[]).is_empty());
    assert_eq!(splitter.chunk_count(0), 0);
}

#[test]
fn test_invalid_splitter_settings() {
    assert!(ChatSplitter::new(0, 0, 300).unwrap_err().is_config());
    assert!(ChatSplitter::new(5, 5, 300).unwrap_err().is_config());
    assert!(ChatSplitter::new(5, 7, 300).unwrap_err().is_config());
}

#[test]
fn test_truncation_counts_characters() {
    let splitter = ChatSplitter::new(1, 0, 3).unwrap();
    assert_eq!(splitter.truncate_message("héllo"), "hél...");
    assert_eq!(splitter.truncate_message("日本語"), "日本語");
    assert_eq!(splitter.truncate_message("🎉🎉🎉🎉"), "🎉🎉🎉...");
}

#[test]
fn test_last_window_reaches_the_end() {
    let splitter = ChatSplitter::new(4, 2, 300).unwrap();
    let msgs = messages(9);
    let chunks = splitter.split_messages(&msgs);
    assert_eq!(chunks.len(), splitter.chunk_count(9));
    assert!(chunks.last().unwrap().text.ends_with("message 8"));
}

// =========================================================================
// Filters, search and statistics
// =========================================================================

#[test]
fn test_invalid_filter_dates() {
    assert!(FilterConfig::new().after_date("2025-13-01").unwrap_err().is_invalid_date());
    assert!(FilterConfig::new().before_date("01.07.2025").unwrap_err().is_invalid_date());
}

#[test]
fn test_filter_on_empty_list() {
    let config = FilterConfig::new().with_user("Alex");
    assert!(apply_filters(Vec::new(), &config).is_empty());
}

#[test]
fn test_invalid_regex_is_error() {
    assert!(search_messages(&messages(3), "(unclosed").is_err());
}

#[test]
fn test_stats_on_empty_chat() {
    let stats = ChatStats::new(&[]);
    assert!(stats.is_empty());
    assert!(stats.overview().is_none());
    assert!(stats.user_stats().is_empty());
    assert!(stats.word_frequencies(&Stopwords::None).is_empty());
    assert_eq!(stats.messages_by_hour(), [0; 24]);
}

// =========================================================================
// Retrieval boundaries
// =========================================================================

#[test]
fn test_retrieve_from_empty_chat() {
    let mut retriever = Retriever::lexical(&[], &ChatSplitter::default()).unwrap();
    assert!(retriever.is_empty());
    assert!(retriever.retrieve("anything", 3).unwrap().is_empty());
    assert_eq!(retriever.retrieve_context("anything", 3).unwrap(), "");
}

#[test]
fn test_k_larger_than_corpus() {
    let splitter = ChatSplitter::new(1, 0, 300).unwrap();
    let mut retriever = Retriever::lexical(&messages(2), &splitter).unwrap();
    assert_eq!(retriever.retrieve("message", 10).unwrap().len(), 2);
}

#[test]
fn test_query_without_terms_still_returns_k() {
    let splitter = ChatSplitter::new(1, 0, 300).unwrap();
    let mut retriever = Retriever::lexical(&messages(5), &splitter).unwrap();
    let chunks = retriever.retrieve("?!", 3).unwrap();
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].ends_with("message 0"));
}
