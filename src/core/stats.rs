//! Descriptive statistics over a parsed chat.
//!
//! [`ChatStats`] borrows the message list and precomputes per-message word
//! and character counts once; every other figure is derived on demand.
//!
//! # Example
//!
//! ```
//! use chatscroll::core::stats::{ChatStats, Stopwords};
//! use chatscroll::Message;
//! use chrono::{TimeZone, Utc};
//!
//! let messages = vec![
//!     Message::new(Utc.with_ymd_and_hms(2025, 7, 1, 10, 12, 0).unwrap(), "Alex", "pizza tonight?"),
//!     Message::new(Utc.with_ymd_and_hms(2025, 7, 1, 10, 13, 0).unwrap(), "Sam", "pizza 🍕🍕"),
//! ];
//!
//! let stats = ChatStats::new(&messages);
//! let overview = stats.overview().unwrap();
//! assert_eq!(overview.total_messages, 2);
//! assert_eq!(overview.users, 2);
//!
//! let words = stats.word_frequencies(&Stopwords::English);
//! assert_eq!(words[0], ("pizza".to_string(), 2));
//! assert_eq!(stats.emoji_frequencies()[0], ("🍕".to_string(), 2));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use regex::Regex;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::Message;

/// Lowercased runs of two or more word characters.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

static SPLIT_STOPWORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

/// Common English function words.
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "don", "down", "during", "each",
    "else", "even", "ever", "every", "few", "for", "from", "further", "get", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "if", "in", "into", "is", "it", "its", "itself", "just", "least", "less", "ll", "may", "me",
    "might", "more", "most", "much", "must", "my", "myself", "neither", "never", "no", "nor",
    "not", "now", "of", "off", "often", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "per", "rather", "re", "same", "she", "should", "since",
    "so", "some", "still", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "though", "through", "thus", "to", "too",
    "under", "until", "up", "upon", "us", "ve", "very", "was", "we", "well", "were", "what",
    "when", "where", "whether", "which", "while", "who", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Words to drop before counting frequencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Stopwords {
    /// Count every token.
    None,
    /// Built-in English list.
    #[default]
    English,
    /// Caller-supplied list, already lowercased.
    Custom(HashSet<String>),
}

impl Stopwords {
    /// Builds a custom list from a comma and/or whitespace separated string.
    ///
    /// ```
    /// use chatscroll::core::stats::Stopwords;
    ///
    /// let stopwords = Stopwords::parse_custom("Pizza, sushi  tacos");
    /// assert!(stopwords.contains("pizza"));
    /// assert!(stopwords.contains("tacos"));
    /// ```
    pub fn parse_custom(input: &str) -> Self {
        Stopwords::Custom(
            SPLIT_STOPWORDS
                .split(input)
                .filter(|word| !word.is_empty())
                .map(str::to_lowercase)
                .collect(),
        )
    }

    /// Returns `true` if `word` (lowercase) should be dropped.
    pub fn contains(&self, word: &str) -> bool {
        match self {
            Stopwords::None => false,
            Stopwords::English => ENGLISH_STOPWORDS.contains(&word),
            Stopwords::Custom(words) => words.contains(word),
        }
    }
}

/// Whole-chat summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_messages: usize,
    pub users: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    /// Calendar days from first to last message, both inclusive.
    pub span_days: i64,
    pub messages_per_day: f64,
    pub active_days: usize,
    /// Share of days in the span with at least one message.
    pub active_day_pct: f64,
    pub most_active_day: NaiveDate,
    pub most_active_day_count: usize,
}

/// Per-user averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user: String,
    pub messages: usize,
    pub avg_words: f64,
    pub avg_chars: f64,
}

/// Detailed figures for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOverview {
    pub user: String,
    pub messages: usize,
    /// Share of all chat messages sent by this user.
    pub participation_pct: f64,
    pub active_days: usize,
    pub last_message_date: NaiveDate,
    pub top_word: Option<(String, usize)>,
    pub top_emoji: Option<(String, usize)>,
}

/// Statistics over a borrowed message list.
#[derive(Debug, Clone)]
pub struct ChatStats<'a> {
    messages: &'a [Message],
    words: Vec<usize>,
    chars: Vec<usize>,
}

impl<'a> ChatStats<'a> {
    /// Precomputes word and character counts for `messages`.
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            words: messages.iter().map(Message::word_count).collect(),
            chars: messages.iter().map(Message::char_count).collect(),
        }
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whole-chat summary, or `None` for an empty chat.
    pub fn overview(&self) -> Option<Overview> {
        let by_date = self.messages_by_date();
        let (first_date, _) = *by_date.first()?;
        let (last_date, _) = *by_date.last()?;

        // earliest date wins a tie
        let (most_active_day, most_active_day_count) =
            by_date
                .iter()
                .fold((first_date, 0), |best, &(date, count)| {
                    if count > best.1 { (date, count) } else { best }
                });

        let span_days = (last_date - first_date).num_days() + 1;
        let users: BTreeSet<&str> = self.messages.iter().map(|m| m.user.as_str()).collect();

        Some(Overview {
            total_messages: self.messages.len(),
            users: users.len(),
            first_date,
            last_date,
            span_days,
            messages_per_day: self.messages.len() as f64 / span_days as f64,
            active_days: by_date.len(),
            active_day_pct: by_date.len() as f64 / span_days as f64 * 100.0,
            most_active_day,
            most_active_day_count,
        })
    }

    /// Per-user message counts and averages, sorted by user.
    pub fn user_stats(&self) -> Vec<UserStats> {
        let mut totals: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();
        for (i, msg) in self.messages.iter().enumerate() {
            let entry = totals.entry(msg.user.as_str()).or_default();
            entry.0 += 1;
            entry.1 += self.words[i];
            entry.2 += self.chars[i];
        }

        totals
            .into_iter()
            .map(|(user, (messages, words, chars))| UserStats {
                user: user.to_string(),
                messages,
                avg_words: words as f64 / messages as f64,
                avg_chars: chars as f64 / messages as f64,
            })
            .collect()
    }

    /// Detailed figures for `user`, or `None` if they sent nothing.
    pub fn user_overview(&self, user: &str) -> Option<UserOverview> {
        let own: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| m.user == user)
            .cloned()
            .collect();
        let last_message_date = own.iter().map(|m| m.time.date_naive()).max()?;

        let own_stats = ChatStats::new(&own);
        let active_days = own_stats.messages_by_date().len();

        Some(UserOverview {
            user: user.to_string(),
            messages: own.len(),
            participation_pct: own.len() as f64 / self.messages.len() as f64 * 100.0,
            active_days,
            last_message_date,
            top_word: own_stats
                .word_frequencies(&Stopwords::English)
                .into_iter()
                .next(),
            top_emoji: own_stats.emoji_frequencies().into_iter().next(),
        })
    }

    /// Message counts per year, ascending.
    pub fn messages_by_year(&self) -> Vec<(i32, usize)> {
        count_by(self.messages.iter().map(|m| m.time.year()))
    }

    /// Message counts per `YYYY-MM`, ascending.
    pub fn messages_by_month(&self) -> Vec<(String, usize)> {
        count_by(self.messages.iter().map(|m| m.time.format("%Y-%m").to_string()))
    }

    /// Message counts per weekday, Monday first; all seven days are present.
    pub fn messages_by_weekday(&self) -> Vec<(Weekday, usize)> {
        let mut counts = [0usize; 7];
        for msg in self.messages {
            counts[msg.time.weekday().num_days_from_monday() as usize] += 1;
        }
        let mut day = Weekday::Mon;
        counts
            .into_iter()
            .map(|count| {
                let entry = (day, count);
                day = day.succ();
                entry
            })
            .collect()
    }

    /// Message counts per hour of day, index 0 is midnight.
    pub fn messages_by_hour(&self) -> [usize; 24] {
        let mut counts = [0usize; 24];
        for msg in self.messages {
            counts[msg.time.hour() as usize] += 1;
        }
        counts
    }

    /// Message counts per calendar day that has messages, ascending.
    pub fn messages_by_date(&self) -> Vec<(NaiveDate, usize)> {
        count_by(self.messages.iter().map(|m| m.time.date_naive()))
    }

    /// Token counts sorted by count descending, then word ascending.
    pub fn word_frequencies(&self, stopwords: &Stopwords) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for msg in self.messages {
            let lowered = msg.message.to_lowercase();
            for token in TOKEN.find_iter(&lowered) {
                let word = token.as_str();
                if !stopwords.contains(word) {
                    *counts.entry(word.to_string()).or_default() += 1;
                }
            }
        }
        sorted_by_count(counts)
    }

    /// Emoji counts sorted by count descending, then emoji ascending.
    pub fn emoji_frequencies(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for msg in self.messages {
            for emoji in msg.message.graphemes(true).filter(|g| is_emoji(g)) {
                *counts.entry(emoji.to_string()).or_default() += 1;
            }
        }
        sorted_by_count(counts)
    }
}

fn count_by<K: Ord>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

fn sorted_by_count(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

const EMOJI_VARIATION: char = '\u{fe0f}';
const KEYCAP: char = '\u{20e3}';

/// Whether a grapheme cluster renders as one emoji.
///
/// ZWJ sequences, flags, skin tones and keycaps are single clusters. Symbols
/// from the BMP count only when they default to emoji presentation or carry
/// the emoji variation selector, so dingbats like ✓ and ✂ stay text.
fn is_emoji(grapheme: &str) -> bool {
    let Some(first) = grapheme.chars().next() else {
        return false;
    };
    if grapheme.contains(KEYCAP) {
        return true;
    }
    is_pictograph(first)
        || is_emoji_presentation(first)
        || (is_symbol(first) && grapheme.contains(EMOJI_VARIATION))
}

fn is_pictograph(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1F02F
            | 0x1F0A0..=0x1F0FF
            | 0x1F1E6..=0x1F1FF
            | 0x1F300..=0x1F3FA
            | 0x1F400..=0x1F64F
            | 0x1F680..=0x1F6FF
            | 0x1F900..=0x1F9FF
            | 0x1FA70..=0x1FAFF
    )
}

/// BMP code points shown as emoji without a variation selector.
fn is_emoji_presentation(c: char) -> bool {
    matches!(
        c as u32,
        0x231A..=0x231B
            | 0x23E9..=0x23EC
            | 0x23F0
            | 0x23F3
            | 0x25FD..=0x25FE
            | 0x2614..=0x2615
            | 0x2648..=0x2653
            | 0x267F
            | 0x2693
            | 0x26A1
            | 0x26AA..=0x26AB
            | 0x26BD..=0x26BE
            | 0x26C4..=0x26C5
            | 0x26CE
            | 0x26D4
            | 0x26EA
            | 0x26F2..=0x26F3
            | 0x26F5
            | 0x26FA
            | 0x26FD
            | 0x2705
            | 0x270A..=0x270B
            | 0x2728
            | 0x274C
            | 0x274E
            | 0x2753..=0x2755
            | 0x2757
            | 0x2795..=0x2797
            | 0x27B0
            | 0x27BF
            | 0x2B1B..=0x2B1C
            | 0x2B50
            | 0x2B55
    )
}

fn is_symbol(c: char) -> bool {
    matches!(c as u32, 0xA9 | 0xAE | 0x2000..=0x2BFF | 0x3030 | 0x303D | 0x3297 | 0x3299)
}
