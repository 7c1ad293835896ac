//! # chatscroll CLI
//!
//! Command-line interface for the chatscroll library.

use std::io;
#[cfg(feature = "ollama")]
use std::io::Write;
#[cfg(feature = "ollama")]
use std::ops::ControlFlow;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use chatscroll::cli::{Args, Command, RetrieveArgs, SearchArgs, StatsArgs};
use chatscroll::config::AppConfig;
use chatscroll::core::{ChatStats, FilterConfig, Overview, Stopwords, UserStats, apply_filters, search_messages};
use chatscroll::parsers::{ParsedChat, WhatsAppParser};
use chatscroll::progress::stderr_progress;
use chatscroll::retrieval::{RetrievalMethod, Retriever};
use chatscroll::{ChatscrollError, Message};

#[cfg(feature = "ollama")]
use chatscroll::cli::AskArgs;
#[cfg(feature = "ollama")]
use chatscroll::llm::{Conversation, OllamaGenerator, Outcome};

const TOP_N: usize = 10;

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), ChatscrollError> {
    let args = <Args as ClapParser>::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match args.config {
        Some(ref path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Stats(ref stats) => run_stats(stats),
        Command::Search(ref search) => run_search(search),
        Command::Retrieve(ref retrieve) => run_retrieve(retrieve, config),
        #[cfg(feature = "ollama")]
        Command::Ask(ref ask) => run_ask(ask, config),
    }
}

/// Parses the export, reporting what was skipped on stderr.
fn load_chat(input: &Path) -> Result<ParsedChat, ChatscrollError> {
    let parser = WhatsAppParser::new();
    eprintln!("⏳ Parsing {} export {}...", parser.name(), input.display());
    let start = Instant::now();
    let chat = parser.parse(input)?;
    eprintln!(
        "   Found {} messages from {} users ({:.2}s)",
        chat.len(),
        chat.users.len(),
        start.elapsed().as_secs_f64()
    );
    if chat.report.skipped() > 0 {
        eprintln!("   Skipped {} records", chat.report.skipped());
    }
    Ok(chat)
}

#[derive(Serialize)]
struct StatsReport<'a> {
    overview: Overview,
    users: Vec<UserStats>,
    by_year: Vec<(i32, usize)>,
    by_month: Vec<(String, usize)>,
    by_weekday: Vec<(String, usize)>,
    by_hour: [usize; 24],
    top_words: &'a [(String, usize)],
    top_emoji: &'a [(String, usize)],
}

fn run_stats(args: &StatsArgs) -> Result<(), ChatscrollError> {
    let chat = load_chat(&args.input)?;
    if chat.is_empty() {
        eprintln!("⚠️  No messages found in {}", args.input.display());
        return Ok(());
    }
    let stats = ChatStats::new(&chat.messages);

    if let Some(ref user) = args.user {
        let Some(overview) = stats.user_overview(user) else {
            eprintln!("⚠️  No messages from {user}");
            return Ok(());
        };
        if args.json {
            println!("{}", serde_json::to_string_pretty(&overview)?);
            return Ok(());
        }
        println!("👤 {}", overview.user);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("   Messages:       {} ({:.1}% of chat)", overview.messages, overview.participation_pct);
        println!("   Active days:    {}", overview.active_days);
        println!("   Last message:   {}", overview.last_message_date);
        if let Some((word, count)) = overview.top_word {
            println!("   Top word:       {word} ({count})");
        }
        if let Some((emoji, count)) = overview.top_emoji {
            println!("   Top emoji:      {emoji} ({count})");
        }
        return Ok(());
    }

    // Non-empty chat always has an overview
    let Some(overview) = stats.overview() else {
        return Ok(());
    };
    let words = stats.word_frequencies(&Stopwords::English);
    let emoji = stats.emoji_frequencies();
    let top_words = &words[..words.len().min(TOP_N)];
    let top_emoji = &emoji[..emoji.len().min(TOP_N)];

    if args.json {
        let report = StatsReport {
            overview,
            users: stats.user_stats(),
            by_year: stats.messages_by_year(),
            by_month: stats.messages_by_month(),
            by_weekday: stats
                .messages_by_weekday()
                .into_iter()
                .map(|(day, count)| (day.to_string(), count))
                .collect(),
            by_hour: stats.messages_by_hour(),
            top_words,
            top_emoji,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📊 chatscroll v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("💬 Messages:     {}", overview.total_messages);
    println!("👥 Users:        {}", overview.users);
    println!("📅 Period:       {} → {} ({} days)", overview.first_date, overview.last_date, overview.span_days);
    println!("📈 Per day:      {:.1}", overview.messages_per_day);
    println!("🗓️  Active days:  {} ({:.1}%)", overview.active_days, overview.active_day_pct);
    println!(
        "🔥 Busiest day:  {} ({} messages)",
        overview.most_active_day, overview.most_active_day_count
    );

    println!();
    println!("👤 Users:");
    for user in stats.user_stats() {
        println!(
            "   {:<20} {:>7} msgs  {:>6.1} words  {:>6.1} chars",
            user.user, user.messages, user.avg_words, user.avg_chars
        );
    }

    println!();
    println!("📆 By weekday:");
    for (day, count) in stats.messages_by_weekday() {
        println!("   {day}  {count}");
    }

    println!();
    println!("🔤 Top words:");
    for (word, count) in top_words {
        println!("   {word:<20} {count}");
    }

    if !top_emoji.is_empty() {
        println!();
        println!("😀 Top emoji:");
        for (emoji, count) in top_emoji {
            println!("   {emoji}  {count}");
        }
    }

    Ok(())
}

fn run_search(args: &SearchArgs) -> Result<(), ChatscrollError> {
    let mut filter_config = FilterConfig::new();
    if let Some(ref after) = args.after {
        filter_config = filter_config.after_date(after)?;
    }
    if let Some(ref before) = args.before {
        filter_config = filter_config.before_date(before)?;
    }
    if let Some(ref from) = args.from {
        filter_config = filter_config.with_user(from.clone());
    }

    let chat = load_chat(&args.input)?;
    let messages: Vec<Message> = if filter_config.is_active() {
        let filtered = apply_filters(chat.into_messages(), &filter_config);
        eprintln!("🔍 {} messages after filtering", filtered.len());
        filtered
    } else {
        chat.into_messages()
    };

    let hits = search_messages(&messages, &args.pattern)?;
    eprintln!("🔎 {} matches for /{}/", hits.len(), args.pattern);
    for msg in hits.into_iter().take(args.limit) {
        println!("{} - {}: {}", msg.time.format("%Y-%m-%d %H:%M"), msg.user, msg.message);
    }
    Ok(())
}

/// Applies `-k`/`--method` overrides and re-checks the result.
fn override_retrieval(
    mut config: AppConfig,
    k: Option<usize>,
    method: Option<RetrievalMethod>,
) -> Result<AppConfig, ChatscrollError> {
    if let Some(k) = k {
        config.retriever.k = k;
    }
    if let Some(method) = method {
        config.retriever.retrieval_method = method;
    }
    config.validate()?;
    Ok(config)
}

fn build_retriever(messages: &[Message], config: &AppConfig) -> Result<Retriever, ChatscrollError> {
    eprintln!("📚 Indexing with {}...", config.retriever.retrieval_method);
    let start = Instant::now();
    let retriever = Retriever::build_with_fallback(messages, config, Some(stderr_progress()))?;
    eprintln!(
        "   {} chunks indexed with {} ({:.2}s)",
        retriever.len(),
        retriever.method(),
        start.elapsed().as_secs_f64()
    );
    Ok(retriever)
}

fn run_retrieve(args: &RetrieveArgs, config: AppConfig) -> Result<(), ChatscrollError> {
    let config = override_retrieval(config, args.k, args.method)?;
    let chat = load_chat(&args.input)?;
    if chat.is_empty() {
        eprintln!("⚠️  No messages found in {}", args.input.display());
        return Ok(());
    }

    let mut retriever = build_retriever(&chat.messages, &config)?;
    let chunks = retriever.retrieve(&args.query, config.retriever.k)?;
    for (rank, chunk) in chunks.iter().enumerate() {
        println!("── #{} ──", rank + 1);
        println!("{chunk}");
        println!();
    }
    Ok(())
}

#[cfg(feature = "ollama")]
fn run_ask(args: &AskArgs, config: AppConfig) -> Result<(), ChatscrollError> {
    let config = override_retrieval(config, args.k, args.method)?;
    let chat = load_chat(&args.input)?;
    if chat.is_empty() {
        eprintln!("⚠️  No messages found in {}", args.input.display());
        return Ok(());
    }

    let generator = OllamaGenerator::new(config.model.host.as_deref())?;
    let model = generator.resolve_model(args.model.as_deref().or(config.model.name.as_deref()))?;
    eprintln!("🤖 Model: {model} @ {}", generator.base_url());

    let mut retriever = build_retriever(&chat.messages, &config)?;
    let mut conversation = Conversation::new(model).with_temperature(config.model.temperature);

    println!();
    let mut stdout = io::stdout();
    let answer = conversation.ask(&mut retriever, &generator, &args.question, config.retriever.k, |fragment| {
        print!("{fragment}");
        match stdout.flush() {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    })?;
    println!();

    match answer.outcome {
        Outcome::Completed => {}
        Outcome::Cancelled => eprintln!("⏹️  Generation stopped"),
        Outcome::Failed(reason) => eprintln!("⚠️  Answer incomplete: {reason}"),
    }
    Ok(())
}
