//! End-to-end CLI tests for chatscroll.
//!
//! These tests verify the complete CLI workflow by running the actual binary
//! with various arguments and checking the output.
//!
//! # Test Categories
//!
//! - **Statistics**: Text and JSON reports, per-user view
//! - **Search**: Regex search with date and user filters
//! - **Retrieval**: BM25 retrieval, overrides from flags and config
//! - **Error handling**: Proper error messages for bad input
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Creates a temporary directory with small exports and config files.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let chat = "\
01.07.2025, 10:12 - Messages and calls are end-to-end encrypted.
01.07.2025, 10:12 - Alex: Morning! Booked the cabin by the lake 🏕️
01.07.2025, 10:13 - Jamie: Who is bringing the tent?
01.07.2025, 10:14 - Sam: I'll bring the tent
01.07.2025, 10:15 - Alex: <Media omitted>
02.07.2025, 18:40 - Jamie: pizza tonight? 🍕
02.07.2025, 18:41 - Sam: Pizza sounds great
03.07.2025, 09:00 - Alex: Shopping list:
- marshmallows
- sunscreen
03.07.2025, 09:05 - Jamie: 👍";
    fs::write(dir.path().join("chat.txt"), chat).unwrap();

    fs::write(dir.path().join("empty.txt"), "nothing to see here\n").unwrap();

    let config = "\
[splitter]
chunk_size = 2
chunk_overlap = 1

[retriever]
k = 2
";
    fs::write(dir.path().join("chatscroll.toml"), config).unwrap();

    fs::write(dir.path().join("bad.toml"), "[splitter]\nchunk_size = 3\nchunk_overlap = 3\n").unwrap();

    fs::write(
        dir.path().join("offline.toml"),
        "[model]\nhost = \"http://127.0.0.1:9\"\n",
    )
    .unwrap();

    dir
}

fn chatscroll_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatscroll"));
    let mut cmd = Command::from_std(cmd);
    cmd.env_remove("RUST_LOG").env_remove("OLLAMA_HOST");
    cmd
}

fn fixture(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

// ============================================================================
// Statistics
// ============================================================================

mod stats {
    use super::*;

    #[test]
    fn test_stats_text_report() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["stats", input.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Messages:     7"))
            .stdout(predicate::str::contains("Users:        3"))
            .stdout(predicate::str::contains("2025-07-01 → 2025-07-03"))
            .stdout(predicate::str::contains("Jamie"))
            .stdout(predicate::str::contains("tent"));
    }

    #[test]
    fn test_stats_json_report() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        let output = chatscroll_cmd()
            .args(["stats", input.to_str().unwrap(), "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["overview"]["total_messages"], 7);
        assert_eq!(report["overview"]["users"], 3);
        assert_eq!(report["users"].as_array().unwrap().len(), 3);
        assert_eq!(report["by_month"][0][0], "2025-07");
        assert_eq!(report["by_hour"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_stats_for_one_user() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        let output = chatscroll_cmd()
            .args(["stats", input.to_str().unwrap(), "--user", "Jamie", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let overview: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(overview["user"], "Jamie");
        assert_eq!(overview["messages"], 3);
        assert_eq!(overview["active_days"], 3);
    }

    #[test]
    fn test_stats_unknown_user() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["stats", input.to_str().unwrap(), "--user", "Nobody"])
            .assert()
            .success()
            .stderr(predicate::str::contains("No messages from Nobody"));
    }

    #[test]
    fn test_stats_empty_export() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "empty.txt");

        chatscroll_cmd()
            .args(["stats", input.to_str().unwrap()])
            .assert()
            .success()
            .stderr(predicate::str::contains("No messages found"));
    }
}

// ============================================================================
// Search
// ============================================================================

mod search {
    use super::*;

    #[test]
    fn test_search_newest_first() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["search", input.to_str().unwrap(), "PIZZA"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("(?s)18:41 - Sam.*18:40 - Jamie").unwrap());
    }

    #[test]
    fn test_search_with_filters() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args([
                "search",
                input.to_str().unwrap(),
                "tent",
                "--from",
                "sam",
                "--before",
                "2025-07-01",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Sam: I'll bring the tent"))
            .stdout(predicate::str::contains("Jamie").not());
    }

    #[test]
    fn test_search_limit() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        let output = chatscroll_cmd()
            .args(["search", input.to_str().unwrap(), "tent|pizza", "--limit", "2"])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 2);
    }

    #[test]
    fn test_search_invalid_pattern() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["search", input.to_str().unwrap(), "(unclosed"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid search pattern"));
    }

    #[test]
    fn test_search_invalid_date() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["search", input.to_str().unwrap(), "x", "--after", "01/07/2025"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid date"));
    }
}

// ============================================================================
// Retrieval
// ============================================================================

mod retrieve {
    use super::*;

    #[test]
    fn test_retrieve_best_chunk_first() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["retrieve", input.to_str().unwrap(), "who brings the tent", "-k", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("── #1 ──"))
            .stdout(predicate::str::contains("── #2 ──").not())
            .stdout(predicate::str::contains("tent"));
    }

    #[test]
    fn test_retrieve_uses_config_file() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");
        let config = fixture(&fixtures, "chatscroll.toml");

        chatscroll_cmd()
            .args([
                "--config",
                config.to_str().unwrap(),
                "retrieve",
                input.to_str().unwrap(),
                "pizza",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("── #2 ──"))
            .stdout(predicate::str::contains("── #3 ──").not())
            .stderr(predicate::str::contains("6 chunks"));
    }

    #[test]
    fn test_retrieve_k_out_of_range() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");

        chatscroll_cmd()
            .args(["retrieve", input.to_str().unwrap(), "tent", "-k", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("retriever.k"));
    }

    #[test]
    fn test_invalid_config_file() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");
        let config = fixture(&fixtures, "bad.toml");

        chatscroll_cmd()
            .args(["--config", config.to_str().unwrap(), "retrieve", input.to_str().unwrap(), "tent"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn test_embedding_failure_falls_back() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");
        let config = fixtures.path().join("embed.toml");
        fs::write(
            &config,
            format!(
                "[retriever]\nretrieval_method = \"embedding\"\nembeddings_model = \"no-such-model\"\nindex_dir = {:?}\n",
                fixtures.path().join("cache")
            ),
        )
        .unwrap();

        chatscroll_cmd()
            .args(["--config", config.to_str().unwrap(), "retrieve", input.to_str().unwrap(), "tent"])
            .assert()
            .success()
            .stderr(predicate::str::contains("with bm25"))
            .stdout(predicate::str::contains("tent"));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_missing_input_file() {
        chatscroll_cmd()
            .args(["stats", "/definitely/not/here.txt"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("❌ Error"));
    }

    #[test]
    fn test_unknown_subcommand() {
        chatscroll_cmd().arg("export").assert().failure();
    }

    #[test]
    fn test_help_lists_subcommands() {
        chatscroll_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("stats"))
            .stdout(predicate::str::contains("search"))
            .stdout(predicate::str::contains("retrieve"));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn test_ask_without_server() {
        let fixtures = setup_fixtures();
        let input = fixture(&fixtures, "chat.txt");
        let config = fixture(&fixtures, "offline.toml");

        chatscroll_cmd()
            .args([
                "--config",
                config.to_str().unwrap(),
                "ask",
                input.to_str().unwrap(),
                "who brings the tent?",
                "--model",
                "llama3.2",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Generation failed"));
    }
}
