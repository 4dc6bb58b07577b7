//! Integration tests for taglog
//!
//! These tests verify:
//! - Level gating before any formatting work
//! - Structured value rendering and custom formatters
//! - Chunked file rotation, retention and resume
//! - Single file append and overwrite modes
//! - Failing file sinks reported once
//! - JSON, XML, hex and error payloads

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use taglog::appenders::{ChunkedFileConfig, FileSinkConfig, MemoryAppender};
use taglog::{info, Configuration, Formatter, LogLevel, Logger, LoggerError, Throwable};
use tempfile::TempDir;

const TAG: &str = "Integration";

fn quiet() -> taglog::ConfigurationBuilder {
    Configuration::builder()
        .console(false)
        .show_prefixes(false)
        .tag(TAG)
}

fn capture(builder: taglog::ConfigurationBuilder) -> (Logger, MemoryAppender) {
    let memory = MemoryAppender::new();
    let config = builder
        .appender(memory.clone())
        .build()
        .expect("Failed to build configuration");
    (Logger::with_config(config), memory)
}

fn chunk_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read log dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

struct Account {
    id: u32,
}
taglog::log_value!(Account);

#[test]
fn test_suppressed_level_does_no_formatting_work() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let (logger, memory) = capture(
        quiet()
            .minimal_level(LogLevel::Info)
            .formatter(Formatter::simple(move |account: &Account| {
                counter.fetch_add(1, Ordering::SeqCst);
                format!("Account#{}", account.id)
            })),
    );

    let account = Account { id: 7 };
    logger.debug(&account);
    info!(logger.clone().with_tag("Other"), "{}", Account { id: 8 });
    logger.verbose(&account);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(memory.messages(), ["Account#8"]);
}

#[test]
fn test_map_and_nested_values() {
    let (logger, memory) = capture(quiet());
    let mut map = BTreeMap::new();
    map.insert("a", vec![1, 2]);
    map.insert("b", vec![]);

    logger.info(&map);
    logger.log_args(LogLevel::Info, "Message {}, {}", &[&"title", &100]);

    assert_eq!(memory.messages(), ["{a=[1, 2], b=[]}", "Message title, 100"]);
}

#[test]
fn test_disabled_map_formatting_uses_default_representation() {
    let (logger, memory) = capture(quiet().format_maps(false));
    let mut map = BTreeMap::new();
    map.insert(1, 2);

    logger.info(&map);
    let message = &memory.messages()[0];
    assert!(message.contains("BTreeMap"));
    assert!(message.contains('@'));
}

#[test]
fn test_complex_formatter_delegates_nested_values() {
    struct Order {
        account: Account,
        items: Vec<&'static str>,
    }
    taglog::log_value!(Order);

    let (logger, memory) = capture(
        quiet()
            .formatter(Formatter::simple(|account: &Account| format!("#{}", account.id)))
            .formatter(Formatter::complex(|order: &Order, format| {
                format!("Order({}, {})", format(&order.account), format(&order.items))
            })),
    );

    logger.info(Order {
        account: Account { id: 3 },
        items: vec!["tea", "milk"],
    });
    assert_eq!(memory.messages(), ["Order(#3, [tea, milk])"]);
}

#[test]
fn test_chunk_rotation_keeps_newest_chunks() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let message = "x".repeat(100);
    let config = quiet()
        .minimal_level(LogLevel::Info)
        .file_sink(FileSinkConfig::chunked(ChunkedFileConfig::new(
            temp_dir.path(),
            1024,
            2,
        )))
        .build()
        .expect("Failed to build configuration");
    let logger = Logger::with_config(config);

    let line_len = format!("{} INFO {} {}\n", "0000-00-00 00:00:00.000", TAG, message).len();
    let per_chunk = 1024 / line_len;
    for _ in 0..(2 * per_chunk + 1) {
        logger.info(message.as_str());
    }

    assert_eq!(chunk_files(temp_dir.path()), ["chunk-1.log", "chunk-2.log"]);
    let first = fs::read_to_string(temp_dir.path().join("chunk-1.log")).unwrap();
    let second = fs::read_to_string(temp_dir.path().join("chunk-2.log")).unwrap();
    assert_eq!(first.lines().count(), per_chunk);
    assert_eq!(second.lines().count(), 1);
    assert!(first.len() <= 1024);
}

#[test]
fn test_chunked_sink_resumes_latest_chunk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = FileSinkConfig::chunked(ChunkedFileConfig::new(temp_dir.path(), 4096, 3));

    for run in 0..2 {
        let config = quiet()
            .file_sink(sink.clone())
            .build()
            .expect("Failed to build configuration");
        Logger::with_config(config).info(format!("run {}", run));
    }

    assert_eq!(chunk_files(temp_dir.path()), ["chunk-0.log"]);
    let content = fs::read_to_string(temp_dir.path().join("chunk-0.log")).unwrap();
    assert!(content.lines().next().unwrap().ends_with("run 0"));
    assert!(content.lines().nth(1).unwrap().ends_with("run 1"));
}

#[test]
fn test_custom_chunk_naming() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let chunked = ChunkedFileConfig::new(temp_dir.path(), 64, 10)
        .with_naming(|index: u64| format!("app.{:03}.txt", index));
    let config = quiet()
        .file_sink(FileSinkConfig::chunked(chunked))
        .build()
        .expect("Failed to build configuration");
    let logger = Logger::with_config(config);

    logger.info("first record");
    logger.info("second record");

    assert_eq!(chunk_files(temp_dir.path()), ["app.000.txt", "app.001.txt"]);
}

#[test]
fn test_single_file_overwrite_and_append() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");
    fs::write(&path, "stale line\n").unwrap();

    let appending = quiet()
        .file_sink(FileSinkConfig::single(&path, true))
        .build()
        .unwrap();
    Logger::with_config(appending).info("appended");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("stale line\n"));
    assert!(content.ends_with("appended\n"));

    let overwriting = quiet()
        .file_sink(FileSinkConfig::single(&path, false))
        .build()
        .unwrap();
    let logger = Logger::with_config(overwriting);
    logger.info("fresh");
    logger.info("again");
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.lines().all(|line| !line.contains("stale")));
}

#[test]
fn test_unwritable_file_sink_disables_itself_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();

    let (logger, memory) = capture(
        quiet().file_sink(FileSinkConfig::single(blocker.join("nested").join("app.log"), true)),
    );
    for i in 0..3 {
        logger.info(i);
    }

    assert_eq!(memory.len(), 3);
    let metrics = logger.configuration().unwrap().metrics().clone();
    assert_eq!(metrics.dropped_count(), 1);
    assert_eq!(metrics.emitted_count(), 2);
}

#[test]
fn test_invalid_chunk_settings_are_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = quiet()
        .file_sink(FileSinkConfig::chunked(ChunkedFileConfig::new(temp_dir.path(), 1024, 0)))
        .build();
    assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
}

#[test]
fn test_json_xml_and_hex_payloads() {
    let (logger, memory) = capture(quiet().show_thread(true).json(2, LogLevel::Debug));
    let logger = logger.with_thread_name("io");

    logger.json(r#"{"id":1,"tags":["a"]}"#);
    logger.xml("<root><child>text</child></root>");
    logger.hex(&[0xDE, 0xAD, 0xBE, 0xEF, 0x01]);

    let entries = memory.entries();
    assert_eq!(entries[0].level, LogLevel::Debug);
    assert_eq!(
        entries[0].message,
        "[io]\n{\n  \"id\": 1,\n  \"tags\": [\n    \"a\"\n  ]\n}"
    );
    assert_eq!(entries[1].message, "[io]\n<root>\n  <child>text</child>\n</root>");
    assert_eq!(entries[2].message, "[io]\nDEADBEEF 01");
}

#[test]
fn test_json_payload_keeps_number_text() {
    let (logger, memory) = capture(quiet().json(0, LogLevel::Info));

    logger.json(r#"{ "id": 123456789012345678901234567890, "e": 1e2, "p": 0.10000000000000000555 }"#);

    assert_eq!(
        memory.messages(),
        [r#"{"id":123456789012345678901234567890,"e":1e2,"p":0.10000000000000000555}"#]
    );
}

#[test]
fn test_error_with_stack_lines_and_causes() {
    #[derive(Debug, thiserror::Error)]
    enum LoadError {
        #[error("cannot load profile")]
        Profile(#[source] std::io::Error),
    }

    let (logger, memory) = capture(quiet());
    let err = LoadError::Profile(std::io::Error::other("disk gone"));
    let throwable = Throwable::with_frames(&err, Vec::new());
    logger.clone().with_stack_trace(5).log_throwable(LogLevel::Error, &throwable);

    assert_eq!(
        memory.messages(),
        ["LoadError: cannot load profile\nCaused by: disk gone"]
    );
}

#[test]
fn test_files_receive_one_line_per_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("levels.log");
    let config = quiet()
        .file_sink(FileSinkConfig::single(&path, true))
        .build()
        .unwrap();
    let logger = Logger::with_config(config);

    logger.warning("careful");
    logger.wtf("impossible");

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" WARNING Integration careful"));
    assert!(lines[1].ends_with(" WTF Integration impossible"));
}
