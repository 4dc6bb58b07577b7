//! Property-based tests for taglog
//!
//! These tests verify:
//! - Log level parsing and ordering
//! - Hex dump layout
//! - JSON pretty-printing stability
//! - Template expansion of plain text
//! - Chunk retention bounds

use proptest::prelude::*;
use taglog::appenders::{ChunkedFileAppender, ChunkedFileConfig};
use taglog::core::hex::hex_dump;
use taglog::core::pretty_print::pretty_json;
use taglog::{FormatterRegistry, LogLevel, StructureOptions};
use taglog::core::ValueFormatter;
use tempfile::TempDir;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop::sample::select(LogLevel::ALL.to_vec())
}

// ============================================================================
// Log Level Properties
// ============================================================================

proptest! {
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    #[test]
    fn test_log_level_letter_roundtrip(level in any_level(), lower in any::<bool>()) {
        let letter = level.letter().to_string();
        let letter = if lower { letter.to_lowercase() } else { letter };
        let parsed: LogLevel = letter.parse().unwrap();
        prop_assert_eq!(parsed, level);
    }

    #[test]
    fn test_log_level_ordering_matches_priority(a in any_level(), b in any_level()) {
        prop_assert_eq!(a.cmp(&b), a.platform_priority().cmp(&b.platform_priority()));
    }

    #[test]
    fn test_log_level_invalid_parse(invalid in "[0-9#%]{1,8}") {
        prop_assert!(invalid.parse::<LogLevel>().is_err());
    }
}

// ============================================================================
// Hex Dump Properties
// ============================================================================

proptest! {
    #[test]
    fn test_hex_dump_layout(bytes in prop::collection::vec(any::<u8>(), 0..200)) {
        let dump = hex_dump(&bytes);
        prop_assert_eq!(&dump, &hex_dump(&bytes));

        let lines: Vec<&str> = if dump.is_empty() { Vec::new() } else { dump.split('\n').collect() };
        prop_assert_eq!(lines.len(), bytes.len().div_ceil(16));

        let digits: String = dump.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        prop_assert_eq!(digits.len(), bytes.len() * 2);
        prop_assert!(!dump.chars().any(|c| c.is_ascii_lowercase()));
        for line in lines {
            prop_assert!(line.split(' ').all(|group| group.len() <= 8));
        }
    }
}

// ============================================================================
// Pretty-Printing Properties
// ============================================================================

fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-z ]{0,8}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|map| {
                serde_json::Value::Object(map.into_iter().collect())
            }),
        ]
    })
}

proptest! {
    #[test]
    fn test_pretty_json_is_a_fixed_point(value in json_value(), indent in 0usize..6) {
        let source = value.to_string();
        let once = pretty_json(&source, indent).unwrap();
        let twice = pretty_json(&once, indent).unwrap();
        prop_assert_eq!(&once, &twice);

        let reparsed: serde_json::Value = serde_json::from_str(&once).unwrap();
        prop_assert_eq!(reparsed, value);
    }
}

// ============================================================================
// Template Properties
// ============================================================================

proptest! {
    #[test]
    fn test_template_without_braces_is_unchanged(text in "[^{}]*") {
        let registry = FormatterRegistry::new();
        let formatter = ValueFormatter::new(StructureOptions::default(), &registry);
        prop_assert_eq!(formatter.format_template(&text, &[&1]), text);
    }
}

// ============================================================================
// Chunk Retention Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_chunks_never_exceed_limits(
        sizes in prop::collection::vec(1usize..120, 1..60),
        max_chunks in 1usize..4,
    ) {
        let temp_dir = TempDir::new().unwrap();
        let config = ChunkedFileConfig::new(temp_dir.path(), 128, max_chunks);
        let mut appender = ChunkedFileAppender::new(config.clone()).unwrap();

        for size in &sizes {
            appender.append_bytes(&vec![b'x'; *size]).unwrap();
            prop_assert!(appender.chunk_indices().len() <= max_chunks);
        }

        for index in appender.chunk_indices() {
            let len = std::fs::metadata(config.chunk_path(index)).unwrap().len();
            prop_assert!(len <= 128);
        }
        let on_disk = std::fs::read_dir(temp_dir.path()).unwrap().count();
        prop_assert_eq!(on_disk, appender.chunk_indices().len());
    }
}
