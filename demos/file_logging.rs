//! File logging example
//!
//! Demonstrates console output together with a chunked log directory.
//!
//! Run with: cargo run --example file_logging

use taglog::prelude::*;
use taglog::{error, info};

fn main() -> Result<()> {
    println!("=== taglog - File Logging Example ===\n");

    let log_dir = std::env::temp_dir().join("taglog-demo");
    let chunks = ChunkedFileConfig::new(&log_dir, 4 * 1024, 3)
        .with_naming(|index: u64| format!("demo-{:03}.log", index));

    taglog::initialize(
        Configuration::builder()
            .tag("FileDemo")
            .minimal_level(LogLevel::Debug)
            .file_sink(FileSinkConfig::chunked(chunks))
            .build()?,
    );
    let logger = taglog::with_stack_trace(4);

    println!("1. Logging to both console and {}:", log_dir.display());
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warning("Using default settings for some options");

    println!("\n2. Filling several chunks:");
    for i in 1..=200 {
        info!(logger, "Processing item {}/200", i);
    }

    println!("\n3. Logging an error with its stack:");
    if let Err(e) = std::fs::read("/definitely/missing/file") {
        error!(logger, error = e, "cannot read {}", "/definitely/missing/file");
    }

    taglog::shutdown();

    let mut files: Vec<_> = std::fs::read_dir(&log_dir)
        .map_err(|e| LoggerError::io_operation("list log directory", log_dir.display().to_string(), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    println!("\nChunks kept on disk: {:?}", files);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
