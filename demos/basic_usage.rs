//! Basic logger usage example
//!
//! Demonstrates the process-wide configuration, tags, prefixes and levels.
//!
//! Run with: cargo run --example basic_usage

use taglog::prelude::*;
use taglog::{debug, info, warning};

struct Server {
    logger: Logger,
}

impl Server {
    fn start(&self, port: u16) {
        // Prefix shows thread, type, method and line of this call
        info!(self.logger, "listening on port {}", port);
    }
}

fn main() -> Result<()> {
    println!("=== taglog - Basic Usage Example ===\n");

    taglog::initialize(
        Configuration::builder()
            .minimal_level(LogLevel::Verbose)
            .show_class(true)
            .build()?,
    );

    println!("1. Logging at different levels:");
    let logger = taglog::tagged("Basic");
    logger.verbose("This is a verbose message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.wtf("This should never happen");

    println!("\n2. Untagged records take the caller's type as tag:");
    Server {
        logger: Logger::global(),
    }
    .start(8080);

    println!("\n3. Raising the minimal level:");
    let raised = taglog::current()
        .map(|config| config.to_builder().minimal_level(LogLevel::Info).build())
        .transpose()?;
    if let Some(raised) = raised {
        taglog::initialize(raised);
    }
    debug!(logger, "Debug message (hidden)");
    info!(logger, "Info message (visible)");
    warning!(logger);

    taglog::shutdown();
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
