//! Value formatting example
//!
//! Demonstrates structural rendering, custom formatters, JSON, XML and hex
//! payloads.
//!
//! Run with: cargo run --example value_formatting

use std::collections::BTreeMap;
use taglog::prelude::*;
use taglog::{info, Iterable};

struct User {
    id: u32,
    name: String,
}
taglog::log_value!(User);

struct Team {
    lead: User,
    members: Vec<User>,
}
taglog::log_value!(Team);

fn main() -> Result<()> {
    println!("=== taglog - Value Formatting Example ===\n");

    let config = Configuration::builder()
        .tag("Values")
        .show_prefixes(false)
        .json(2, LogLevel::Debug)
        .formatter(Formatter::simple(|user: &User| {
            format!("User#{}({})", user.id, user.name)
        }))
        .formatter(Formatter::complex(|team: &Team, format| {
            format!("Team(lead={}, members={})", format(&team.lead), format(&team.members))
        }))
        .build()?;
    let logger = Logger::with_config(config);

    println!("1. Structures:");
    let mut scores = BTreeMap::new();
    scores.insert("alice", 12);
    scores.insert("bob", 7);
    logger.info(&scores);
    logger.info([1, 2, 3]);
    logger.info(Iterable((1..=5).map(|n| n * n)));
    info!(logger, "Message {}, {}", "title", 100);

    println!("\n2. Custom formatters:");
    let team = Team {
        lead: User {
            id: 1,
            name: "alice".to_string(),
        },
        members: vec![User {
            id: 2,
            name: "bob".to_string(),
        }],
    };
    logger.info(&team);

    println!("\n3. Payloads:");
    logger.json(r#"{"id":7,"roles":["admin","dev"]}"#);
    logger.xml("<user id=\"7\"><name>alice</name></user>");
    logger.hex(b"taglog hex dump example");
    logger.json("{not json");

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
