//! Log command implementation

use anyhow::{Context, Result};
use eventide::prelude::*;
use std::path::PathBuf;

use super::preview;

pub fn execute(db_path: PathBuf, partition: u8, from: u64, limit: usize) -> Result<()> {
    let db = EventideDb::open(&db_path).context("Failed to open database")?;

    let from = EventId::new(partition, from, 0);
    let (events, next) = db
        .view(|txn| event_log::range(txn, from, EventId::last(partition), limit))
        .context("Failed to read log")?;

    println!("\nPartition {} ({} event(s))", partition, events.len());
    println!("{}", "=".repeat(60));
    for event in &events {
        println!(
            "{:<28} kind={:<2} {:>6}B  {}",
            event.id.to_string(),
            event.meta,
            event.payload.len(),
            preview(&event.payload, 40)
        );
    }

    if let Some(next) = next {
        println!("\nMore events follow; continue with --from {}", next.timestamp);
    }

    Ok(())
}
