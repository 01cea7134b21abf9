//! Status command implementation

use anyhow::{Context, Result};
use eventide::prelude::*;
use std::path::PathBuf;

pub fn execute(db_path: PathBuf) -> Result<()> {
    tracing::info!("Checking database status: {}", db_path.display());

    let db = EventideDb::open(&db_path).context("Failed to open database")?;
    let registry = SchemaRegistry::new(JsonSchemaDecoder);

    println!("\nDatabase Status");
    println!("{}", "=".repeat(60));
    println!("Path: {}", db.path().display());

    let schema_vsn = db
        .view(|txn| registry.schema_vsn(txn))
        .context("Failed to read schema version")?;
    println!("Schema Version: {}", schema_vsn);

    println!("\nLog Partitions:");
    let mut total = 0u64;
    for partition in 0..=u8::MAX {
        let (count, _) = db
            .view(|txn| {
                event_log::fold(
                    txn,
                    EventId::first(partition),
                    EventId::last(partition),
                    usize::MAX,
                    0u64,
                    |count, _| {
                        *count += 1;
                        Ok(())
                    },
                )
            })
            .with_context(|| format!("Failed to scan partition {}", partition))?;

        if count > 0 {
            println!("  {:>3}: {} event(s)", partition, count);
            total += count;
        }
    }

    if total == 0 {
        println!("  (empty)");
    } else {
        println!("  Total: {} event(s)", total);
    }

    Ok(())
}
