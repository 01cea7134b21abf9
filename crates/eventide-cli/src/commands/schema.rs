//! Schema command implementation

use anyhow::{Context, Result};
use eventide::prelude::*;
use std::path::PathBuf;

pub fn execute(db_path: PathBuf, at: Option<u64>) -> Result<()> {
    let db = EventideDb::open(&db_path).context("Failed to open database")?;
    let registry = SchemaRegistry::new(JsonSchemaDecoder);

    let schema = db
        .view(|txn| match at {
            Some(vsn) => registry.get_schema(txn, vsn),
            None => registry.fold_schema(txn, |_| false),
        })
        .context("Failed to rebuild schema")?;

    println!("\nSchema v{}", schema.vsn);
    println!("{}", "=".repeat(60));

    if schema.entities.is_empty() {
        println!("No entity types registered");
        return Ok(());
    }

    for (name, entity) in &schema.entities {
        println!("\n{} (v{})", name, entity.vsn);
        for (key, data_schema) in &entity.events {
            let json = data_schema
                .encode_schema()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .context("Failed to encode data schema")?;
            println!("  {}@{}: {}", key.name, key.vsn, json);
        }
    }

    Ok(())
}
