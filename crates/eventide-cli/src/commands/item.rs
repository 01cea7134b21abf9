//! Item command implementation

use anyhow::{Context, Result};
use eventide::prelude::*;
use std::path::PathBuf;

use super::preview;

pub struct ItemArgs {
    pub id: String,
    pub type_tag: u16,
    pub from: u64,
    pub to: u64,
    pub alias: bool,
}

pub fn execute(db_path: PathBuf, args: ItemArgs) -> Result<()> {
    let db = EventideDb::open(&db_path).context("Failed to open database")?;
    let requested = ItemId::new(args.type_tag, args.id.as_bytes());

    let (loaded, aliases, views) = db
        .view(|txn| {
            let id = if args.alias {
                item::resolve_alias(txn, &requested)?
            } else {
                requested.clone()
            };
            let loaded = item::get(txn, &id, args.from, args.to)?;
            let aliases = item::aliases(txn, &id)?;
            let views = item::view_names(txn, &id)?
                .into_iter()
                .map(|name| item::get_view(txn, &id, &name).map(|cp| (name, cp)))
                .collect::<eventide::Result<Vec<_>>>()?;
            Ok((loaded, aliases, views))
        })
        .with_context(|| format!("Failed to load item {}", requested))?;

    println!("\nItem {}", loaded.id);
    println!("{}", "=".repeat(60));
    println!("Latest Version: {}", loaded.latest_vsn);
    if let Some(loaded_vsn) = loaded.loaded_vsn {
        println!("Loaded Through: {}", loaded_vsn);
    }

    if !aliases.is_empty() {
        println!("\nAliases:");
        for alias in &aliases {
            println!("  {}", alias);
        }
    }

    if !views.is_empty() {
        println!("\nViews:");
        for (name, checkpoint) in &views {
            let vsn = checkpoint.as_ref().map_or(0, |cp| cp.vsn);
            println!("  {} (folded {} slot(s))", preview(name, 40), vsn);
        }
    }

    println!("\nEvents:");
    for (offset, event) in loaded.events.iter().enumerate() {
        println!(
            "  [{:>4}] {:<28} kind={:<2} {:<20} {}",
            args.from + offset as u64,
            event.id.to_string(),
            event.kind,
            preview(&event.event_type, 20),
            preview(&event.payload, 40)
        );
    }

    Ok(())
}
