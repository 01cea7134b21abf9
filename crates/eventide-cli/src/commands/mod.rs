pub mod item;
pub mod log;
pub mod schema;
pub mod status;

/// Printable form of an event payload or id
pub fn preview(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(max)]).into_owned();
    if bytes.len() > max {
        format!("{}…", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::{item as item_cmd, log as log_cmd, preview, schema as schema_cmd, status};
    use eventide::prelude::*;
    use tempfile::TempDir;

    /// Store with a schema, an aliased item and a synced view, closed again
    /// so each command can open it
    fn seeded_store() -> TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let db = EventideDb::open(temp_dir.path()).unwrap();
        let registry = SchemaRegistry::new(JsonSchemaDecoder);
        let id = ItemId::new(item_type::ENTITY, "User:alice");

        db.update(|txn| {
            registry.create_entity_type(txn, "User")?;
            registry.create_event_type(txn, "User", "Created", &JsonSchema::String)?;
            item::create(txn, &id)?;
            item::alias(txn, &id, &ItemId::new(item_type::ENTITY, "email:alice"))?;
            item::put(txn, &id, &Event::entity("Created", "alice"))?;
            item::sync_persistent_view(txn, &id, b"count", &mut Count, 0)?;
            Ok(())
        })
        .unwrap();
        temp_dir
    }

    struct Count;

    impl PersistentView for Count {
        type State = u64;

        fn fold(&mut self, count: &mut u64, _event: &Event) -> Result<ControlFlow<()>> {
            *count += 1;
            Ok(ControlFlow::Continue(()))
        }
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview(b"hello", 10), "hello");
        assert_eq!(preview(b"hello world", 5), "hello…");
    }

    #[test]
    fn test_commands_run_against_a_populated_store() {
        let temp_dir = seeded_store();
        let path = temp_dir.path().to_path_buf();

        status::execute(path.clone()).unwrap();
        log_cmd::execute(path.clone(), 1, 0, 2).unwrap();
        schema_cmd::execute(path.clone(), None).unwrap();
        schema_cmd::execute(path.clone(), Some(1)).unwrap();
        item_cmd::execute(
            path.clone(),
            item_cmd::ItemArgs {
                id: "User:alice".into(),
                type_tag: item_type::ENTITY,
                from: 0,
                to: 0,
                alias: false,
            },
        )
        .unwrap();
        item_cmd::execute(
            path,
            item_cmd::ItemArgs {
                id: "email:alice".into(),
                type_tag: item_type::ENTITY,
                from: 0,
                to: 0,
                alias: true,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_item_command_reports_missing_item() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = item_cmd::execute(
            temp_dir.path().to_path_buf(),
            item_cmd::ItemArgs {
                id: "nobody".into(),
                type_tag: item_type::ENTITY,
                from: 0,
                to: 0,
                alias: false,
            },
        );
        assert!(result.is_err());
    }
}
