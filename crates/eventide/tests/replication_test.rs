//! Integration tests for log shipping between two stores

use eventide::prelude::*;
use eventide::schema::schema_item;
use tempfile::TempDir;

/// Helper to create a test database
fn create_test_db() -> (EventideDb, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(temp_dir.path().to_path_buf())
        .with_map_size(256 * 1024 * 1024)
        .with_sync_mode(SyncMode::NoSync);
    let db = EventideDb::open_with_config(config).unwrap();
    (db, temp_dir)
}

fn entity(id: &str) -> ItemId {
    ItemId::new(item_type::ENTITY, id)
}

/// Ship every event of `partition` from `primary` to `replica` in pages of `page`
fn ship(primary: &EventideDb, replica: &EventideDb, partition: u8, page: usize) -> usize {
    let mut shipped = 0;
    let mut from = EventId::first(partition);
    loop {
        let batch = primary
            .view(|txn| replication::capture(txn, from, EventId::last(partition), page))
            .unwrap();
        shipped += replica
            .update(|txn| replication::apply(txn, &batch.events))
            .unwrap();
        match batch.next {
            Some(next) => from = next,
            None => return shipped,
        }
    }
}

#[test]
fn test_replica_rebuilds_items() {
    let (primary, _p) = create_test_db();
    let (replica, _r) = create_test_db();

    let alice = entity("User:alice");
    let bob = entity("User:bob");
    let alias = entity("email:alice@example.com");

    primary
        .update(|txn| {
            item::create(txn, &alice)?;
            item::create(txn, &bob)?;
            item::alias(txn, &alice, &alias)?;
            for n in 1..=20u64 {
                item::put(txn, &alice, &Event::entity("type.test", n.to_string()))?;
            }
            item::put(txn, &bob, &Event::entity("type.test", "1"))?;
            item::delete(txn, &bob)
        })
        .unwrap();

    let shipped = ship(&primary, &replica, 1, 7);
    assert_eq!(shipped, 2 + 1 + 20 + 2);

    let expected = primary.view(|txn| item::get(txn, &alice, 0, 0)).unwrap();
    replica
        .view(|txn| {
            assert_eq!(item::get(txn, &alice, 0, 0)?, expected);
            assert_eq!(item::latest_version(txn, &alice)?, 22);
            assert_eq!(item::resolve_alias(txn, &alias)?, alice);
            assert_eq!(item::aliases(txn, &alice)?, vec![alias.clone()]);
            assert!(!item::exists(txn, &bob)?);
            Ok(())
        })
        .unwrap();

    // The replicated log is identical
    let range = |db: &EventideDb| {
        db.view(|txn| event_log::range(txn, EventId::first(1), EventId::last(1), 1_000))
            .unwrap()
    };
    assert_eq!(range(&primary), range(&replica));
}

#[test]
fn test_replica_rebuilds_schema() {
    let (primary, _p) = create_test_db();
    let (replica, _r) = create_test_db();
    let registry = SchemaRegistry::new(JsonSchemaDecoder);

    primary
        .update(|txn| {
            registry.create_entity_type(txn, "User")?;
            registry.create_event_type(txn, "User", "Created", &JsonSchema::String)?;
            registry.update_event_type(txn, "User", "Created", &JsonSchema::Bytes)?;
            Ok(())
        })
        .unwrap();

    ship(&primary, &replica, 0, 100);

    let expected = primary.view(|txn| registry.fold_schema(txn, |_| false)).unwrap();
    replica
        .view(|txn| {
            assert!(item::exists(txn, &schema_item())?);
            assert_eq!(registry.fold_schema(txn, |_| false)?, expected);
            assert_eq!(registry.schema_vsn(txn)?, 3);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_alias_delete_replicates() {
    let (primary, _p) = create_test_db();
    let (replica, _r) = create_test_db();
    let src = entity("User:carol");
    let alias = entity("email:carol@example.com");

    primary
        .update(|txn| {
            item::create(txn, &src)?;
            item::alias(txn, &src, &alias)?;
            item::alias_delete(txn, &src, &alias)
        })
        .unwrap();

    ship(&primary, &replica, 1, 100);

    replica
        .view(|txn| {
            assert!(item::aliases(txn, &src)?.is_empty());
            assert!(matches!(
                item::resolve_alias(txn, &alias),
                Err(EventideError::AliasNotFound(_))
            ));
            assert_eq!(item::latest_version(txn, &src)?, 3);
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_raw_log_events_are_mirrored_only() {
    let (primary, _p) = create_test_db();
    let (replica, _r) = create_test_db();

    // Meta 1 is not an item kind
    primary
        .update(|txn| event_log::put(txn, 9, &LogEvent::new(1, "raw")))
        .unwrap();

    assert_eq!(ship(&primary, &replica, 9, 10), 1);

    let (events, _) = replica
        .view(|txn| event_log::range(txn, EventId::first(9), EventId::last(9), 10))
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload, b"raw");
}

#[test]
fn test_replaying_create_twice_fails() {
    let (primary, _p) = create_test_db();
    let (replica, _r) = create_test_db();
    let id = entity("User:dave");

    primary.update(|txn| item::create(txn, &id)).unwrap();
    let batch = primary
        .view(|txn| replication::capture(txn, EventId::first(1), EventId::last(1), 10))
        .unwrap();

    replica
        .update(|txn| replication::apply(txn, &batch.events))
        .unwrap();
    let again = replica.update(|txn| replication::apply(txn, &batch.events));
    assert!(matches!(again, Err(EventideError::ItemExists(_))));
}
