//! Integration tests for the schema registry

use eventide::prelude::*;
use eventide::schema::schema_item;
use std::collections::BTreeMap;
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

fn registry() -> SchemaRegistry<JsonSchemaDecoder> {
    SchemaRegistry::new(JsonSchemaDecoder)
}

fn created_schema() -> JsonSchema {
    JsonSchema::record("UserCreated", [("name", JsonSchema::String)])
}

fn updated_v0() -> JsonSchema {
    JsonSchema::record("UserUpdated", [("name", JsonSchema::String)])
}

fn updated_v1() -> JsonSchema {
    JsonSchema::record(
        "UserUpdated",
        [
            ("name", JsonSchema::String),
            ("email", JsonSchema::Optional(Box::new(JsonSchema::String))),
        ],
    )
}

#[test]
fn test_empty_store_has_empty_schema() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.view(|txn| {
        assert_eq!(registry.schema_vsn(txn)?, 0);
        let schema = registry.fold_schema(txn, |_| false)?;
        assert_eq!(schema.vsn, 0);
        assert!(schema.entities.is_empty());
        assert!(!item::exists(txn, &schema_item())?);
        Ok(())
    })
    .unwrap();

    let missing = db.view(|txn| registry.get_entity_type(txn, "User", 0));
    assert!(matches!(missing, Err(EventideError::EntityTypeNotFound(_))));
}

#[test]
fn test_ensure_schema_is_idempotent() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.ensure_schema(txn)?;
        registry.ensure_schema(txn)
    })
    .unwrap();

    let version = db.view(|txn| item::latest_version(txn, &schema_item())).unwrap();
    assert_eq!(version, 1);
}

#[test]
fn test_create_entity_and_event_type() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        assert_eq!(registry.create_entity_type(txn, "User")?, 1);
        assert_eq!(
            registry.create_event_type(txn, "User", "Created", &created_schema())?,
            2
        );
        Ok(())
    })
    .unwrap();

    db.view(|txn| {
        let vsn = registry.schema_vsn(txn)?;
        assert_eq!(vsn, 2);

        let user = registry.get_entity_type(txn, "User", vsn)?;
        assert_eq!(user.name, "User");
        assert_eq!(user.vsn, 1);
        assert_eq!(
            user.events.get(&EventTypeKey::new("Created", 0)),
            Some(&created_schema())
        );
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_update_event_type_keeps_old_revision() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    let new_vsn = db
        .update(|txn| {
            registry.create_entity_type(txn, "User")?;
            registry.create_event_type(txn, "User", "Updated", &updated_v0())?;
            registry.update_event_type(txn, "User", "Updated", &updated_v1())
        })
        .unwrap();
    assert_eq!(new_vsn, 1);

    db.view(|txn| {
        let user = registry.get_entity_type(txn, "User", u64::MAX)?;
        assert_eq!(user.get("Updated", 0), Some(&updated_v0()));
        assert_eq!(user.get("Updated", 1), Some(&updated_v1()));
        assert_eq!(
            user.latest("Updated").map(|(key, _)| key.vsn),
            Some(1)
        );

        assert_eq!(registry.get_event_type(txn, "User", "Updated", 0)?, updated_v0());
        assert_eq!(registry.get_event_type(txn, "User", "Updated", 1)?, updated_v1());
        Ok(())
    })
    .unwrap();

    let missing = db.view(|txn| registry.get_event_type(txn, "User", "Updated", 2));
    assert!(matches!(
        missing,
        Err(EventideError::EventVersionNotFound { vsn: 2, .. })
    ));
}

#[test]
fn test_payload_written_under_old_revision_stays_decodable() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        registry.create_event_type(txn, "User", "Updated", &updated_v0())?;
        Ok(())
    })
    .unwrap();

    let payload = updated_v0()
        .encode(&Value::Record(BTreeMap::from([(
            "name".to_string(),
            Value::from("alice"),
        )])))
        .unwrap();

    db.update(|txn| registry.update_event_type(txn, "User", "Updated", &updated_v1()))
        .unwrap();

    let schema = db
        .view(|txn| registry.get_event_type(txn, "User", "Updated", 0))
        .unwrap();
    let value = schema.decode(&payload).unwrap();
    assert!(schema.valid(&value));
}

#[test]
fn test_mutation_preconditions() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        registry.create_event_type(txn, "User", "Created", &created_schema())?;
        Ok(())
    })
    .unwrap();

    let result = db.update(|txn| registry.create_entity_type(txn, "User"));
    assert!(matches!(result, Err(EventideError::EntityExists(_))));

    let result = db.update(|txn| registry.delete_entity_type(txn, "Order"));
    assert!(matches!(result, Err(EventideError::EntityTypeNotFound(_))));

    let result = db.update(|txn| registry.create_event_type(txn, "Order", "Placed", &JsonSchema::Int));
    assert!(matches!(result, Err(EventideError::EntityTypeNotFound(_))));

    let result =
        db.update(|txn| registry.create_event_type(txn, "User", "Created", &created_schema()));
    assert!(matches!(result, Err(EventideError::EventTypeExists { .. })));

    let result = db.update(|txn| registry.update_event_type(txn, "User", "Renamed", &JsonSchema::String));
    assert!(matches!(result, Err(EventideError::EventTypeNotFound { .. })));

    let result = db.update(|txn| registry.delete_event_type(txn, "User", "Renamed"));
    assert!(matches!(result, Err(EventideError::EventTypeNotFound { .. })));

    // Failed mutations appended nothing
    assert_eq!(db.view(|txn| registry.schema_vsn(txn)).unwrap(), 2);
}

#[test]
fn test_delete_types() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        registry.create_event_type(txn, "User", "Created", &created_schema())?;
        registry.create_event_type(txn, "User", "Updated", &updated_v0())?;
        registry.delete_event_type(txn, "User", "Updated")?;
        Ok(())
    })
    .unwrap();

    db.view(|txn| {
        let user = registry.get_entity_type(txn, "User", u64::MAX)?;
        assert!(user.has_event("Created"));
        assert!(!user.has_event("Updated"));
        assert_eq!(user.vsn, 3);

        // The deleted revision is still reachable at the version it existed
        assert_eq!(registry.get_event_type(txn, "User", "Updated", 0)?, updated_v0());
        Ok(())
    })
    .unwrap();

    db.update(|txn| registry.delete_entity_type(txn, "User")).unwrap();

    db.view(|txn| {
        assert!(registry.fold_schema(txn, |_| false)?.entities.is_empty());
        // History is intact
        assert!(registry.get_schema(txn, 4)?.entity("User").is_some());
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_get_schema_bounds_are_inclusive() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        registry.create_entity_type(txn, "Order")?;
        registry.create_event_type(txn, "Order", "Placed", &JsonSchema::Int)?;
        Ok(())
    })
    .unwrap();

    db.view(|txn| {
        let v0 = registry.get_schema(txn, 0)?;
        assert_eq!(v0.vsn, 0);
        assert!(v0.entities.is_empty());

        let v1 = registry.get_schema(txn, 1)?;
        assert_eq!(v1.vsn, 1);
        assert_eq!(v1.entities.keys().collect::<Vec<_>>(), vec!["User"]);

        let v2 = registry.get_schema(txn, 2)?;
        assert_eq!(v2.vsn, 2);
        assert!(v2.entity("Order").unwrap().events.is_empty());

        let latest = registry.get_schema(txn, 100)?;
        assert_eq!(latest.vsn, 3);

        // Entity bound: Order reached vsn 0 at creation
        let order = registry.get_entity_type(txn, "Order", 0)?;
        assert!(order.events.is_empty());
        let order = registry.get_entity_type(txn, "Order", 1)?;
        assert_eq!(order.events.len(), 1);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_schema_vsn_matches_full_fold() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        registry.create_event_type(txn, "User", "Created", &created_schema())?;
        registry.create_event_type(txn, "User", "Updated", &updated_v0())?;
        registry.update_event_type(txn, "User", "Updated", &updated_v1())?;
        registry.create_entity_type(txn, "Order")?;
        registry.delete_entity_type(txn, "Order")?;
        Ok(())
    })
    .unwrap();

    db.view(|txn| {
        let folded = registry.fold_schema(txn, |_| false)?;
        assert_eq!(registry.schema_vsn(txn)?, folded.vsn);
        assert_eq!(folded.vsn, 6);
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_aborted_mutation_leaves_no_trace() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    let result: Result<()> = db.update(|txn| {
        registry.create_entity_type(txn, "User")?;
        Err(EventideError::InvalidState("rollback".into()))
    });
    assert!(result.is_err());

    db.view(|txn| {
        assert!(!item::exists(txn, &schema_item())?);
        assert!(registry.fold_schema(txn, |_| false)?.entities.is_empty());
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_schema_item_rejects_direct_writes() {
    let (db, _temp) = create_test_db();
    let registry = registry();

    db.update(|txn| registry.create_entity_type(txn, "User").map(|_| ()))
        .unwrap();

    let put = db.update(|txn| item::put(txn, &schema_item(), &Event::entity("type.test", "1")));
    assert!(matches!(put, Err(EventideError::ReservedItem(_))));

    let alias = ItemId::new(item_type::ENTITY, "schema-alias");
    let aliased = db.update(|txn| item::alias(txn, &schema_item(), &alias));
    assert!(matches!(aliased, Err(EventideError::ReservedItem(_))));

    let deleted = db.update(|txn| item::delete(txn, &schema_item()));
    assert!(matches!(deleted, Err(EventideError::ReservedItem(_))));

    db.view(|txn| {
        assert!(item::exists(txn, &schema_item())?);
        assert_eq!(registry.schema_vsn(txn)?, 1);
        assert_eq!(registry.fold_schema(txn, |_| false)?.vsn, 1);
        Ok(())
    })
    .unwrap();
}
