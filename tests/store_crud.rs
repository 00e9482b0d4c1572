use anyhow::Result;
use microsite::{Fields, Store, StoreError, Value};
use tempfile::NamedTempFile;

// Helper function to create an in-memory store for testing
fn create_test_store() -> Result<Store> {
    let store = Store::open_in_memory()?;
    initialize_schema(&store)?;
    Ok(store)
}

// Helper function to create a temporary file-based store
fn create_temp_store() -> Result<(Store, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let store = Store::open(temp_file.path())?;
    initialize_schema(&store)?;
    Ok((store, temp_file))
}

// Create the page table and seed the three fixture rows
fn initialize_schema(store: &Store) -> Result<()> {
    store.execute(
        "CREATE TABLE page (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT
        )",
    )?;
    for n in 1..=3 {
        store.create(
            "page",
            &Fields::new()
                .with_value("title", format!("Page {n}"))
                .with_value("content", format!("Content {n}")),
        )?;
    }
    Ok(())
}

#[test]
fn test_create_then_read_round_trips_fields() -> Result<()> {
    let store = create_test_store()?;

    let fields = Fields::new()
        .with_value("title", "Test Page")
        .with_value("content", "Test Content");
    let id = store.create("page", &fields)?;
    assert!(id > 0, "Expected a positive row id, got {id}");

    let record = store.read("page", id)?.expect("created row should exist");
    assert_eq!(record.get("title"), Some(&Value::Text("Test Page".into())));
    assert_eq!(
        record.get("content"),
        Some(&Value::Text("Test Content".into()))
    );
    assert_eq!(record.get("id"), Some(&Value::Integer(id)));
    Ok(())
}

#[test]
fn test_create_rejects_empty_fields() -> Result<()> {
    let store = create_test_store()?;

    let err = store.create("page", &Fields::new()).unwrap_err();
    assert!(
        matches!(err, StoreError::EmptyFields { .. }),
        "Expected EmptyFields, got {err:?}"
    );
    // Nothing was inserted
    assert_eq!(store.count("page")?, 3);
    Ok(())
}

#[test]
fn test_update_rejects_empty_fields() -> Result<()> {
    let store = create_test_store()?;

    let err = store.update("page", 1, &Fields::new()).unwrap_err();
    assert!(
        matches!(err, StoreError::EmptyFields { .. }),
        "Expected EmptyFields, got {err:?}"
    );
    Ok(())
}

#[test]
fn test_count_reflects_deletes() -> Result<()> {
    let store = create_test_store()?;

    assert_eq!(store.count("page")?, 3);
    store.delete("page", 3)?;
    assert_eq!(store.count("page")?, 2);
    Ok(())
}

#[test]
fn test_update_then_read_shows_new_value() -> Result<()> {
    let store = create_test_store()?;

    let affected = store.update(
        "page",
        2,
        &Fields::new().with_value("content", "Rewritten"),
    )?;
    assert_eq!(affected, 1);

    let record = store.read("page", 2)?.expect("row 2 should exist");
    assert_eq!(record.get("content").and_then(Value::as_str), Some("Rewritten"));
    // Untouched columns keep their values
    assert_eq!(record.get("title").and_then(Value::as_str), Some("Page 2"));
    Ok(())
}

#[test]
fn test_update_missing_row_is_zero_affected_not_an_error() -> Result<()> {
    let store = create_test_store()?;

    let affected = store.update("page", 999, &Fields::new().with_value("title", "Ghost"))?;
    assert_eq!(affected, 0, "No row matched, but the statement is well-formed");
    Ok(())
}

#[test]
fn test_read_missing_row_is_none() -> Result<()> {
    let store = create_test_store()?;
    assert!(store.read("page", 999)?.is_none());
    Ok(())
}

#[test]
fn test_fetch_returns_first_row_or_none() -> Result<()> {
    let store = create_test_store()?;

    let record = store
        .fetch("SELECT title FROM page ORDER BY id")?
        .expect("seeded table should have rows");
    assert_eq!(record.get("title").and_then(Value::as_str), Some("Page 1"));
    assert_eq!(record.len(), 1);

    assert!(store.fetch("SELECT * FROM page WHERE id = 999")?.is_none());
    Ok(())
}

#[test]
fn test_execute_returns_affected_rows() -> Result<()> {
    let store = create_test_store()?;

    let affected = store.execute("UPDATE page SET content = 'wiped'")?;
    assert_eq!(affected, 3);
    Ok(())
}

#[test]
fn test_count_on_missing_table_is_an_error() -> Result<()> {
    let store = create_test_store()?;

    let err = store.count("missing").unwrap_err();
    assert!(
        matches!(err, StoreError::Statement { .. }),
        "A failed count must not be conflated with an empty table, got {err:?}"
    );
    Ok(())
}

#[test]
fn test_invalid_identifiers_are_rejected_before_sql() -> Result<()> {
    let store = create_test_store()?;

    let hostile = "page; DROP TABLE page";
    assert!(matches!(
        store.count(hostile),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.read(hostile, 1),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.delete(hostile, 1),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.create(hostile, &Fields::new().with_value("title", "x")),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    // Column names are interpolated too, so they get the same check
    assert!(matches!(
        store.create("page", &Fields::new().with_value("title = 'x' --", "x")),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.count(""),
        Err(StoreError::InvalidIdentifier { .. })
    ));
    assert!(matches!(
        store.count("1page"),
        Err(StoreError::InvalidIdentifier { .. })
    ));

    // The table survived every attempt
    assert_eq!(store.count("page")?, 3);
    Ok(())
}

#[test]
fn test_value_round_trip_across_types() -> Result<()> {
    let store = create_test_store()?;
    store.execute(
        "CREATE TABLE samples (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            n INTEGER,
            x REAL,
            s TEXT,
            b BLOB,
            flag INTEGER
        )",
    )?;

    let id = store.create(
        "samples",
        &Fields::new()
            .with_value("n", 42)
            .with_value("x", 2.5)
            .with_value("s", "hello")
            .with_value("b", vec![1u8, 2, 3])
            .with_value("flag", true),
    )?;

    let record = store.read("samples", id)?.expect("row should exist");
    assert_eq!(record.get("n"), Some(&Value::Integer(42)));
    assert_eq!(record.get("x"), Some(&Value::Real(2.5)));
    assert_eq!(record.get("s"), Some(&Value::Text("hello".into())));
    assert_eq!(record.get("b"), Some(&Value::Blob(vec![1, 2, 3])));
    // Booleans are stored as integers
    assert_eq!(record.get("flag").and_then(Value::as_bool), Some(true));
    Ok(())
}

// The full scenario from the original site fixture, against a file-backed
// database rather than an in-memory one.
#[test]
fn test_page_table_scenario_on_disk() -> Result<()> {
    let (store, _temp_file) = create_temp_store()?;

    assert_eq!(store.count("page")?, 3);

    let affected = store.update("page", 1, &Fields::new().with_value("title", "Updated Page"))?;
    assert_eq!(affected, 1);

    let record = store.read("page", 1)?.expect("row 1 should exist");
    assert_eq!(
        record.get("title").and_then(Value::as_str),
        Some("Updated Page")
    );

    assert!(store.delete("page", 3).is_ok());
    assert_eq!(store.count("page")?, 2);
    Ok(())
}

#[test]
fn test_open_failure_is_reported_not_fatal() {
    let err = Store::open("/no/such/dir/site.db").map(|_| ()).unwrap_err();
    assert!(
        matches!(err, StoreError::Open { .. }),
        "Expected Open, got {err:?}"
    );
}
