use rusqlite::Connection;
use serde_json::json;
use tcodes::api::{CatalogApi, CatalogState};
use tcodes::error::{CatalogError, EntryError, ImportValidationError};
use tcodes::model::{EntryUpdate, NewEntry};
use tcodes::query::{Query, TagFilter};
use tcodes::reference::ReferenceCatalog;
use tcodes::settings::{Settings, SettingsStore};
use tcodes::store::memory::InMemoryStore;
use tcodes::store::schema::{self, V1_SCHEMA_SQL};
use tcodes::store::sqlite::SqliteStore;
use tcodes::store::{EntryStore, FavoriteStore, OverlayStore};
use tempfile::TempDir;

fn se11_reference() -> ReferenceCatalog {
    ReferenceCatalog::from_json_str(r#"[{"code": "SE11", "title": "ABAP Dictionary", "tags": ["ABAP"]}]"#)
        .unwrap()
}

fn open_api<S: OverlayStore>(store: S) -> CatalogApi<S> {
    let mut api = CatalogApi::new(
        se11_reference(),
        store,
        SettingsStore::in_memory(Settings::default()),
    );
    api.open().unwrap();
    api
}

fn codes<S: OverlayStore>(api: &CatalogApi<S>) -> Vec<String> {
    api.merged_catalog()
        .unwrap()
        .iter()
        .map(|e| e.code.clone())
        .collect()
}

#[test]
fn add_collision_counts_and_rejected_import() {
    let mut api = open_api(InMemoryStore::new());

    let err = api
        .add_entry(NewEntry::new("SE11", "Mine").with_tags(["CUSTOM"]))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Entry(EntryError::DuplicateCode(_))));

    api.add_entry(NewEntry::new("Z001", "My Tool").with_tags(["CUSTOM"]))
        .unwrap();
    assert_eq!(codes(&api), vec!["SE11", "Z001"]);

    let counts = api.tag_counts("").unwrap();
    assert_eq!(counts.get("ABAP"), 1);
    assert_eq!(counts.get("CUSTOM"), 1);
    assert_eq!(counts.all, 2);

    let err = api
        .import_snapshot(&json!({"customTransactions": [{"code": "Z1"}]}))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Import(_)));
    assert_eq!(codes(&api), vec!["SE11", "Z001"]);
}

#[test]
fn add_update_delete_sequence_has_net_effect() {
    let mut api = open_api(InMemoryStore::new());

    api.add_entry(NewEntry::new("Z1", "one")).unwrap();
    api.add_entry(NewEntry::new("Z2", "two")).unwrap();
    api.add_entry(NewEntry::new("Z3", "three")).unwrap();
    api.update_entry("Z2", EntryUpdate::new("two v2", "").with_tags(["FI"]))
        .unwrap();
    api.delete_entry("Z1").unwrap();
    api.delete_entry("Z1").unwrap();

    let merged = api.merged_catalog().unwrap();
    assert_eq!(codes(&api), vec!["SE11", "Z2", "Z3"]);
    let z2 = merged.iter().find(|e| e.code == "Z2").unwrap();
    assert_eq!(z2.title, "two v2");
    assert!(z2.has_tag("FI"));
}

#[test]
fn favorite_cascade_on_delete() {
    let mut api = open_api(InMemoryStore::new());
    api.add_entry(NewEntry::new("Z001", "My Tool")).unwrap();
    api.set_favorite("Z001", true).unwrap();
    api.set_favorite("SE11", true).unwrap();

    let listed = api.list(&Query::new()).unwrap().listed_entries;
    assert!(listed[0].favorite && listed[1].favorite);

    api.delete_entry("Z001").unwrap();
    assert_eq!(codes(&api), vec!["SE11"]);
    assert!(api.is_favorite("SE11").unwrap());
}

#[test]
fn tag_filter_and_search_compose() {
    let mut api = open_api(InMemoryStore::new());
    api.add_entry(NewEntry::new("ZDICT", "Dictionary helper").with_tags(["ABAP", "CUSTOM"]))
        .unwrap();

    let query = Query::new()
        .with_search("dictionary")
        .with_tag(TagFilter::Tag("ABAP".to_string()));
    let listed = api.list(&query).unwrap().listed_entries;
    assert_eq!(listed.len(), 2);

    // ZDICT carries two tags but the ALL bucket counts it once
    let counts = api.tag_counts("dictionary").unwrap();
    assert_eq!(counts.get("ABAP"), 2);
    assert_eq!(counts.get("CUSTOM"), 1);
    assert_eq!(counts.all, 2);
}

#[test]
fn sqlite_backed_catalog_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");

    {
        let mut api = open_api(SqliteStore::new(&db));
        api.add_entry(NewEntry::new("Z001", "My Tool")).unwrap();
        assert!(api.toggle_favorite("Z001").unwrap());
    }

    let api = open_api(SqliteStore::new(&db));
    assert_eq!(api.state(), CatalogState::Ready);
    assert_eq!(codes(&api), vec!["SE11", "Z001"]);
    assert!(api.is_favorite("Z001").unwrap());
}

fn build_v1_store(path: &std::path::Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(V1_SCHEMA_SQL).unwrap();
    conn.execute(
        "INSERT INTO transactions (tcode, description, favorite) VALUES ('ZABC', 'legacy', 1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions (tcode, description, favorite) VALUES ('ZOLD', 'plain', 0)",
        [],
    )
    .unwrap();
}

#[test]
fn v1_store_is_migrated_on_first_open() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");
    build_v1_store(&db);

    let mut store = SqliteStore::new(&db);
    store.open().unwrap();

    let mut entries = store.list_entries().unwrap();
    entries.sort_by(|a, b| a.code.cmp(&b.code));
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].code, "ZABC");
    assert_eq!(entries[0].title, "");
    assert_eq!(entries[0].description, "legacy");
    assert_eq!(
        entries[0].tags.iter().cloned().collect::<Vec<_>>(),
        vec!["CUSTOM".to_string()]
    );

    let favorites = store.list_favorites().unwrap();
    assert_eq!(favorites.into_iter().collect::<Vec<_>>(), vec!["ZABC".to_string()]);
}

#[test]
fn migration_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");
    build_v1_store(&db);

    let snapshot = |conn: &Connection| -> (Vec<(String, String, String)>, Vec<String>) {
        let mut stmt = conn
            .prepare("SELECT code, title, tags FROM entries ORDER BY code")
            .unwrap();
        let entries: Vec<(String, String, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        let mut stmt = conn.prepare("SELECT code FROM favorites ORDER BY code").unwrap();
        let favorites: Vec<String> = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        (entries, favorites)
    };

    let mut conn = Connection::open(&db).unwrap();
    schema::prepare(&mut conn).unwrap();
    let once = snapshot(&conn);

    // Re-running the step on a migrated store changes nothing
    schema::migrate_v1_to_v2(&conn).unwrap();
    schema::prepare(&mut conn).unwrap();
    assert_eq!(snapshot(&conn), once);
    assert_eq!(schema::get_schema_version(&conn).unwrap(), schema::CURRENT_VERSION);
}

#[test]
fn migrated_custom_entry_cannot_be_shadowed_by_new_add() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");
    build_v1_store(&db);

    let mut api = open_api(SqliteStore::new(&db));
    assert!(api.is_favorite("ZABC").unwrap());
    let err = api.add_entry(NewEntry::new("ZABC", "again")).unwrap_err();
    assert!(matches!(err, CatalogError::Entry(EntryError::DuplicateCode(_))));
}

#[test]
fn import_rejects_reference_collision_without_writing() {
    let dir = TempDir::new().unwrap();
    let mut api = open_api(SqliteStore::new(dir.path().join("catalog.db")));
    api.add_entry(NewEntry::new("Z001", "My Tool")).unwrap();

    let err = api
        .import_snapshot_str(
            r#"{"customTransactions": [
                {"code": "ZNEW", "title": "", "description": ""},
                {"code": "SE11", "title": "", "description": ""}
            ]}"#,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Import(ImportValidationError::ReferenceCollision(_))
    ));
    assert_eq!(codes(&api), vec!["SE11", "Z001"]);
}

#[test]
fn reset_keeps_settings() {
    let mut api = open_api(InMemoryStore::new());
    api.add_entry(NewEntry::new("Z001", "My Tool")).unwrap();
    api.set_favorite("SE11", true).unwrap();
    api.set_setting("theme", "Dark").unwrap();

    api.reset_to_factory_defaults().unwrap();

    assert_eq!(codes(&api), vec!["SE11"]);
    assert!(!api.is_favorite("SE11").unwrap());
    assert_eq!(api.settings().theme.to_string(), "Dark");
}

#[test]
fn import_with_unwritable_settings_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("catalog.db");
    let settings_path = dir.path().join("settings.json");

    let mut api = CatalogApi::new(
        se11_reference(),
        SqliteStore::new(&db),
        SettingsStore::load(&settings_path).unwrap(),
    );
    api.open().unwrap();
    api.add_entry(NewEntry::new("Z001", "My Tool")).unwrap();
    std::fs::create_dir(&settings_path).unwrap();

    let err = api
        .import_snapshot(&json!({
            "settings": {"copyOption": "Just copy T-Code", "theme": "Dark", "visibleGroups": ["FI"]},
            "customTransactions": [{"code": "ZNEW", "title": "", "description": ""}]
        }))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
    assert_eq!(codes(&api), vec!["SE11", "Z001"]);
    drop(api);

    let mut store = SqliteStore::new(&db);
    store.open().unwrap();
    let stored: Vec<String> = store.list_entries().unwrap().into_iter().map(|e| e.code).collect();
    assert_eq!(stored, vec!["Z001"]);
}
