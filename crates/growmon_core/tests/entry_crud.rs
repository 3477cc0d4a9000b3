use chrono::NaiveDate;
use growmon_core::db::migrations::latest_version;
use growmon_core::db::open_db_in_memory;
use growmon_core::{
    DiaryEntry, EntryContent, EntryRepository, PhotoRef, RepoError, SqliteEntryRepository,
};
use rusqlite::Connection;

#[test]
fn save_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let mut content = EntryContent::new("two new leaves this morning");
    content.weather = Some("sunny".to_string());
    content.temperature = Some("23C".to_string());
    let entry = DiaryEntry::with_created_at(
        date("2026-03-05"),
        PhotoRef::from("https://objects.example/photos/p1.jpg"),
        content,
        1_000,
    );
    repo.save_entry(&entry).unwrap();

    let loaded = repo.get_entry(date("2026-03-05")).unwrap().unwrap();
    assert_eq!(loaded, entry);
    assert!(!loaded.photo.is_inline());
}

#[test]
fn save_same_date_overwrites_without_growing_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2026-03-05", "first version", 1_000))
        .unwrap();
    repo.save_entry(&entry("2026-03-05", "second version", 2_000))
        .unwrap();

    assert_eq!(repo.entry_count().unwrap(), 1);
    let loaded = repo.get_entry(date("2026-03-05")).unwrap().unwrap();
    assert_eq!(loaded.content.observation, "second version");
    assert_eq!(loaded.created_at, 2_000);
}

#[test]
fn get_absent_entry_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    assert!(repo.get_entry(date("2026-03-05")).unwrap().is_none());
}

#[test]
fn delete_entry_removes_row_and_absent_date_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2026-03-05", "to be removed", 1_000))
        .unwrap();
    repo.delete_entry(date("2026-03-05")).unwrap();
    assert!(repo.get_entry(date("2026-03-05")).unwrap().is_none());

    let err = repo.delete_entry(date("2026-03-05")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == date("2026-03-05")));
}

#[test]
fn list_entries_returns_date_keyed_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2026-03-07", "third", 3_000)).unwrap();
    repo.save_entry(&entry("2026-03-05", "first", 1_000)).unwrap();
    repo.save_entry(&entry("2026-03-06", "second", 2_000)).unwrap();

    let entries = repo.list_entries().unwrap();
    assert_eq!(entries.len(), 3);

    let dates: Vec<NaiveDate> = entries.dates().collect();
    assert_eq!(
        dates,
        vec![date("2026-03-05"), date("2026-03-06"), date("2026-03-07")]
    );
    assert_eq!(
        entries.get(date("2026-03-06")).unwrap().content.observation,
        "second"
    );
}

#[test]
fn entries_for_month_respects_year_boundary() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2025-12-31", "december", 1_000))
        .unwrap();
    repo.save_entry(&entry("2026-01-01", "january first", 2_000))
        .unwrap();
    repo.save_entry(&entry("2026-01-15", "january second", 3_000))
        .unwrap();

    let january = repo.entries_for_month(2026, 1).unwrap();
    assert_eq!(january.len(), 2);
    assert_eq!(january[0].date, date("2026-01-01"));
    assert_eq!(january[1].date, date("2026-01-15"));

    let december = repo.entries_for_month(2025, 12).unwrap();
    assert_eq!(december.len(), 1);
    assert_eq!(december[0].date, date("2025-12-31"));
}

#[test]
fn list_recent_first_orders_by_created_at_then_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2026-03-05", "oldest save", 1_000))
        .unwrap();
    repo.save_entry(&entry("2026-03-06", "newest save", 3_000))
        .unwrap();
    // Same stamp as the next one; the later date must win the tiebreak.
    repo.save_entry(&entry("2026-03-07", "tie late date", 2_000))
        .unwrap();
    repo.save_entry(&entry("2026-03-04", "tie early date", 2_000))
        .unwrap();

    let timeline = repo.list_recent_first(None).unwrap();
    let dates: Vec<NaiveDate> = timeline.iter().map(|item| item.date).collect();
    assert_eq!(
        dates,
        vec![
            date("2026-03-06"),
            date("2026-03-07"),
            date("2026-03-04"),
            date("2026-03-05")
        ]
    );

    let limited = repo.list_recent_first(Some(2)).unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].date, date("2026-03-06"));
}

#[test]
fn clear_entries_reports_removed_count() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.save_entry(&entry("2026-03-05", "one", 1_000)).unwrap();
    repo.save_entry(&entry("2026-03-06", "two", 2_000)).unwrap();

    assert_eq!(repo.clear_entries().unwrap(), 2);
    assert_eq!(repo.entry_count().unwrap(), 0);
    assert_eq!(repo.clear_entries().unwrap(), 0);
}

#[test]
fn validation_failure_blocks_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let blank = entry("2026-03-05", "   ", 1_000);
    let err = repo.save_entry(&blank).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let bad_photo = DiaryEntry::with_created_at(
        date("2026-03-05"),
        PhotoRef::from("data:image/png;base64,"),
        EntryContent::new("fine text"),
        1_000,
    );
    let err = repo.save_entry(&bad_photo).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(repo.entry_count().unwrap(), 0);
}

#[test]
fn malformed_persisted_date_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO diary_entries (date, photo, observation, created_at)
         VALUES ('not-a-date', 'p.jpg', 'text', 1);",
        [],
    )
    .unwrap();

    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let err = repo.list_entries().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn blank_persisted_observation_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO diary_entries (date, photo, observation, created_at)
         VALUES ('2026-03-05', 'p.jpg', '   ', 1);",
        [],
    )
    .unwrap();

    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let err = repo.get_entry(date("2026-03-05")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteEntryRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEntryRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("diary_entries"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE diary_entries (
            date TEXT PRIMARY KEY NOT NULL,
            photo TEXT NOT NULL,
            observation TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteEntryRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "diary_entries",
            column: "weather"
        })
    ));
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn entry(date_text: &str, observation: &str, created_at: i64) -> DiaryEntry {
    DiaryEntry::with_created_at(
        date(date_text),
        PhotoRef::from("https://objects.example/photos/p.jpg"),
        EntryContent::new(observation),
        created_at,
    )
}
