use chrono::{NaiveDate, NaiveTime};
use growmon_core::db::migrations::latest_version;
use growmon_core::db::open_db_in_memory;
use growmon_core::repo::profile_repo::{ProfileRepoError, SqliteProfileRepository};
use growmon_core::{PhotoRef, ProfileRepository, ProfileService, UserProfile};
use rusqlite::Connection;

#[test]
fn load_on_empty_database_returns_defaults() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    let profile = repo.load_profile().unwrap();
    assert_eq!(profile, UserProfile::default());
    assert_eq!(
        profile.notification_time,
        NaiveTime::from_hms_opt(20, 0, 0).unwrap()
    );
    assert!(profile.start_date.is_none());
}

#[test]
fn save_and_load_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    let profile = full_profile();
    repo.save_profile(&profile).unwrap();

    let loaded = repo.load_profile().unwrap();
    assert_eq!(loaded, profile);
    assert!(loaded.avatar.unwrap().is_inline());
}

#[test]
fn second_save_replaces_single_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.save_profile(&full_profile()).unwrap();

    let mut updated = full_profile();
    updated.plant_name = "Sprouty II".to_string();
    updated.notification_enabled = false;
    repo.save_profile(&updated).unwrap();

    let row_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM user_profile;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(row_count, 1);

    let loaded = repo.load_profile().unwrap();
    assert_eq!(loaded.plant_name, "Sprouty II");
    assert!(!loaded.notification_enabled);
}

#[test]
fn set_start_date_materializes_defaults_when_no_row_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    repo.set_start_date(Some(date("2026-03-01"))).unwrap();

    let loaded = repo.load_profile().unwrap();
    assert_eq!(loaded.start_date, Some(date("2026-03-01")));
    assert!(loaded.name.is_empty());

    repo.set_start_date(None).unwrap();
    assert!(repo.load_profile().unwrap().start_date.is_none());
}

#[test]
fn validation_failure_blocks_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();

    let mut profile = full_profile();
    profile.avatar = Some(PhotoRef::from("data:image/png;base64,"));

    let err = repo.save_profile(&profile).unwrap_err();
    assert!(matches!(err, ProfileRepoError::Validation(_)));
}

#[test]
fn malformed_persisted_time_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_profile (id, notification_time) VALUES (1, 'late evening');",
        [],
    )
    .unwrap();

    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let err = repo.load_profile().unwrap_err();
    assert!(matches!(err, ProfileRepoError::InvalidData(_)));
}

#[test]
fn out_of_range_notification_flag_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO user_profile (id, notification_enabled) VALUES (1, 2);",
        [],
    )
    .unwrap();

    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let err = repo.load_profile().unwrap_err();
    assert!(matches!(err, ProfileRepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteProfileRepository::try_new(&conn);
    match result {
        Err(ProfileRepoError::UninitializedConnection {
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

    let result = SqliteProfileRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(ProfileRepoError::MissingRequiredTable("user_profile"))
    ));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteProfileRepository::try_new(&conn).unwrap();
    let service = ProfileService::new(repo);

    assert_eq!(service.profile().unwrap(), UserProfile::default());

    service.save_profile(&full_profile()).unwrap();
    service.set_start_date(Some(date("2026-08-18"))).unwrap();

    assert_eq!(
        service.profile().unwrap().start_date,
        Some(date("2026-08-18"))
    );
    assert_eq!(service.days_since_start(date("2026-08-24")).unwrap(), 7);
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn full_profile() -> UserProfile {
    UserProfile {
        name: "Mina".to_string(),
        avatar: Some(PhotoRef::from("data:image/png;base64,QUJD")),
        grade: Some("4th grade".to_string()),
        plant_name: "Sprouty".to_string(),
        plant_type: "Cherry tomato".to_string(),
        start_date: Some(date("2026-03-01")),
        notification_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        notification_enabled: true,
    }
}
