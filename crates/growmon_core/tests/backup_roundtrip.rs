use chrono::{Days, NaiveDate, NaiveTime};
use growmon_core::db::open_db_in_memory;
use growmon_core::service::backup_service::{BackupError, BACKUP_FORMAT_VERSION};
use growmon_core::{
    BackupService, DiaryEntry, EntryContent, EntryRepository, PhotoRef, ProfileRepository,
    SqliteBackupRepository, SqliteEntryRepository, SqliteProfileRepository, UserProfile,
};

#[test]
fn export_import_round_trips_profile_and_entries() {
    let mut source = open_db_in_memory().unwrap();
    {
        let entry_repo = SqliteEntryRepository::try_new(&source).unwrap();
        entry_repo.save_entry(&entry("2026-03-01", "sowed the seed")).unwrap();
        entry_repo.save_entry(&rainy_entry("2026-03-02")).unwrap();
        entry_repo.save_entry(&entry("2026-03-03", "first sprout")).unwrap();

        let profile_repo = SqliteProfileRepository::try_new(&source).unwrap();
        profile_repo.save_profile(&seeded_profile()).unwrap();
    }

    let json = {
        let service = BackupService::new(SqliteBackupRepository::try_new(&mut source).unwrap());
        service.export_json().unwrap()
    };

    let mut target = open_db_in_memory().unwrap();
    {
        let entry_repo = SqliteEntryRepository::try_new(&target).unwrap();
        entry_repo.save_entry(&entry("2026-05-05", "pre-existing")).unwrap();
    }

    let outcome = {
        let mut service = BackupService::new(SqliteBackupRepository::try_new(&mut target).unwrap());
        service.import_json(&json).unwrap()
    };
    assert_eq!(outcome.restored_entries, 3);

    let entries = SqliteEntryRepository::try_new(&target)
        .unwrap()
        .list_entries()
        .unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.get(date("2026-05-05")).is_none());
    assert_eq!(entries.get(date("2026-03-02")), Some(&rainy_entry("2026-03-02")));

    let profile = SqliteProfileRepository::try_new(&target)
        .unwrap()
        .load_profile()
        .unwrap();
    assert_eq!(profile, seeded_profile());
}

#[test]
fn bulk_import_reports_one_evolution_event() {
    let mut source = open_db_in_memory().unwrap();
    {
        let entry_repo = SqliteEntryRepository::try_new(&source).unwrap();
        let first = date("2026-01-01");
        for offset in 0..20 {
            let day = first.checked_add_days(Days::new(offset)).unwrap();
            entry_repo.save_entry(&entry_on(day, "steady growth")).unwrap();
        }
    }
    let json = {
        let service = BackupService::new(SqliteBackupRepository::try_new(&mut source).unwrap());
        service.export_json().unwrap()
    };

    let mut target = open_db_in_memory().unwrap();
    let mut service = BackupService::new(SqliteBackupRepository::try_new(&mut target).unwrap());
    let outcome = service.import_json(&json).unwrap();

    assert_eq!(outcome.restored_entries, 20);
    assert!(outcome.evolution.evolved);
    assert_eq!(outcome.evolution.previous_stage.level, 1);
    assert_eq!(outcome.evolution.new_stage.level, 3);
}

#[test]
fn unsupported_version_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let entry_repo = SqliteEntryRepository::try_new(&conn).unwrap();
        entry_repo.save_entry(&entry("2026-04-01", "survivor")).unwrap();
    }

    {
        let mut service = BackupService::new(SqliteBackupRepository::try_new(&mut conn).unwrap());
        let json = service.export_json().unwrap();
        let mut document: serde_json::Value = serde_json::from_str(&json).unwrap();
        document["format_version"] = 99.into();

        match service.import_json(&document.to_string()) {
            Err(BackupError::UnsupportedFormatVersion { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, BACKUP_FORMAT_VERSION);
            }
            other => panic!("expected version rejection, got {other:?}"),
        }
    }

    let entry_repo = SqliteEntryRepository::try_new(&conn).unwrap();
    assert_eq!(entry_repo.entry_count().unwrap(), 1);
    assert!(entry_repo.get_entry(date("2026-04-01")).unwrap().is_some());
}

#[test]
fn malformed_document_is_a_serialization_error() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BackupService::new(SqliteBackupRepository::try_new(&mut conn).unwrap());

    match service.import_json("{ not json") {
        Err(BackupError::Serialization(_)) => {}
        other => panic!("expected serialization error, got {other:?}"),
    }

    // A syntactically valid document without the version tag is just as dead.
    match service.import_json("{}") {
        Err(BackupError::Serialization(_)) => {}
        other => panic!("expected serialization error, got {other:?}"),
    }
}

#[test]
fn clear_all_wipes_entries_and_profile() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let entry_repo = SqliteEntryRepository::try_new(&conn).unwrap();
        entry_repo.save_entry(&entry("2026-03-01", "one")).unwrap();
        entry_repo.save_entry(&entry("2026-03-02", "two")).unwrap();

        let profile_repo = SqliteProfileRepository::try_new(&conn).unwrap();
        profile_repo.save_profile(&seeded_profile()).unwrap();
    }

    {
        let mut service = BackupService::new(SqliteBackupRepository::try_new(&mut conn).unwrap());
        assert_eq!(service.clear_all().unwrap(), 2);
        assert_eq!(service.clear_all().unwrap(), 0);
    }

    let entry_repo = SqliteEntryRepository::try_new(&conn).unwrap();
    assert_eq!(entry_repo.entry_count().unwrap(), 0);

    let profile = SqliteProfileRepository::try_new(&conn)
        .unwrap()
        .load_profile()
        .unwrap();
    assert_eq!(profile, UserProfile::default());
}

fn date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
}

fn entry(date_text: &str, observation: &str) -> DiaryEntry {
    entry_on(date(date_text), observation)
}

fn entry_on(day: NaiveDate, observation: &str) -> DiaryEntry {
    DiaryEntry::with_created_at(
        day,
        PhotoRef::from("https://objects.example/photos/p.jpg"),
        EntryContent::new(observation),
        1_770_000_000_000,
    )
}

fn rainy_entry(date_text: &str) -> DiaryEntry {
    DiaryEntry::with_created_at(
        date(date_text),
        PhotoRef::from("data:image/jpeg;base64,QUJDRA=="),
        EntryContent {
            observation: "drooping in the rain".to_string(),
            weather: Some("rainy".to_string()),
            temperature: Some("14C".to_string()),
        },
        1_770_000_000_001,
    )
}

fn seeded_profile() -> UserProfile {
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
