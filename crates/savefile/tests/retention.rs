//! Retention behaviour of `SaveManager` against a real directory.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use savefile::{BincodeCodec, JsonCodec, SaveError, SaveManager, TieBreak};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("savefile=debug"))
        .with_test_writer()
        .try_init();
}

/// Clock starting at `start` that advances one second per call.
fn stepping_clock(start: NaiveDateTime) -> impl Fn() -> NaiveDateTime + Send + Sync {
    let tick = AtomicI64::new(0);
    move || start + TimeDelta::seconds(tick.fetch_add(1, Ordering::SeqCst))
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, d)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn valid_save_count(manager: &SaveManager<impl savefile::Codec>) -> usize {
    manager.list_saves().unwrap().len()
}

fn seed(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), b"seed").unwrap();
    }
}

#[test]
fn test_retention_bound_holds_after_every_save() {
    init_tracing();

    for limit in 1..=4 {
        let temp = TempDir::new().unwrap();
        let mut manager = SaveManager::with_limit(temp.path(), BincodeCodec, limit)
            .unwrap()
            .with_clock(stepping_clock(day(1)));

        for i in 1..=10usize {
            manager.save(&i).unwrap();
            assert_eq!(
                valid_save_count(&manager),
                i.min(limit),
                "limit {limit}, save {i}"
            );
        }

        assert_eq!(manager.load_latest::<usize>().unwrap(), 10);
    }
}

#[test]
fn test_eviction_removes_smallest_timestamp() {
    init_tracing();

    let temp = TempDir::new().unwrap();
    // Directory order and lexical order of the extensions deliberately disagree
    // with chronological order.
    seed(
        temp.path(),
        &[
            "save_20240605_093000.json",
            "save_20240601_093000.json",
            "save_20240603_093000.json",
        ],
    );

    let mut manager = SaveManager::with_limit(temp.path(), JsonCodec::new(), 3)
        .unwrap()
        .with_clock(stepping_clock(day(10)));

    manager.save("fresh").unwrap();

    assert!(!temp.path().join("save_20240601_093000.json").exists());
    let names: Vec<_> = manager
        .list_saves()
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "save_20240603_093000.json",
            "save_20240605_093000.json",
            "save_20240610_093000.json",
        ]
    );

    manager.save("fresher").unwrap();
    assert!(!temp.path().join("save_20240603_093000.json").exists());
    assert!(temp.path().join("save_20240605_093000.json").exists());
}

#[test]
fn test_foreign_files_survive_retention_pressure() {
    init_tracing();

    let temp = TempDir::new().unwrap();
    let foreign = [
        "notes.txt",
        "save_.bin",
        "save_garbage_garbage.bin",
        "save_20241301_000000.bin",
        "save_20240101_00000",
        ".save_20240101_000000.bin.tmp",
    ];
    seed(temp.path(), &foreign);
    fs::create_dir(temp.path().join("save_20200101_000000.bin")).unwrap();

    let mut manager = SaveManager::with_limit(temp.path(), JsonCodec::new(), 1)
        .unwrap()
        .with_clock(stepping_clock(day(2)));

    for i in 0..5u32 {
        manager.save(&i).unwrap();
    }

    for name in foreign {
        assert!(temp.path().join(name).exists(), "{name} was deleted");
    }
    assert!(temp.path().join("save_20200101_000000.bin").is_dir());

    let saves = manager.list_saves().unwrap();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].name(), "save_20240602_093004.json");
    assert_eq!(manager.load_latest::<u32>().unwrap(), 4);
}

#[test]
fn test_distinct_empty_state_errors() {
    let temp = TempDir::new().unwrap();
    let manager = SaveManager::new(temp.path(), JsonCodec::new()).unwrap();

    let empty = manager.load_latest::<String>().unwrap_err();
    assert!(matches!(empty, SaveError::NoSaveFiles));
    assert_eq!(empty.to_string(), "no save files found");

    seed(temp.path(), &["readme.md", "save_not_a_timestamp.json"]);
    let invalid = manager.load_latest::<String>().unwrap_err();
    assert!(matches!(invalid, SaveError::NoValidSaveFiles));
    assert_eq!(invalid.to_string(), "no valid save files found");
}

#[test]
fn test_only_directories_count_as_entries_but_not_saves() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("save_20240101_000000.json")).unwrap();
    let manager = SaveManager::new(temp.path(), JsonCodec::new()).unwrap();

    assert!(matches!(
        manager.load_latest::<String>(),
        Err(SaveError::NoValidSaveFiles)
    ));
}

#[test]
fn test_same_timestamp_tie_break() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("save_20240601_093000.bin"), b"\x01\0\0\0").unwrap();
    fs::write(temp.path().join("save_20240601_093000.json"), b"2\n").unwrap();

    let mut manager = SaveManager::new(temp.path(), JsonCodec::new())
        .unwrap()
        .with_tie_break(TieBreak::FileName);
    assert_eq!(
        manager.latest().unwrap().name(),
        "save_20240601_093000.json"
    );

    assert_eq!(manager.delete_old().unwrap(), 1);
    assert!(!temp.path().join("save_20240601_093000.bin").exists());
    assert_eq!(manager.load_latest::<u32>().unwrap(), 2);
}

#[test]
fn test_delete_old_on_limited_manager_leaves_room_for_one() {
    let temp = TempDir::new().unwrap();
    let mut manager = SaveManager::with_limit(temp.path(), JsonCodec::new(), 3)
        .unwrap()
        .with_clock(stepping_clock(day(4)));

    for i in 0..3u32 {
        manager.save(&i).unwrap();
    }
    assert_eq!(valid_save_count(&manager), 3);

    assert_eq!(manager.delete_old().unwrap(), 1);
    assert_eq!(valid_save_count(&manager), 2);
    assert_eq!(manager.load_latest::<u32>().unwrap(), 2);
}
