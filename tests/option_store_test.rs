// Integration tests for the file-backed option store
// Run with: cargo test --test option_store_test

use sentry_pushover::{FileOptionStore, OptionStore, Project, PushoverSettings};
use tempfile::TempDir;

#[test]
fn test_missing_file_opens_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileOptionStore::open(dir.path().join("projects.json")).unwrap();
    let project = Project::new(1, "myapp");

    assert!(!PushoverSettings::load(&store, &project).is_setup());
}

#[test]
fn test_settings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("projects.json");
    let project = Project::new(1, "myapp");

    let mut store = FileOptionStore::open(&path).unwrap();
    PushoverSettings {
        user_key: Some("ukey".to_string()),
        api_key: Some("atoken".to_string()),
        severity: Some("CRITICAL".to_string()),
        priority: true,
    }
    .store(&mut store, &project);
    store.save().unwrap();

    let reopened = FileOptionStore::open(&path).unwrap();
    let settings = PushoverSettings::load(&reopened, &project);
    assert!(settings.is_setup());
    assert_eq!(settings.threshold(), 50);
    assert_eq!(settings.priority_flag(), 1);
    assert_eq!(reopened.get_string(&project, "severity"), Some("50".to_string()));
}

#[test]
fn test_reads_host_written_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(
        &path,
        r#"{
            "myapp": {"userkey": "ukey", "apikey": "atoken", "severity": "30", "priority": "1"},
            "other": {"userkey": "ukey"}
        }"#,
    )
    .unwrap();

    let store = FileOptionStore::open(&path).unwrap();

    let myapp = PushoverSettings::load(&store, &Project::new(1, "myapp"));
    assert!(myapp.is_setup());
    assert_eq!(myapp.threshold(), 30);
    assert!(myapp.priority);

    let other = PushoverSettings::load(&store, &Project::new(2, "other"));
    assert!(!other.is_setup());
}

#[cfg(unix)]
#[test]
fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    let mut store = FileOptionStore::open(&path).unwrap();
    store.set(&Project::new(1, "myapp"), "userkey", "ukey".into());
    store.save().unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_invalid_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    assert!(FileOptionStore::open(&path).is_err());
}
