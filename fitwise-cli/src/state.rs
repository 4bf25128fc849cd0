use anyhow::{Context, Result};
use fitwise_core::StoreSnapshot;
use std::fs;
use std::path::{Path, PathBuf};

pub fn fitwise_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".fitwise"))
}

pub fn ensure_fitwise_home() -> Result<PathBuf> {
    let dir = fitwise_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_snapshot_path() -> Result<PathBuf> {
    Ok(ensure_fitwise_home()?.join("snapshot.json"))
}

/// A missing file is an empty store.
pub fn read_snapshot(path: &Path) -> Result<StoreSnapshot> {
    if !path.exists() {
        return Ok(StoreSnapshot::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Written to a sibling temp file first so a crash never leaves half a snapshot.
pub fn write_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fitwise_core::{Task, User};

    #[test]
    fn missing_snapshot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = read_snapshot(&dir.path().join("nope.json")).unwrap();
        assert!(snap.users.is_empty() && snap.tasks.is_empty());
    }

    #[test]
    fn snapshot_survives_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("snapshot.json");
        let created = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let snap = StoreSnapshot {
            users: vec![User::new(1, "ana")],
            tasks: vec![Task::new(5, "Write docs", created).assigned_to(1)],
            completions: Vec::new(),
        };

        write_snapshot(&path, &snap).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), snap);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = read_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
