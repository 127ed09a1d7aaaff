use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::binding::TableBinding;
use crate::cursor::FetchSize;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PrefStoreConfig {
    pub database: Option<String>,
    pub table: Option<String>,
    pub user_column: Option<String>,
    pub item_column: Option<String>,
    /// Rows buffered per fetch; 0 or absent means stream row-by-row.
    pub fetch_size: Option<usize>,
    pub busy_timeout_ms: Option<u64>,
}

impl PrefStoreConfig {
    /// Binding from configured names, defaulting any that are absent.
    pub fn table_binding(&self) -> crate::Result<TableBinding> {
        let defaults = TableBinding::default();
        TableBinding::new(
            self.table.as_deref().unwrap_or(defaults.table()),
            self.user_column.as_deref().unwrap_or(defaults.user_column()),
            self.item_column.as_deref().unwrap_or(defaults.item_column()),
        )
    }

    pub fn fetch_size(&self) -> FetchSize {
        match self.fetch_size {
            None | Some(0) => FetchSize::RowByRow,
            Some(n) => FetchSize::Rows(n),
        }
    }

    pub fn busy_timeout(&self) -> Option<Duration> {
        self.busy_timeout_ms.map(Duration::from_millis)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("prefstore.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".prefstore").join("prefstore.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PrefStoreConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PrefStoreConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PrefStoreConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = PrefStoreConfig::default();
        let binding = config.table_binding().unwrap();
        assert_eq!(binding.table(), "taste_preferences");
        assert_eq!(config.fetch_size(), FetchSize::RowByRow);
        assert!(config.busy_timeout().is_none());
    }

    #[test]
    fn test_fetch_size_mapping() {
        let mut config = PrefStoreConfig::default();
        config.fetch_size = Some(0);
        assert_eq!(config.fetch_size(), FetchSize::RowByRow);
        config.fetch_size = Some(256);
        assert_eq!(config.fetch_size(), FetchSize::Rows(256));
    }

    #[test]
    fn test_invalid_column_name_rejected() {
        let config = PrefStoreConfig {
            user_column: Some("user id".to_string()),
            ..Default::default()
        };
        assert!(config.table_binding().is_err());
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefstore.toml");
        let config = PrefStoreConfig {
            database: Some("prefs.db".to_string()),
            table: Some("likes".to_string()),
            fetch_size: Some(128),
            busy_timeout_ms: Some(500),
            ..Default::default()
        };

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.table.as_deref(), Some("likes"));
        assert_eq!(loaded.fetch_size, Some(128));
        assert_eq!(loaded.busy_timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefstore.toml");
        let config = PrefStoreConfig::default();
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = default_database_path_in(dir.path());
        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().exists());
    }
}
