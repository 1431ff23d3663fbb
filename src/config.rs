use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database file shared by every screen when nothing else is configured
pub const DEFAULT_DATABASE: &str = "inventory.db";
pub const DEFAULT_CURRENCY: &str = "$";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StockposConfig {
    pub database: Option<String>,
    pub currency: Option<String>,
}

impl StockposConfig {
    /// The config `stockpos init` writes
    pub fn starter() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            currency: Some(DEFAULT_CURRENCY.to_string()),
        }
    }

    /// CLI flag, then config file, then the default
    pub fn database_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("stockpos.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<StockposConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: StockposConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &StockposConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
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
    fn test_database_precedence() {
        let empty = StockposConfig::default();
        assert_eq!(empty.database_path(None), PathBuf::from("inventory.db"));

        let config = StockposConfig {
            database: Some("data/shop.db".into()),
            currency: None,
        };
        assert_eq!(config.database_path(None), PathBuf::from("data/shop.db"));
        assert_eq!(
            config.database_path(Some(Path::new("other.db"))),
            PathBuf::from("other.db")
        );
        assert_eq!(config.currency(), "$");
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockpos.toml");

        let config = StockposConfig {
            database: Some("shop.db".into()),
            currency: Some("€".into()),
        };
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &StockposConfig::starter(), true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, StockposConfig::starter());
        assert!(load_config(Some(&dir.path().join("missing.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("inventory.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
