use crate::data::Roster;
use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const APP_DIR: &str = "fzcar";
const DATA_FILE_NAME: &str = "data_store.csv";

#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// CSV file holding the entry log.
    pub data_file: PathBuf,
    /// Drivers that always get a column in the monthly summary, in display order.
    pub roster: Roster,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    data_file: Option<PathBuf>,
    roster: Option<Vec<String>>,
}

impl Config {
    /// With an explicit path the file must exist and parse. Otherwise the first
    /// config file found in the usual places is used; a broken one is ignored
    /// with a warning and defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file_config = match explicit {
            Some(path) => Self::read_path(path)?,
            None => Self::read_default().unwrap_or_else(|err| {
                warn!("ignoring config file: {err:#}");
                FileConfig::default()
            }),
        };
        Ok(Self::from_file_config(file_config))
    }

    fn from_file_config(file_config: FileConfig) -> Self {
        Self {
            data_file: file_config
                .data_file
                .unwrap_or_else(Self::default_data_file),
            roster: file_config.roster.map(Roster::new).unwrap_or_default(),
        }
    }

    /// Default log location: `{data_dir}/fzcar/data_store.csv`
    /// - macOS:   `~/Library/Application Support/fzcar`
    /// - Linux:   `$XDG_DATA_HOME/fzcar` or `~/.local/share/fzcar`
    /// - Windows: `%APPDATA%\fzcar`
    fn default_data_file() -> PathBuf {
        match BaseDirs::new() {
            Some(base) => base.data_dir().join(APP_DIR).join(DATA_FILE_NAME),
            None => PathBuf::from(DATA_FILE_NAME),
        }
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(b) = BaseDirs::new() {
            v.push(b.home_dir().join(".config").join(APP_DIR).join("config.toml"));
            v.push(b.config_dir().join(APP_DIR).join("config.toml"));
        }
        v
    }

    fn read_default() -> Result<FileConfig> {
        for path in Self::config_file_paths() {
            if path.exists() {
                return Self::read_path(&path);
            }
        }
        Ok(FileConfig::default())
    }

    fn read_path(path: &Path) -> Result<FileConfig> {
        let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        debug!(path = %path.display(), "using config file");
        Self::parse_file(&s).with_context(|| format!("parsing {}", path.display()))
    }

    fn parse_file(s: &str) -> Result<FileConfig> {
        Ok(toml::from_str::<FileConfig>(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, FileConfig};
    use crate::data::Roster;
    use std::path::PathBuf;

    #[test]
    fn parse_full_file() {
        let file = Config::parse_file(
            r#"
data_file = "/srv/fz/log.csv"
roster = ["平野", "萩原", "平野"]
"#,
        )
        .unwrap();
        let config = Config::from_file_config(file);
        assert_eq!(config.data_file, PathBuf::from("/srv/fz/log.csv"));
        assert_eq!(config.roster, Roster::new(["平野", "萩原"]));
    }

    #[test]
    fn defaults() {
        let config = Config::from_file_config(Config::parse_file("").unwrap());
        assert_eq!(config.roster, Roster::default());
        assert!(config.data_file.ends_with("data_store.csv"));
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(Config::parse_file("roster = 3").is_err());
        assert!(Config::parse_file("roster = [").is_err());
    }

    #[test]
    fn explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "roster = [\"A\"]\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.roster, Roster::new(["A"]));

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn empty_file_config() {
        let config = Config::from_file_config(FileConfig::default());
        assert_eq!(config.roster.as_slice().len(), 17);
    }
}
