use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use validator::{Settings, WrapperPair};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid [settings] table: {0}")]
    Override(#[from] toml::de::Error),

    #[error("`settings` must be a table")]
    NotATable,
}

/// Load settings from `path`. No path, or a path that does not exist, gives the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    if !path.exists() {
        log::info!("settings file {} not found, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Keys a fixture's `[settings]` table may override.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsOverride {
    allowed_tags: Option<String>,
    colorize: Option<bool>,
    hide_validation_status: Option<bool>,
    wrappers: Option<Vec<WrapperPair>>,
}

/// Apply a fixture's `[settings]` table on top of `base`.
pub fn with_overrides(base: &Settings, table: Option<&toml::Table>) -> Result<Settings, ConfigError> {
    let Some(table) = table else {
        return Ok(base.clone());
    };
    let overrides: SettingsOverride = toml::Value::Table(table.clone()).try_into()?;

    let mut settings = base.clone();
    if let Some(allowed_tags) = overrides.allowed_tags {
        settings.allowed_tags = allowed_tags;
    }
    if let Some(colorize) = overrides.colorize {
        settings.colorize = colorize;
    }
    if let Some(hide) = overrides.hide_validation_status {
        settings.hide_validation_status = hide;
    }
    if let Some(wrappers) = overrides.wrappers {
        settings.wrappers = wrappers;
    }
    Ok(settings)
}

/// Settings for one fixture file: `base` with the file's `[settings]` table applied.
///
/// The table is read ahead of the fixture loader because the wrapper pairs it
/// registers decide how blocks are classified. A file that is not valid TOML
/// yields `base`; the loader reports the syntax error with its span.
pub fn for_fixture(base: &Settings, source: &str) -> Result<Settings, ConfigError> {
    let Ok(mut document) = toml::from_str::<toml::Table>(source) else {
        return Ok(base.clone());
    };
    match document.remove("settings") {
        None => Ok(base.clone()),
        Some(toml::Value::Table(table)) => with_overrides(base, Some(&table)),
        Some(_) => Err(ConfigError::NotATable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(load_settings(None).unwrap(), Settings::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(load_settings(Some(&path)).unwrap(), Settings::default());
    }

    #[test]
    fn loads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "colorize = true\nallowed_tags = \"<div>\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert!(settings.colorize);
        assert_eq!(settings.vocabulary().tags(), &["div"]);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "colorize = maybe\n").unwrap();

        let error = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("settings.toml"));
    }

    #[test]
    fn overrides_replace_only_given_keys() {
        let base = Settings {
            colorize: true,
            ..Settings::default()
        };
        let table: toml::Table = toml::from_str("hide_validation_status = true").unwrap();
        let settings = with_overrides(&base, Some(&table)).unwrap();
        assert!(settings.colorize);
        assert!(settings.hide_validation_status);
        assert_eq!(settings.allowed_tags, base.allowed_tags);
    }

    #[test]
    fn fixture_settings_register_wrappers() {
        let source = r#"
[settings]
colorize = true
wrappers = [{ start = "tabStart", stop = "tabStop" }]

[[blocks]]
id = 1
type = "tabStart"
"#;
        let settings = for_fixture(&Settings::default(), source).unwrap();
        assert!(settings.colorize);
        assert!(settings.registry().is_stop("tabStop"));
    }

    #[test]
    fn fixture_without_settings_keeps_base() {
        let base = Settings {
            hide_validation_status: true,
            ..Settings::default()
        };
        assert_eq!(for_fixture(&base, "[[blocks]]\nid = 1\ntype = \"text\"\n").unwrap(), base);
        assert_eq!(for_fixture(&base, "not = = toml").unwrap(), base);
        assert!(matches!(
            for_fixture(&base, "settings = 3"),
            Err(ConfigError::NotATable)
        ));
    }

    #[test]
    fn unknown_override_keys_are_rejected() {
        let table: toml::Table = toml::from_str("colourise = true").unwrap();
        assert!(with_overrides(&Settings::default(), Some(&table)).is_err());
    }
}
