//! Reads `$XDG_CONFIG_HOME/<app>/config.toml`.
//!
//! Two tables are understood:
//!
//! ```toml
//! [env]
//! OPENAI_API_KEY = "sk-..."
//!
//! [growth]
//! alpha = 0.6          # -> GROVE_ALPHA
//! parents = 3          # -> GROVE_PARENTS
//! strategy = "random"  # -> GROVE_STRATEGY
//! ```
//!
//! `[growth]` keys become `GROVE_<KEY>` (upper-cased). An explicit `[env]` entry for the same
//! variable wins over the `[growth]` shorthand.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// Prefix for variables derived from the `[growth]` table.
pub const GROWTH_PREFIX: &str = "GROVE_";

/// `$XDG_CONFIG_HOME`, falling back to the platform config dir.
pub(crate) fn config_home() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

/// Path of the app's config file, whether or not it exists.
pub fn config_path(app_name: &str) -> Result<PathBuf, LoadError> {
    let home = config_home()
        .ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))?;
    Ok(home.join(app_name).join("config.toml"))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    growth: HashMap<String, toml::Value>,
}

fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Env pairs from `file`. Missing file returns an empty map.
pub(crate) fn load_env_map_from(file: &Path) -> Result<HashMap<String, String>, LoadError> {
    if !file.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(file).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    let mut out: HashMap<String, String> = config
        .growth
        .iter()
        .map(|(k, v)| (format!("{}{}", GROWTH_PREFIX, k.to_uppercase()), value_to_string(v)))
        .collect();
    out.extend(config.env);
    Ok(out)
}

/// Env pairs from the app's XDG config file.
pub fn load_env_map(app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    load_env_map_from(&config_path(app_name)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let map = load_env_map_from(&dir.path().join("config.toml")).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn reads_env_table() {
        let (_dir, path) = write("[env]\nOPENAI_API_KEY = \"sk-test\"\nGROVE_MODEL = \"gpt-4o\"\n");
        let map = load_env_map_from(&path).unwrap();
        assert_eq!(map.get("OPENAI_API_KEY").map(String::as_str), Some("sk-test"));
        assert_eq!(map.get("GROVE_MODEL").map(String::as_str), Some("gpt-4o"));
    }

    /// **Scenario**: [growth] keys map to GROVE_* with numbers rendered as text.
    #[test]
    fn growth_table_maps_to_prefixed_vars() {
        let (_dir, path) = write(
            "[growth]\nalpha = 0.6\nparents = 3\nstrategy = \"random\"\ninterval_ms = 500\n",
        );
        let map = load_env_map_from(&path).unwrap();
        assert_eq!(map.get("GROVE_ALPHA").map(String::as_str), Some("0.6"));
        assert_eq!(map.get("GROVE_PARENTS").map(String::as_str), Some("3"));
        assert_eq!(map.get("GROVE_STRATEGY").map(String::as_str), Some("random"));
        assert_eq!(map.get("GROVE_INTERVAL_MS").map(String::as_str), Some("500"));
    }

    #[test]
    fn env_entry_wins_over_growth_shorthand() {
        let (_dir, path) = write("[env]\nGROVE_PARENTS = \"4\"\n\n[growth]\nparents = 2\n");
        let map = load_env_map_from(&path).unwrap();
        assert_eq!(map.get("GROVE_PARENTS").map(String::as_str), Some("4"));
    }

    #[test]
    fn unknown_tables_are_ignored() {
        let (_dir, path) = write("[other]\nkey = \"ignored\"\n");
        assert!(load_env_map_from(&path).unwrap().is_empty());
    }

    #[test]
    fn invalid_toml_returns_xdg_parse_error() {
        let (_dir, path) = write("not valid toml [[[\n");
        assert!(matches!(
            load_env_map_from(&path),
            Err(LoadError::XdgParse(_))
        ));
    }
}
