//! Load configuration from XDG `config.toml` and a project `.env`, then apply it to the
//! process environment with priority: **existing env > .env > XDG**.
//!
//! Grove reads its tunables from `GROVE_*` variables afterwards, so every source can set
//! them: the shell, `.env`, or the `[env]` / `[growth]` tables of
//! `~/.config/grove/config.toml`.

mod xdg_toml;

pub use xdg_toml::{config_path, load_env_map, GROWTH_PREFIX};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// `.env` in `override_dir`, else in the current directory; `None` if absent.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

fn load_dotenv_map(override_dir: Option<&Path>) -> Result<HashMap<String, String>, LoadError> {
    let Some(path) = dotenv_path(override_dir) else {
        return Ok(HashMap::new());
    };
    let mut out = HashMap::new();
    for item in dotenv::from_path_iter(&path)? {
        let (key, value) = item?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Sets each key not already present in the environment; `.env` beats XDG.
fn apply(dotenv_map: HashMap<String, String>, xdg_map: HashMap<String, String>) {
    let mut keys: HashSet<&String> = xdg_map.keys().collect();
    keys.extend(dotenv_map.keys());
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, v);
        }
    }
}

/// Loads `$XDG_CONFIG_HOME/<app_name>/config.toml` and an optional `.env`, then sets
/// variables only for keys that are **not** already set.
///
/// * `app_name`: e.g. `"grove"`.
/// * `override_dir`: look for `.env` here instead of the current directory.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = match xdg_toml::config_home() {
        Some(home) => xdg_toml::load_env_map_from(&home.join(app_name).join("config.toml"))?,
        None => HashMap::new(),
    };
    let dotenv_map = load_dotenv_map(override_dir)?;
    apply(dotenv_map, xdg_map);
    Ok(())
}

/// Like [`load_and_apply`] with an explicit config file instead of the XDG location.
pub fn load_and_apply_from(config_file: &Path, override_dir: Option<&Path>) -> Result<(), LoadError> {
    let xdg_map = xdg_toml::load_env_map_from(config_file)?;
    let dotenv_map = load_dotenv_map(override_dir)?;
    apply(dotenv_map, xdg_map);
    Ok(())
}
