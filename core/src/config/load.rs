use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default quietrun data directory: ~/.quietrun
pub fn get_quietrun_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".quietrun"))
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    let data_dir = get_quietrun_data_dir()?;
    let mut cfg = load_from_dir(&data_dir, Path::new("."))?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

/// Reads `<data_dir>/config.toml`, falling back to `<work_dir>/quietrun.toml`, then defaults.
pub fn load_from_dir(data_dir: &Path, work_dir: &Path) -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.quietrun/config.toml (highest)
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./quietrun.toml (current directory)
    let local_config = work_dir.join("quietrun.toml");

    let cfg = if user_config.exists() {
        let s = std::fs::read_to_string(&user_config)?;
        toml::from_str::<AppConfig>(&s)
            .map_err(|e| anyhow::anyhow!("{}: {e}", user_config.display()))?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(&local_config)?;
        toml::from_str::<AppConfig>(&s)
            .map_err(|e| anyhow::anyhow!("{}: {e}", local_config.display()))?
    } else {
        AppConfig::default()
    };

    Ok(cfg)
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("QUIETRUN_QUICK_THRESHOLD_MS") {
        match v.trim().parse::<u64>() {
            Ok(ms) => cfg.runner.quick_threshold_ms = ms,
            Err(e) => tracing::warn!(value = %v, error = %e, "ignoring QUIETRUN_QUICK_THRESHOLD_MS"),
        }
    }
    if let Some(v) = get("QUIETRUN_USE_PTY") {
        cfg.runner.use_pty = !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        );
    }
    if let Some(v) = get("QUIETRUN_PTY_PROGRAM") {
        cfg.runner.pty_program = v;
    }
    if let Some(v) = get("QUIETRUN_LOG") {
        cfg.logging.level = v;
    }
}
