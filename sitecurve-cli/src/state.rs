use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$SITECURVE_HOME`, else `~/.sitecurve`.
pub fn sitecurve_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SITECURVE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".sitecurve"))
}

pub fn ensure_sitecurve_home() -> Result<PathBuf> {
    let dir = sitecurve_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
