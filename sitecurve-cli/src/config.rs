use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sitecurve_core::{Granularity, ReportOptions, WeightingMode};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_sitecurve_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub curve: CurveSection,
    pub locale: LocaleSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSection {
    pub granularity: Granularity,
    pub weighting: WeightingMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleSection {
    /// IANA timezone used to decide what "today" is on site.
    pub timezone: String,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            timezone: "Asia/Bangkok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub project_name: String,
    pub behind_threshold: f64,
    pub max_items: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        let opts = ReportOptions::default();
        Self {
            project_name: opts.project_name,
            behind_threshold: opts.behind_threshold,
            max_items: opts.max_items,
        }
    }
}

impl ReportSection {
    pub fn to_options(&self, project_override: Option<&str>) -> ReportOptions {
        ReportOptions {
            project_name: project_override.unwrap_or(&self.project_name).to_string(),
            behind_threshold: self.behind_threshold,
            max_items: self.max_items,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_sitecurve_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
