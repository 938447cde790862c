use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::store::tranquil_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone used for wall-clock alarm matching and the daily
    /// task purge boundary.
    pub timezone: String,
    pub ai: AiSection,
    pub alarms: AlarmSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSection {
    /// Base URL of the generative-AI flow endpoint.
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key. Absent key means every
    /// AI call fails recoverably (the app falls back; nothing crashes).
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSection {
    /// Polling cadence in seconds. Clamped to 1..=30 at use; coarser
    /// intervals trade timer accuracy for battery/CPU, but an alarm must
    /// never be more than one interval late.
    pub poll_interval_secs: u64,
    /// Snooze offsets offered to the user, in minutes.
    pub snooze_presets: Vec<u32>,
}

impl AlarmSection {
    pub fn clamped_interval_secs(&self) -> u64 {
        self.poll_interval_secs.clamp(1, 30)
    }

    /// Presets with non-positive entries dropped. A zero-minute snooze
    /// would schedule the replacement in the current minute and re-fire
    /// on the very next tick.
    pub fn usable_snooze_presets(&self) -> Vec<u32> {
        self.snooze_presets
            .iter()
            .copied()
            .filter(|m| *m > 0)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            ai: AiSection {
                base_url: "https://api.example-ai.dev".to_string(),
                model: "gemini-2.0-flash".to_string(),
                api_key_env: "TRANQUIL_AI_KEY".to_string(),
            },
            alarms: AlarmSection {
                poll_interval_secs: 1,
                snooze_presets: vec![5, 10, 15],
            },
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone: {}", self.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(tranquil_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
