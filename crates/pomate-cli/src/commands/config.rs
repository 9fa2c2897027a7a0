use clap::Subcommand;
use pomate_core::{Config, SessionKind, SettingsStore};
use serde_json::json;

use crate::context::{open_settings, print_json};

const SETTINGS_PREFIX: &str = "settings.";

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "log_filter", "settings.work_duration")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values and stored settings
    List,
    /// Reset the config file to defaults
    Reset,
}

pub fn run(action: ConfigAction, mut config: Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = match key.strip_prefix(SETTINGS_PREFIX) {
                Some(name) => get_setting(&open_settings(&config)?, name),
                None => config.get(&key),
            };
            match value {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            match key.strip_prefix(SETTINGS_PREFIX) {
                Some(name) => set_setting(&mut open_settings(&config)?, name, &value)?,
                None => {
                    config.set(&key, &value)?;
                    config.save()?;
                }
            }
            println!("ok");
        }
        ConfigAction::List => {
            let settings = open_settings(&config)?;
            print_json(&json!({
                "config": config,
                "settings": {
                    "work_duration": settings.work_duration(),
                    "short_break_duration": settings.short_break_duration(),
                    "long_break_duration": settings.long_break_duration(),
                    "sessions_before_long_break": settings.sessions_before_long_break(),
                    "play_sound": settings.play_sound(),
                },
            }))?;
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn duration_kind(name: &str) -> Option<SessionKind> {
    match name {
        "work_duration" => Some(SessionKind::Work),
        "short_break_duration" => Some(SessionKind::ShortBreak),
        "long_break_duration" => Some(SessionKind::LongBreak),
        _ => None,
    }
}

fn get_setting(settings: &SettingsStore, name: &str) -> Option<String> {
    if let Some(kind) = duration_kind(name) {
        return Some(settings.duration(kind).to_string());
    }
    match name {
        "sessions_before_long_break" => Some(settings.sessions_before_long_break().to_string()),
        "play_sound" => Some(settings.play_sound().to_string()),
        _ => None,
    }
}

fn set_setting(
    settings: &mut SettingsStore,
    name: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(kind) = duration_kind(name) {
        let secs: u32 = value.parse()?;
        if secs == 0 {
            return Err(format!("{name} must be greater than zero").into());
        }
        settings.set_duration(kind, secs);
        return Ok(());
    }
    match name {
        "sessions_before_long_break" => {
            let count: u32 = value.parse()?;
            if count == 0 {
                return Err("sessions_before_long_break must be at least 1".into());
            }
            settings.set_sessions_before_long_break(count);
        }
        "play_sound" => settings.set_play_sound(value.parse()?),
        _ => return Err(format!("unknown key: {SETTINGS_PREFIX}{name}").into()),
    }
    Ok(())
}
