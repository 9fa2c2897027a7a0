use chrono::Local;
use clap::Subcommand;
use pomate_core::stats::{format_duration, weekly_focus, Summary};
use pomate_core::Config;
use serde_json::json;

use crate::context::{open_settings, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
    /// Focus time for each of the last seven days
    Week,
}

pub fn run(action: StatsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings(config)?;
    let today = Local::now().date_naive();
    let summary = Summary::compute(settings.history(), today, &Local);

    match action {
        StatsAction::Today => {
            print_json(&json!({
                "work_sessions": summary.today_work_sessions,
                "focus_secs": summary.today_focus_secs,
                "focus": format_duration(summary.today_focus_secs),
            }))?;
        }
        StatsAction::All => {
            print_json(&json!({
                "work_sessions": summary.total_work_sessions,
                "focus_secs": summary.total_focus_secs,
                "focus": format_duration(summary.total_focus_secs),
            }))?;
        }
        StatsAction::Week => {
            print_json(&weekly_focus(settings.history(), today, &Local))?;
        }
    }
    Ok(())
}
