use pomate_core::Config;

use crate::context::{open_settings, print_json};

pub fn run(limit: Option<usize>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let settings = open_settings(config)?;
    let history = settings.history();
    let skip = limit.map_or(0, |n| history.len().saturating_sub(n));
    print_json(&history[skip..])
}
