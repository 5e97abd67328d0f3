mod boxscore;
mod fetcher;
mod flag;
mod scoreboard;

pub use boxscore::{BoxscoreSnapshot, PlayerBox, PlayerStatistics, TeamBox};
pub use fetcher::FeedFetcher;
pub use scoreboard::{ScoreboardGame, ScoreboardSnapshot, TeamSide};

use serde_json::Value;

/// Best-effort identifier for a record that failed to deserialize.
pub(crate) fn record_label(value: &Value, key: &str, index: usize) -> String {
    match value.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("#{index}"),
    }
}
