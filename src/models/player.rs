use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static MINUTES_RE: OnceLock<Regex> = OnceLock::new();

/// A player's line for a single game. Only players who have entered the
/// game get one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: i64,
    pub game_id: String,
    pub team_id: i64,
    pub jersey_num: String,
    pub name: String,
    pub position: String,
    pub starter: bool,
    /// Feed duration string, e.g. `PT24M13.00S`.
    pub minutes: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub field_goals_percentage: f64,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub plus_minus: f64,
    pub last_updated: DateTime<Utc>,
}

impl Player {
    /// Minutes played as `MM:SS`, or `0:00` when the feed value can't be read.
    pub fn minutes_display(&self) -> String {
        format_minutes(&self.minutes)
    }
}

pub fn format_minutes(minutes: &str) -> String {
    let re = MINUTES_RE.get_or_init(|| {
        Regex::new(r"^PT(\d+)M(\d+)(?:\.\d+)?S$").expect("minutes pattern is valid")
    });

    match re.captures(minutes.trim()) {
        Some(caps) => format!("{}:{:0>2}", &caps[1], &caps[2]),
        None => "0:00".to_string(),
    }
}
