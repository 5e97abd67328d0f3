use serde::Deserialize;
use serde_json::Value;

use super::flag::{opaque_string, FeedFlag};
use super::record_label;

#[derive(Debug, Clone, Deserialize)]
pub struct BoxscoreSnapshot {
    pub game: BoxscoreGame,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxscoreGame {
    pub game_id: String,
    pub home_team: TeamBox,
    pub away_team: TeamBox,
}

/// Players stay as raw JSON so one malformed entry only fails that player.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamBox {
    pub team_id: i64,
    #[serde(default)]
    pub players: Vec<Value>,
}

impl TeamBox {
    pub fn entries(&self) -> impl Iterator<Item = (String, serde_json::Result<PlayerBox>)> + '_ {
        self.players.iter().enumerate().map(|(index, value)| {
            let label = record_label(value, "personId", index);
            (label, PlayerBox::deserialize(value))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBox {
    pub person_id: i64,
    // Key required, null allowed.
    #[serde(deserialize_with = "opaque_string")]
    pub jersey_num: Option<String>,
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub starter: FeedFlag,
    #[serde(default)]
    pub played: FeedFlag,
    /// Left unparsed until the player is known to have played.
    #[serde(default)]
    pub statistics: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub minutes: String,
    pub points: u32,
    pub rebounds_total: u32,
    pub assists: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub field_goals_percentage: f64,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub plus_minus_points: f64,
}
