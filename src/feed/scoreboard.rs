use serde::Deserialize;
use serde_json::Value;

use super::flag::opaque_string;
use super::record_label;

/// One scoreboard payload. Game entries stay as raw JSON until they are
/// normalized so a single bad entry can't reject the whole snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ScoreboardEnvelope")]
pub struct ScoreboardSnapshot {
    pub games: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreboardEnvelope {
    // Live feed: { "scoreboard": { "games": [...] } }
    Wrapped { scoreboard: GameList },
    Bare(GameList),
}

#[derive(Deserialize)]
struct GameList {
    games: Vec<Value>,
}

impl From<ScoreboardEnvelope> for ScoreboardSnapshot {
    fn from(envelope: ScoreboardEnvelope) -> Self {
        let list = match envelope {
            ScoreboardEnvelope::Wrapped { scoreboard } => scoreboard,
            ScoreboardEnvelope::Bare(list) => list,
        };
        Self { games: list.games }
    }
}

impl ScoreboardSnapshot {
    /// Parses each game entry, pairing it with a label for error reporting.
    pub fn entries(&self) -> impl Iterator<Item = (String, serde_json::Result<ScoreboardGame>)> + '_ {
        self.games.iter().enumerate().map(|(index, value)| {
            let label = record_label(value, "gameId", index);
            (label, ScoreboardGame::deserialize(value))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardGame {
    pub game_id: String,
    pub game_status: i64,
    pub game_status_text: String,
    pub period: u32,
    // Empty or absent before tip-off.
    #[serde(default)]
    pub game_clock: String,
    #[serde(rename = "gameTimeUTC", default)]
    pub game_time_utc: Option<String>,
    #[serde(default)]
    pub game_et: Option<String>,
    pub regulation_periods: u32,
    #[serde(default, deserialize_with = "opaque_string")]
    pub series_game_number: Option<String>,
    #[serde(default, deserialize_with = "opaque_string")]
    pub series_text: Option<String>,
    pub home_team: TeamSide,
    pub away_team: TeamSide,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    pub team_id: i64,
    pub team_name: String,
    pub team_city: String,
    pub team_tricode: String,
    pub wins: u32,
    pub losses: u32,
    pub score: u32,
    #[serde(default, deserialize_with = "opaque_string")]
    pub in_bonus: Option<String>,
    pub timeouts_remaining: u32,
    pub periods: Vec<PeriodScore>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScore {
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_wrapped_and_bare_payloads() {
        let wrapped: ScoreboardSnapshot =
            serde_json::from_value(json!({"scoreboard": {"gameDate": "2024-10-22", "games": [{}, {}]}}))
                .unwrap();
        assert_eq!(wrapped.games.len(), 2);

        let bare: ScoreboardSnapshot = serde_json::from_value(json!({"games": [{}]})).unwrap();
        assert_eq!(bare.games.len(), 1);
    }

    #[test]
    fn payloads_without_a_game_list_are_rejected() {
        for payload in [
            json!({"scoreboard": {"games": null}}),
            json!({"scoreboard": {"gameDate": "2024-10-22"}}),
            json!({"message": "Access Denied"}),
        ] {
            assert!(serde_json::from_value::<ScoreboardSnapshot>(payload).is_err());
        }
        let empty: ScoreboardSnapshot = serde_json::from_value(json!({"games": []})).unwrap();
        assert!(empty.games.is_empty());
    }

    fn side(team_id: i64) -> Value {
        json!({
            "teamId": team_id,
            "teamName": "Celtics",
            "teamCity": "Boston",
            "teamTricode": "BOS",
            "wins": 0,
            "losses": 0,
            "score": 0,
            "inBonus": null,
            "timeoutsRemaining": 7,
            "periods": []
        })
    }

    #[test]
    fn entries_are_parsed_independently() {
        let snapshot: ScoreboardSnapshot = serde_json::from_value(json!({
            "games": [
                {"gameStatus": 2},
                {
                    "gameId": "0022400001",
                    "gameStatus": 1,
                    "gameStatusText": "7:30 pm ET",
                    "period": 0,
                    "regulationPeriods": 4,
                    "homeTeam": side(1610612738),
                    "awayTeam": side(1610612752)
                }
            ]
        }))
        .unwrap();

        let entries: Vec<_> = snapshot.entries().collect();
        assert_eq!(entries[0].0, "#0");
        assert!(entries[0].1.is_err());
        assert_eq!(entries[1].0, "0022400001");
        let game = entries[1].1.as_ref().unwrap();
        assert!(game.game_clock.is_empty());
        assert!(game.series_text.is_none());
        assert!(game.home_team.in_bonus.is_none());
        assert!(game.home_team.periods.is_empty());
    }

    #[test]
    fn side_without_score_fails_its_entry() {
        let mut home = side(1610612738);
        home.as_object_mut().unwrap().remove("score");
        let entry = json!({
            "gameId": "0022400001",
            "gameStatus": 2,
            "gameStatusText": "Q1 2:00",
            "period": 1,
            "regulationPeriods": 4,
            "homeTeam": home,
            "awayTeam": side(1610612752)
        });

        let err = ScoreboardGame::deserialize(&entry).unwrap_err();
        assert!(err.to_string().contains("score"));
    }
}
