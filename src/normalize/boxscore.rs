use chrono::{DateTime, Utc};

use crate::error::{RecordError, RecordKind};
use crate::feed::{BoxscoreSnapshot, PlayerBox, PlayerStatistics, TeamBox};
use crate::models::Player;

use super::Normalized;

#[derive(Debug, Clone, PartialEq)]
pub struct BoxscoreRows {
    pub game_id: String,
    pub players: Vec<Player>,
}

pub fn normalize_boxscore(
    snapshot: &BoxscoreSnapshot,
    processed_at: DateTime<Utc>,
) -> Normalized<BoxscoreRows> {
    let game = &snapshot.game;
    let mut players = Vec::new();
    let mut errors = Vec::new();

    for team in [&game.home_team, &game.away_team] {
        push_team(&mut players, &mut errors, &game.game_id, team, processed_at);
    }

    Normalized {
        rows: BoxscoreRows {
            game_id: game.game_id.clone(),
            players,
        },
        errors,
    }
}

fn push_team(
    players: &mut Vec<Player>,
    errors: &mut Vec<RecordError>,
    game_id: &str,
    team: &TeamBox,
    processed_at: DateTime<Utc>,
) {
    for (label, entry) in team.entries() {
        let record = format!("{}/{}", game_id, label);
        let result = entry
            .map_err(|e| e.to_string())
            .and_then(|player| player_row(game_id, team.team_id, player, processed_at));

        match result {
            Ok(Some(player)) => players.push(player),
            Ok(None) => {}
            Err(reason) => errors.push(RecordError::new(RecordKind::Player, record, reason)),
        }
    }
}

/// `Ok(None)` for a player who hasn't entered the game yet.
fn player_row(
    game_id: &str,
    team_id: i64,
    player: PlayerBox,
    processed_at: DateTime<Utc>,
) -> Result<Option<Player>, String> {
    if !player.played.is_set() {
        return Ok(None);
    }

    let raw = player
        .statistics
        .ok_or_else(|| "missing statistics".to_string())?;
    let stats: PlayerStatistics =
        serde_json::from_value(raw).map_err(|e| format!("invalid statistics: {}", e))?;

    Ok(Some(Player {
        player_id: player.person_id,
        game_id: game_id.to_string(),
        team_id,
        jersey_num: player.jersey_num.unwrap_or_default(),
        name: player.name,
        position: player.position.unwrap_or_default(),
        starter: player.starter.is_set(),
        minutes: stats.minutes,
        points: stats.points,
        rebounds: stats.rebounds_total,
        assists: stats.assists,
        field_goals_made: stats.field_goals_made,
        field_goals_attempted: stats.field_goals_attempted,
        field_goals_percentage: stats.field_goals_percentage,
        three_pointers_made: stats.three_pointers_made,
        three_pointers_attempted: stats.three_pointers_attempted,
        free_throws_made: stats.free_throws_made,
        free_throws_attempted: stats.free_throws_attempted,
        plus_minus: stats.plus_minus_points,
        last_updated: processed_at,
    }))
}
