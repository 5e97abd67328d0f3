//! Feed payloads shaped like the live NBA endpoints, for tests.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::feed::{BoxscoreSnapshot, ScoreboardSnapshot};

pub const GAME_ID: &str = "0022400001";
pub const HOME_ID: i64 = 1610612738;
pub const AWAY_ID: i64 = 1610612752;

pub fn processed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 22, 23, 45, 0).unwrap()
}

pub fn team_side(team_id: i64, tricode: &str, score: u32, first_period: Option<u32>) -> Value {
    let periods = match first_period {
        Some(points) => json!([
            {"period": 1, "periodType": "REGULAR", "score": points},
            {"period": 2, "periodType": "REGULAR", "score": score.saturating_sub(points)}
        ]),
        None => json!([]),
    };
    json!({
        "teamId": team_id,
        "teamName": tricode,
        "teamCity": "City",
        "teamTricode": tricode,
        "wins": 3,
        "losses": 1,
        "score": score,
        "inBonus": "0",
        "timeoutsRemaining": 4,
        "periods": periods
    })
}

pub fn scoreboard_game(game_id: &str, status: i64, home: Value, away: Value) -> Value {
    json!({
        "gameId": game_id,
        "gameCode": "20241022/NYKBOS",
        "gameStatus": status,
        "gameStatusText": "Q2 4:31",
        "period": 2,
        "gameClock": "PT04M31.00S",
        "gameTimeUTC": "2024-10-22T23:30:00Z",
        "gameEt": "2024-10-22T19:30:00Z",
        "regulationPeriods": 4,
        "seriesGameNumber": "",
        "seriesText": "",
        "homeTeam": home,
        "awayTeam": away
    })
}

pub fn scoreboard(games: Vec<Value>) -> ScoreboardSnapshot {
    serde_json::from_value(json!({
        "meta": {"version": 1},
        "scoreboard": {"gameDate": "2024-10-22", "leagueId": "00", "games": games}
    }))
    .unwrap()
}

/// The single live game: home 50 (25 in Q1), away 48 (25 in Q1).
pub fn live_scoreboard() -> ScoreboardSnapshot {
    scoreboard(vec![scoreboard_game(
        GAME_ID,
        2,
        team_side(HOME_ID, "BOS", 50, Some(25)),
        team_side(AWAY_ID, "NYK", 48, Some(25)),
    )])
}

pub fn box_player(person_id: i64, played: &str, starter: &str, points: u32) -> Value {
    json!({
        "status": "ACTIVE",
        "order": 1,
        "personId": person_id,
        "jerseyNum": "30",
        "position": "G",
        "starter": starter,
        "oncourt": "1",
        "played": played,
        "name": format!("Player {}", person_id),
        "statistics": {
            "assists": 5,
            "fieldGoalsAttempted": 14,
            "fieldGoalsMade": 7,
            "fieldGoalsPercentage": 0.5,
            "freeThrowsAttempted": 4,
            "freeThrowsMade": 3,
            "minutes": "PT18M42.00S",
            "plusMinusPoints": 6.0,
            "points": points,
            "reboundsTotal": 4,
            "threePointersAttempted": 5,
            "threePointersMade": 3
        }
    })
}

pub fn boxscore(game_id: &str, home: Vec<Value>, away: Vec<Value>) -> BoxscoreSnapshot {
    serde_json::from_value(json!({
        "meta": {"version": 1},
        "game": {
            "gameId": game_id,
            "gameStatus": 2,
            "homeTeam": {"teamId": HOME_ID, "teamTricode": "BOS", "players": home},
            "awayTeam": {"teamId": AWAY_ID, "teamTricode": "NYK", "players": away}
        }
    }))
    .unwrap()
}
