use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
}

impl GameStatus {
    pub fn code(self) -> i64 {
        match self {
            GameStatus::Scheduled => 1,
            GameStatus::Live => 2,
            GameStatus::Final => 3,
        }
    }
}

impl TryFrom<i64> for GameStatus {
    type Error = i64;

    fn try_from(code: i64) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(GameStatus::Scheduled),
            2 => Ok(GameStatus::Live),
            3 => Ok(GameStatus::Final),
            other => Err(other),
        }
    }
}

impl ToSql for GameStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for GameStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        GameStatus::try_from(code).map_err(FromSqlError::OutOfRange)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub status: GameStatus,
    pub status_text: String,
    pub period: u32,
    pub game_clock: String,
    pub game_time_utc: Option<String>,
    pub game_et: Option<String>,
    pub regulation_periods: u32,
    pub series_game_number: Option<String>,
    pub series_text: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Team identity and season record. Shared by every game the team plays in,
/// so the record reflects whichever poll wrote it last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: i64,
    pub team_name: String,
    pub team_city: String,
    pub team_tricode: String,
    pub wins: u32,
    pub losses: u32,
}

/// One side of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTeam {
    pub game_id: String,
    pub team_id: i64,
    pub is_home: bool,
    pub score: u32,
    pub in_bonus: Option<String>,
    pub timeouts_remaining: u32,
    pub points_period1: u32,
    pub last_updated: DateTime<Utc>,
}
