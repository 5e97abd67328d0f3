use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row, Transaction};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result, RowWriteError};
use crate::models::{DatabaseStats, Game, GameTeam, Player, Team};
use crate::normalize::{BoxscoreRows, ScoreboardRows};

use super::schema::{DROP_SCHEMA, SCHEMA, TABLES};

/// Handle to the embedded store. All access goes through one background
/// connection, so row-sets are applied one at a time.
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::with_connection(conn).await
    }

    #[allow(dead_code)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        })
        .await?;

        let repository = Self { conn };
        repository.initialize().await?;
        Ok(repository)
    }

    // Schema operations

    /// Creates any missing tables. Safe to call on an existing store.
    pub async fn initialize(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(SCHEMA)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| AppError::Schema(format!("initialize failed: {}", e)))?;

        self.verify_schema().await
    }

    /// Drops and recreates every table in one transaction. Either the store
    /// ends up empty with a fresh schema or it is left untouched.
    pub async fn reset(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(DROP_SCHEMA)?;
                tx.execute_batch(SCHEMA)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(|e| AppError::Schema(format!("reset failed: {}", e)))?;

        tracing::info!("Database cleared and tables recreated");
        self.verify_schema().await
    }

    async fn verify_schema(&self) -> Result<()> {
        let missing = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                )?;
                let mut missing = Vec::new();
                for table in TABLES {
                    let count: i64 = stmt.query_row(params![table], |row| row.get(0))?;
                    if count == 0 {
                        missing.push(table);
                    }
                }
                Ok(missing)
            })
            .await
            .map_err(|e| AppError::Schema(format!("schema check failed: {}", e)))?;

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Schema(format!("missing tables: {}", missing.join(", "))))
        }
    }

    // Upserts

    /// Applies every row from one scoreboard snapshot, or none of them.
    pub async fn apply_scoreboard(&self, rows: ScoreboardRows) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for game in &rows.games {
                    upsert_game(&tx, game).map_err(|e| row_error("games", &game.game_id, e))?;
                }
                for team in &rows.teams {
                    upsert_team(&tx, team)
                        .map_err(|e| row_error("teams", &team.team_id.to_string(), e))?;
                }
                for game_team in &rows.game_teams {
                    upsert_game_team(&tx, game_team).map_err(|e| {
                        let id = format!("{}/{}", game_team.game_id, game_team.team_id);
                        row_error("game_teams", &id, e)
                    })?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(AppError::from_row_set)
    }

    /// Applies every player row from one boxscore snapshot, or none of them.
    pub async fn apply_boxscore(&self, rows: BoxscoreRows) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for player in &rows.players {
                    upsert_player(&tx, player).map_err(|e| {
                        let id = format!("{}/{}", player.game_id, player.player_id);
                        row_error("players", &id, e)
                    })?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(AppError::from_row_set)
    }

    // Reads

    pub async fn stats(&self) -> Result<DatabaseStats> {
        let stats = self
            .conn
            .call(|conn| {
                let stats = conn.query_row(
                    r#"SELECT
                           (SELECT COUNT(DISTINCT game_id) FROM games),
                           (SELECT COUNT(DISTINCT team_id) FROM teams),
                           (SELECT COUNT(DISTINCT player_id) FROM players)"#,
                    [],
                    |row| {
                        Ok(DatabaseStats {
                            total_games: row.get(0)?,
                            total_teams: row.get(1)?,
                            total_players: row.get(2)?,
                        })
                    },
                )?;
                Ok(stats)
            })
            .await?;
        Ok(stats)
    }

    pub async fn get_games(&self) -> Result<Vec<Game>> {
        let games = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM games ORDER BY game_time_utc, game_id",
                    GAME_COLUMNS
                ))?;
                let games = stmt
                    .query_map([], game_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(games)
            })
            .await?;
        Ok(games)
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Option<Game>> {
        let game_id = game_id.to_string();
        let game = self
            .conn
            .call(move |conn| {
                let game = conn
                    .query_row(
                        &format!("SELECT {} FROM games WHERE game_id = ?1", GAME_COLUMNS),
                        params![game_id],
                        game_from_row,
                    )
                    .optional()?;
                Ok(game)
            })
            .await?;
        Ok(game)
    }

    pub async fn get_team(&self, team_id: i64) -> Result<Option<Team>> {
        let team = self
            .conn
            .call(move |conn| {
                let team = conn
                    .query_row(
                        "SELECT team_id, team_name, team_city, team_tricode, wins, losses FROM teams WHERE team_id = ?1",
                        params![team_id],
                        team_from_row,
                    )
                    .optional()?;
                Ok(team)
            })
            .await?;
        Ok(team)
    }

    /// Home side first.
    pub async fn get_game_teams(&self, game_id: &str) -> Result<Vec<GameTeam>> {
        let game_id = game_id.to_string();
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT game_id, team_id, is_home, score, in_bonus, timeouts_remaining,
                              points_period1, last_updated
                       FROM game_teams WHERE game_id = ?1 ORDER BY is_home DESC"#,
                )?;
                let rows = stmt
                    .query_map(params![game_id], game_team_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    pub async fn get_players(&self, game_id: &str) -> Result<Vec<Player>> {
        let game_id = game_id.to_string();
        let players = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM players WHERE game_id = ?1 ORDER BY team_id, starter DESC, player_id",
                    PLAYER_COLUMNS
                ))?;
                let players = stmt
                    .query_map(params![game_id], player_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(players)
            })
            .await?;
        Ok(players)
    }

    pub async fn has_players(&self, game_id: &str) -> Result<bool> {
        let game_id = game_id.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM players WHERE game_id = ?1",
                    params![game_id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await?;
        Ok(exists)
    }
}

fn row_error(table: &'static str, id: &str, source: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Other(Box::new(RowWriteError {
        table,
        id: id.to_string(),
        source,
    }))
}

fn upsert_game(tx: &Transaction, game: &Game) -> rusqlite::Result<usize> {
    tx.execute(
        r#"INSERT INTO games (game_id, game_status, game_status_text, period, game_clock,
                              game_time_utc, game_et, regulation_periods, series_game_number,
                              series_text, last_updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
           ON CONFLICT(game_id) DO UPDATE SET
               game_status = excluded.game_status,
               game_status_text = excluded.game_status_text,
               period = excluded.period,
               game_clock = excluded.game_clock,
               game_time_utc = excluded.game_time_utc,
               game_et = excluded.game_et,
               regulation_periods = excluded.regulation_periods,
               series_game_number = excluded.series_game_number,
               series_text = excluded.series_text,
               last_updated = excluded.last_updated"#,
        params![
            game.game_id,
            game.status,
            game.status_text,
            game.period,
            game.game_clock,
            game.game_time_utc,
            game.game_et,
            game.regulation_periods,
            game.series_game_number,
            game.series_text,
            game.last_updated.to_rfc3339(),
        ],
    )
}

fn upsert_team(tx: &Transaction, team: &Team) -> rusqlite::Result<usize> {
    tx.execute(
        r#"INSERT INTO teams (team_id, team_name, team_city, team_tricode, wins, losses)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(team_id) DO UPDATE SET
               team_name = excluded.team_name,
               team_city = excluded.team_city,
               team_tricode = excluded.team_tricode,
               wins = excluded.wins,
               losses = excluded.losses"#,
        params![
            team.team_id,
            team.team_name,
            team.team_city,
            team.team_tricode,
            team.wins,
            team.losses,
        ],
    )
}

fn upsert_game_team(tx: &Transaction, row: &GameTeam) -> rusqlite::Result<usize> {
    tx.execute(
        r#"INSERT INTO game_teams (game_id, team_id, is_home, score, in_bonus,
                                   timeouts_remaining, points_period1, last_updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(game_id, team_id) DO UPDATE SET
               is_home = excluded.is_home,
               score = excluded.score,
               in_bonus = excluded.in_bonus,
               timeouts_remaining = excluded.timeouts_remaining,
               points_period1 = excluded.points_period1,
               last_updated = excluded.last_updated"#,
        params![
            row.game_id,
            row.team_id,
            row.is_home,
            row.score,
            row.in_bonus,
            row.timeouts_remaining,
            row.points_period1,
            row.last_updated.to_rfc3339(),
        ],
    )
}

fn upsert_player(tx: &Transaction, player: &Player) -> rusqlite::Result<usize> {
    tx.execute(
        r#"INSERT INTO players (player_id, game_id, team_id, jersey_num, name, position, starter,
                                minutes, points, rebounds, assists, field_goals_made,
                                field_goals_attempted, field_goals_percentage, three_pointers_made,
                                three_pointers_attempted, free_throws_made, free_throws_attempted,
                                plus_minus, last_updated)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
           ON CONFLICT(player_id, game_id) DO UPDATE SET
               team_id = excluded.team_id,
               jersey_num = excluded.jersey_num,
               name = excluded.name,
               position = excluded.position,
               starter = excluded.starter,
               minutes = excluded.minutes,
               points = excluded.points,
               rebounds = excluded.rebounds,
               assists = excluded.assists,
               field_goals_made = excluded.field_goals_made,
               field_goals_attempted = excluded.field_goals_attempted,
               field_goals_percentage = excluded.field_goals_percentage,
               three_pointers_made = excluded.three_pointers_made,
               three_pointers_attempted = excluded.three_pointers_attempted,
               free_throws_made = excluded.free_throws_made,
               free_throws_attempted = excluded.free_throws_attempted,
               plus_minus = excluded.plus_minus,
               last_updated = excluded.last_updated"#,
        params![
            player.player_id,
            player.game_id,
            player.team_id,
            player.jersey_num,
            player.name,
            player.position,
            player.starter,
            player.minutes,
            player.points,
            player.rebounds,
            player.assists,
            player.field_goals_made,
            player.field_goals_attempted,
            player.field_goals_percentage,
            player.three_pointers_made,
            player.three_pointers_attempted,
            player.free_throws_made,
            player.free_throws_attempted,
            player.plus_minus,
            player.last_updated.to_rfc3339(),
        ],
    )
}

const GAME_COLUMNS: &str = "game_id, game_status, game_status_text, period, game_clock, \
    game_time_utc, game_et, regulation_periods, series_game_number, series_text, last_updated";

const PLAYER_COLUMNS: &str = "player_id, game_id, team_id, jersey_num, name, position, starter, \
    minutes, points, rebounds, assists, field_goals_made, field_goals_attempted, \
    field_goals_percentage, three_pointers_made, three_pointers_attempted, free_throws_made, \
    free_throws_attempted, plus_minus, last_updated";

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // RFC3339 is what we write (e.g., "2024-10-22T23:45:00+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite datetime format (e.g., "2024-10-22 23:45:00")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    Ok(row
        .get::<_, String>(idx)
        .ok()
        .and_then(|s| parse_datetime(&s))
        .unwrap_or_else(Utc::now))
}

fn game_from_row(row: &Row) -> rusqlite::Result<Game> {
    Ok(Game {
        game_id: row.get(0)?,
        status: row.get(1)?,
        status_text: row.get(2)?,
        period: row.get(3)?,
        game_clock: row.get(4)?,
        game_time_utc: row.get(5)?,
        game_et: row.get(6)?,
        regulation_periods: row.get(7)?,
        series_game_number: row.get(8)?,
        series_text: row.get(9)?,
        last_updated: timestamp(row, 10)?,
    })
}

fn team_from_row(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        team_id: row.get(0)?,
        team_name: row.get(1)?,
        team_city: row.get(2)?,
        team_tricode: row.get(3)?,
        wins: row.get(4)?,
        losses: row.get(5)?,
    })
}

fn game_team_from_row(row: &Row) -> rusqlite::Result<GameTeam> {
    Ok(GameTeam {
        game_id: row.get(0)?,
        team_id: row.get(1)?,
        is_home: row.get(2)?,
        score: row.get(3)?,
        in_bonus: row.get(4)?,
        timeouts_remaining: row.get(5)?,
        points_period1: row.get(6)?,
        last_updated: timestamp(row, 7)?,
    })
}

fn player_from_row(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        player_id: row.get(0)?,
        game_id: row.get(1)?,
        team_id: row.get(2)?,
        jersey_num: row.get(3)?,
        name: row.get(4)?,
        position: row.get(5)?,
        starter: row.get(6)?,
        minutes: row.get(7)?,
        points: row.get(8)?,
        rebounds: row.get(9)?,
        assists: row.get(10)?,
        field_goals_made: row.get(11)?,
        field_goals_attempted: row.get(12)?,
        field_goals_percentage: row.get(13)?,
        three_pointers_made: row.get(14)?,
        three_pointers_attempted: row.get(15)?,
        free_throws_made: row.get(16)?,
        free_throws_attempted: row.get(17)?,
        plus_minus: row.get(18)?,
        last_updated: timestamp(row, 19)?,
    })
}
