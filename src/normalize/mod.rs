//! Pure mappings from feed snapshots to table rows. Nothing here touches the
//! store; bad records are returned next to the good rows.

mod boxscore;
mod scoreboard;

pub use boxscore::{normalize_boxscore, BoxscoreRows};
pub use scoreboard::{normalize_scoreboard, ScoreboardRows};

use crate::error::RecordError;

/// Rows produced from one snapshot plus every record that was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub rows: T,
    pub errors: Vec<RecordError>,
}
