mod game;
mod player;
mod stats;

pub use game::{Game, GameStatus, GameTeam, Team};
pub use player::Player;
pub use stats::DatabaseStats;
