use std::path::PathBuf;

mod app;
mod config;
mod db;
mod error;
mod feed;
#[cfg(test)]
mod fixtures;
mod models;
mod normalize;

use app::App;
use config::Config;
use error::Result;

const USAGE: &str = "\
Usage: nba-live-stats [COMMAND]

Commands:
  (none)                       Poll the live feeds until interrupted
  --once                       Run a single poll cycle and exit
  --stats                      Print game, team and player counts
  --games                      List stored games with their scores
  --players <GAME_ID>          List stored player lines for a game
  --reset                      Drop and recreate every table
  --import-scoreboard <FILE>   Ingest a saved scoreboard snapshot
  --import-boxscore <FILE>     Ingest a saved boxscore snapshot
  --help                       Show this message";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str);
    let value = args.get(2).cloned();

    if command == Some("--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    // Load configuration
    let config = Config::load()?;

    // Open the store
    let app = App::new(&config).await?;

    match (command, value) {
        (None, _) => app.run().await?,
        (Some("--once"), _) => {
            let report = app.poll_once().await?;
            println!("Poll complete: {}", report);
        }
        (Some("--stats"), _) => {
            let stats = app.stats().await?;
            println!("Total Games Tracked: {}", stats.total_games);
            println!("Total Teams: {}", stats.total_teams);
            println!("Total Players: {}", stats.total_players);
        }
        (Some("--reset"), _) => {
            app.reset().await?;
            println!("Database cleared and tables recreated");
        }
        (Some("--games"), _) => print_games(&app).await?,
        (Some("--players"), Some(game_id)) => print_players(&app, &game_id).await?,
        (Some("--import-scoreboard"), Some(path)) => {
            let path = PathBuf::from(path);
            let report = app.import_scoreboard(&path).await?;
            println!("Imported scoreboard from {:?}: {}", path, report);
        }
        (Some("--import-boxscore"), Some(path)) => {
            let path = PathBuf::from(path);
            let report = app.import_boxscore(&path).await?;
            println!("Imported boxscore from {:?}: {}", path, report);
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn print_games(app: &App) -> Result<()> {
    for game in app.repository.get_games().await? {
        let mut line = format!("{}  {:<14}", game.game_id, game.status_text);
        for side in app.repository.get_game_teams(&game.game_id).await? {
            let tricode = app
                .repository
                .get_team(side.team_id)
                .await?
                .map(|team| team.team_tricode)
                .unwrap_or_else(|| side.team_id.to_string());
            let marker = if side.is_home { "home" } else { "away" };
            line.push_str(&format!("  {} {} ({})", tricode, side.score, marker));
        }
        println!("{}", line);
    }
    Ok(())
}

async fn print_players(app: &App, game_id: &str) -> Result<()> {
    let players = app.repository.get_players(game_id).await?;
    if players.is_empty() {
        println!("No player statistics stored for game {}", game_id);
        return Ok(());
    }

    println!("{:<28} {:>6} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7}", "PLAYER", "MIN", "PTS", "REB", "AST", "FG", "3P", "FT");
    for player in players {
        let name = if player.starter {
            format!("{} (S)", player.name)
        } else {
            player.name.clone()
        };
        println!(
            "{:<28} {:>6} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7}",
            name,
            player.minutes_display(),
            player.points,
            player.rebounds,
            player.assists,
            format!("{}-{}", player.field_goals_made, player.field_goals_attempted),
            format!("{}-{}", player.three_pointers_made, player.three_pointers_attempted),
            format!("{}-{}", player.free_throws_made, player.free_throws_attempted),
        );
    }
    Ok(())
}
