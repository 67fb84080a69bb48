use std::{collections::HashMap, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use thiserror::Error;
use time::{Date, OffsetDateTime, macros::format_description};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use puck_league::{
    League, LeagueError,
    config::{Config, ConfigError},
    db::SqliteStore,
    logic::{
        competition::{playoffs::Bracket, season::Season},
        game::{GameContext, SimulatedGame, period_label, rules::SimulationRules},
        person::{player::{Player, position::Position}, skills::PartialSkills},
        ports::LeagueStore,
        team::Team,
        types::{PlayerId, SeasonId, SeriesId, TeamId},
    },
};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    League(#[from] LeagueError),

    #[error("{0}")]
    Input(String),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "puck-league")]
#[command(about = "Hockey league game simulation and playoff brackets")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./league.toml")]
    config: PathBuf,

    /// Database URL, overrides the configuration file
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a team to the league
    CreateTeam {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        logo: Option<String>,
    },

    /// Add a player, optionally to a team
    CreatePlayer {
        #[arg(long)]
        name: String,
        /// center, left wing, right wing, defenseman, goalie or their abbreviations
        #[arg(long)]
        position: String,
        #[arg(long)]
        team: Option<TeamId>,
        #[arg(long, default_value_t = 0)]
        number: u8,
        #[command(flatten)]
        skills: SkillArgs,
    },

    /// Change some of the ratings of a player
    SetSkills {
        #[arg(long)]
        player: PlayerId,
        #[command(flatten)]
        skills: SkillArgs,
    },

    /// Start a new season
    CreateSeason {
        #[arg(long)]
        name: String,
        /// Start date as YYYY-MM-DD, today by default
        #[arg(long)]
        start: Option<String>,
    },

    /// End a season, the active one by default
    EndSeason {
        #[arg(long)]
        season: Option<SeasonId>,
    },

    /// Simulate one game and save it
    SimulateGame {
        #[arg(long)]
        home: TeamId,
        #[arg(long)]
        away: TeamId,
        /// Playoff game, ties go to sudden-death overtime
        #[arg(long)]
        playoff: bool,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Build the playoff bracket of a season
    StartPlayoffs {
        #[arg(long)]
        season: Option<SeasonId>,
        /// Team ids from the top seed down
        #[arg(long, value_delimiter = ',', conflicts_with = "top")]
        teams: Vec<TeamId>,
        /// Seed the given number of teams from the standings
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        best_of: Option<u8>,
    },

    /// Register the winner of one game of a series
    RecordSeriesGame {
        #[arg(long)]
        series: SeriesId,
        #[arg(long)]
        winner: TeamId,
    },

    /// Simulate the rest of a series
    SimulateSeries {
        #[arg(long)]
        series: SeriesId,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the playoff bracket of a season
    Bracket {
        #[arg(long)]
        season: Option<SeasonId>,
    },

    /// Show a saved game with its events
    ShowGame {
        #[arg(long)]
        game: u32,
    },

    /// Show the league standings
    Standings,

    /// Show the statistics of a player
    PlayerStats {
        #[arg(long)]
        player: PlayerId,
    },

    /// Show the top playoff scorers of a season
    PlayoffLeaders {
        #[arg(long)]
        season: Option<SeasonId>,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[derive(clap::Args, Debug, Default)]
struct SkillArgs {
    #[arg(long)]
    skating: Option<u8>,
    #[arg(long)]
    shooting: Option<u8>,
    #[arg(long)]
    passing: Option<u8>,
    #[arg(long)]
    defense: Option<u8>,
    #[arg(long)]
    physical: Option<u8>,
    #[arg(long)]
    goaltending: Option<u8>,
}

impl SkillArgs {
    fn partial(&self) -> PartialSkills {
        PartialSkills {
            skating: self.skating,
            shooting: self.shooting,
            passing: self.passing,
            defense: self.defense,
            physical: self.physical,
            goaltending: self.goaltending,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log_level), cli.json_logs);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match json {
        true => registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init(),
        false => registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init(),
    }
}

async fn run(cli: Cli, config: Config) -> CliResult<()> {
    let url = cli.database_url.as_deref().unwrap_or(&config.database_url);
    let store = SqliteStore::connect(url, config.max_connections).await?;
    let league = League::build(store, config.simulation.clone());
    let json = cli.json;

    match cli.command {
        Commands::CreateTeam { name, city, logo } => {
            let team = Team { logo, ..Team::build(&name, &city) };
            let id = league.store().create_team(&team).await?;
            println!("Created team {} {} with id {id}", team.city, team.name);
        }

        Commands::CreatePlayer { name, position, team, number, skills } => {
            let position: Position = position.parse()?;
            let mut player = Player::build(0, &name, position, skills.partial().complete()?);
            player.team_id = team;
            player.number = number;

            let id = league.store().create_player(&player).await?;
            println!("Created {} {} (#{}) with id {id}", position, player.name, player.number);
        }

        Commands::SetSkills { player, skills } => {
            let update = skills.partial();
            if update.is_empty() {
                return Err(CliError::Input("give at least one rating to change".to_string()));
            }

            let skills = league.set_skills(player, &update).await?;
            print_output(json, &skills, || format!(
                "Skating {}, shooting {}, passing {}, defense {}, physical {}, goaltending {}",
                skills.skating, skills.shooting, skills.passing, skills.defense, skills.physical, skills.goaltending
            ));
        }

        Commands::CreateSeason { name, start } => {
            let start_date = match start {
                Some(text) => parse_date(&text)?,
                None => OffsetDateTime::now_utc().date(),
            };
            let season = league.store().create_season(&Season::build(&name, start_date)).await?;
            println!("Season {} started on {} with id {}", season.name, season.start_date, season.id);
        }

        Commands::EndSeason { season } => {
            let season_id = season_or_active(&league, season).await?;
            let season = league.store().end_season(season_id).await?;
            println!("Season {} is over", season.name);
        }

        Commands::SimulateGame { home, away, playoff, seed } => {
            let active = league.store().active_season().await?.map(|season| season.id);
            let context = match (playoff, active) {
                (true, Some(season_id)) => GameContext::playoff(season_id),
                (true, None) => GameContext { season_id: None, is_playoff: true },
                (false, season_id) => GameContext::regular(season_id),
            };

            let mut rng = seeded_rng(seed);
            let played = league.play_game(home, away, context, &mut rng).await?;
            let names = team_names(&league).await?;
            print_output(json, &played.game, || describe_game(&played.game, &names, league.rules()));
        }

        Commands::StartPlayoffs { season, teams, top, best_of } => {
            let season_id = season_or_active(&league, season).await?;
            let teams = match top {
                Some(count) => league.top_seeds(count).await?,
                None => teams,
            };

            let bracket = league.start_playoffs(season_id, &teams, best_of.unwrap_or(config.playoffs.best_of)).await?;
            let names = team_names(&league).await?;
            print_output(json, &bracket, || describe_bracket(&bracket, &names));
        }

        Commands::RecordSeriesGame { series, winner } => {
            let outcome = league.record_series_game(series, winner).await?;
            let names = team_names(&league).await?;
            print_output(json, &outcome, || match (outcome.is_championship, outcome.winner_id) {
                (true, Some(winner)) => format!("{} are the league champions!", name_of(&names, Some(winner))),
                (false, Some(winner)) => format!("{} win the series {}-{}", name_of(&names, Some(winner)), outcome.team1_wins, outcome.team2_wins),
                _ => format!("Series stands at {}-{}", outcome.team1_wins, outcome.team2_wins),
            });
        }

        Commands::SimulateSeries { series, seed } => {
            let mut simulator = league.series_simulator(seed);
            let summary = league.simulate_full_series(series, &mut simulator).await?;
            let names = team_names(&league).await?;

            print_output(json, &summary, || {
                let mut lines: Vec<String> = summary.results.iter().map(|game| format!(
                    "Game {}: {} at {} {} ({} win, series {})",
                    game.game_number,
                    name_of(&names, Some(game.away_team_id)),
                    name_of(&names, Some(game.home_team_id)),
                    game.score_line(),
                    name_of(&names, Some(game.winner_id)),
                    game.series_score,
                )).collect();

                lines.push(format!("{} win the series {}", name_of(&names, Some(summary.winner_id)), summary.final_score));
                if summary.is_championship {
                    lines.push(format!("{} are the league champions!", name_of(&names, Some(summary.winner_id))));
                }
                lines.join("\n")
            });
        }

        Commands::Bracket { season } => {
            let season_id = season_or_active(&league, season).await?;
            let bracket = league.bracket(season_id).await?;
            if bracket.is_empty() {
                return Err(CliError::Input(format!("season {season_id} has no playoff bracket")));
            }
            let names = team_names(&league).await?;
            print_output(json, &bracket, || describe_bracket(&bracket, &names));
        }

        Commands::ShowGame { game } => {
            let saved = league.store().game(game).await?;
            let events = league.store().game_events(game).await?;
            let names = team_names(&league).await?;

            print_output(json, &(&saved, &events), || {
                let mut lines = vec![format!(
                    "{} {} - {} {}{}",
                    name_of(&names, Some(saved.home_team_id)),
                    saved.home_score,
                    saved.away_score,
                    name_of(&names, Some(saved.away_team_id)),
                    if saved.overtime { " (OT)" } else { "" },
                )];
                lines.extend(events.iter().map(|event| format!(
                    "[{}] {} {}", period_label(event.period, league.rules()), event.time, event.description
                )));
                lines.join("\n")
            });
        }

        Commands::Standings => {
            let standings = league.store().standings().await?;
            print_output(json, &standings, || {
                standings.iter().enumerate().map(|(i, team)| format!(
                    "{:>2}. {:<30} {:>8} {:>4} pts  GF {} GA {}",
                    i + 1, team.full_name(), team.record(), team.points(), team.goals_for, team.goals_against,
                )).collect::<Vec<String>>().join("\n")
            });
        }

        Commands::PlayerStats { player } => {
            let stats = league.store().player_stats(player).await?;
            print_output(json, &stats, || format!(
                "GP {} G {} A {} P {} +/- {} S {} H {} B {} PIM {} SV {} GA {} SO {}",
                stats.games_played, stats.goals, stats.assists, stats.points(), stats.plus_minus, stats.shots,
                stats.hits, stats.blocks, stats.penalty_minutes, stats.saves, stats.goals_against, stats.shutouts,
            ));
        }

        Commands::PlayoffLeaders { season, limit } => {
            let season_id = season_or_active(&league, season).await?;
            let leaders = league.store().playoff_leaders(season_id, limit).await?;
            print_output(json, &leaders, || {
                leaders.iter().enumerate().map(|(i, leader)| format!(
                    "{:>2}. {:<25} GP {} G {} A {} P {}",
                    i + 1, leader.name, leader.games_played, leader.goals, leader.assists, leader.points(),
                )).collect::<Vec<String>>().join("\n")
            });
        }
    }

    Ok(())
}

fn print_output<T: serde::Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(output) => println!("{output}"),
            Err(e) => tracing::error!("could not serialise output: {e}"),
        }
    }
    else {
        println!("{}", text());
    }
}

fn parse_date(text: &str) -> CliResult<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|e| CliError::Input(format!("invalid date {text}: {e}")))
}

fn seeded_rng(seed: Option<u64>) -> rand::rngs::StdRng {
    use rand::SeedableRng as _;
    match seed {
        Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
        None => rand::rngs::StdRng::from_os_rng(),
    }
}

async fn season_or_active(league: &League<SqliteStore>, season: Option<SeasonId>) -> CliResult<SeasonId> {
    match season {
        Some(id) => Ok(id),
        None => match league.store().active_season().await? {
            Some(season) => Ok(season.id),
            None => Err(CliError::Input("there is no active season, pass --season".to_string())),
        },
    }
}

async fn team_names(league: &League<SqliteStore>) -> CliResult<HashMap<TeamId, String>> {
    let teams = league.store().standings().await?;
    Ok(teams.into_iter().map(|team| (team.id, team.full_name())).collect())
}

fn name_of(names: &HashMap<TeamId, String>, id: Option<TeamId>) -> String {
    match id {
        Some(id) => names.get(&id).cloned().unwrap_or_else(|| format!("Team {id}")),
        None => "TBD".to_string(),
    }
}

fn describe_game(game: &SimulatedGame, names: &HashMap<TeamId, String>, rules: &SimulationRules) -> String {
    let box_score = game.box_score();
    let mut lines = vec![format!(
        "{} {} - {} {}{}",
        name_of(names, Some(game.home_team_id)),
        game.score.home,
        game.score.away,
        name_of(names, Some(game.away_team_id)),
        if game.overtime { " (OT)" } else { "" },
    )];

    lines.push("Scoring:".to_string());
    for goal in game.scoring_summary() {
        lines.push(format!("  [{}] {} {}", period_label(goal.period, rules), goal.time, goal.description));
    }

    lines.push(format!(
        "Shots {}-{}  Hits {}-{}  Blocks {}-{}  PIM {}-{}",
        box_score.home.shots, box_score.away.shots,
        box_score.home.hits, box_score.away.hits,
        box_score.home.blocked_shots, box_score.away.blocked_shots,
        box_score.home.penalty_minutes, box_score.away.penalty_minutes,
    ));
    lines.join("\n")
}

fn describe_bracket(bracket: &Bracket, names: &HashMap<TeamId, String>) -> String {
    let mut lines = Vec::new();
    for (round, series) in bracket.rounds.iter() {
        lines.push(bracket.round_name(*round));
        for s in series {
            lines.push(format!(
                "  [{}] {} vs {}  {}{}",
                s.id,
                name_of(names, s.team1_id),
                name_of(names, s.team2_id),
                s.score_line(),
                if s.is_complete { format!(", {} advance", name_of(names, s.winner_id)) } else { String::new() },
            ));
        }
    }

    if let Some(champion) = bracket.champion() {
        lines.push(format!("Champion: {}", name_of(names, Some(champion))));
    }
    lines.join("\n")
}
