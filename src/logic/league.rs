// Run games and playoffs against a store.
use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use crate::logic::{
    competition::playoffs::{
        Bracket, plan_bracket,
        series::{Series, SeriesGameResult, SeriesOutcome, SeriesState, SeriesSummary},
    },
    error::{LeagueError, Result},
    game::{self, GameContext, SimulatedGame, rules::SimulationRules, score::Score},
    person::skills::{PartialSkills, Skills},
    ports::LeagueStore,
    team::Roster,
    types::{GameId, PlayerId, SeasonId, SeriesId, TeamId},
};

// A game that has been simulated and saved.
#[derive(Debug, Clone)]
pub struct PlayedGame {
    pub id: GameId,
    pub game: SimulatedGame,
}

// What a series simulator produced for one game.
#[derive(Debug, Clone)]
pub enum SeriesGame {
    // Only the final score, the series is the only thing saved.
    Score(Score),
    // A full game, saved together with the series update.
    Simulated(SimulatedGame),
}

impl SeriesGame {
    pub fn score(&self) -> Score {
        match self {
            SeriesGame::Score(score) => *score,
            SeriesGame::Simulated(game) => game.score,
        }
    }
}

// Plays one game of a series. Nothing is saved by the simulator itself.
#[async_trait]
pub trait SeriesGameSimulator: Send {
    async fn simulate_game(&mut self, home_id: TeamId, away_id: TeamId, series: &Series) -> Result<SeriesGame>;
}

pub struct League<S> {
    store: S,
    rules: SimulationRules,
}

// Basics.
impl<S: LeagueStore> League<S> {
    pub fn build(store: S, rules: SimulationRules) -> Self {
        Self { store, rules }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &SimulationRules {
        &self.rules
    }

    // Get the roster of a team with ratings attached.
    pub async fn roster(&self, team_id: TeamId) -> Result<Roster> {
        self.store.team(team_id).await?;
        let players = self.store.players_by_team(team_id).await?;
        Ok(Roster::build(team_id, players))
    }
}

// Functional.
impl<S: LeagueStore> League<S> {
    // Change some of the ratings of a player.
    pub async fn set_skills(&self, player_id: PlayerId, update: &PartialSkills) -> Result<Skills> {
        self.store.player(player_id).await?;
        let skills = update.apply(&self.store.player_skills(player_id).await?)?;
        self.store.set_player_skills(player_id, &skills).await?;
        Ok(skills)
    }

    // Simulate a game between two saved teams without saving it.
    pub async fn simulate_game<R: Rng + ?Sized>(&self, home_id: TeamId, away_id: TeamId, context: GameContext, rng: &mut R) -> Result<SimulatedGame> {
        if home_id == away_id {
            return Err(LeagueError::invalid_state(format!("team {home_id} cannot play against itself")));
        }

        let home = self.roster(home_id).await?;
        let away = self.roster(away_id).await?;
        game::simulate(rng, &home, &away, &self.rules, context.is_playoff)
    }

    // Simulate a game and save everything it produced.
    pub async fn play_game<R: Rng + ?Sized>(&self, home_id: TeamId, away_id: TeamId, context: GameContext, rng: &mut R) -> Result<PlayedGame> {
        let game = self.simulate_game(home_id, away_id, context, rng).await?;
        let id = self.store.commit_game(&game, context).await?;

        info!(
            game_id = id,
            home_team_id = home_id,
            away_team_id = away_id,
            home_score = game.score.home,
            away_score = game.score.away,
            overtime = game.overtime,
            playoff = context.is_playoff,
            "game played"
        );

        Ok(PlayedGame { id, game })
    }

    // Seed the playoffs from the top of the standings.
    pub async fn top_seeds(&self, count: usize) -> Result<Vec<TeamId>> {
        let standings = self.store.standings().await?;
        if standings.len() < count {
            return Err(LeagueError::invalid_state(format!("only {} teams in the league, {count} requested", standings.len())));
        }
        Ok(standings.iter().take(count).map(|team| team.id).collect())
    }

    // Build the whole bracket of a season from teams listed by seed.
    pub async fn start_playoffs(&self, season_id: SeasonId, teams: &[TeamId], best_of: u8) -> Result<Bracket> {
        if best_of == 0 || best_of % 2 == 0 {
            return Err(LeagueError::invalid_state(format!("series length must be an odd number, got {best_of}")));
        }

        let season = self.store.season(season_id).await?;
        season.check_can_start_playoffs()?;
        for team_id in teams {
            self.store.team(*team_id).await?;
        }

        let plan = plan_bracket(teams)?;
        let series = self.store.create_bracket(season_id, &plan, best_of).await?;
        let bracket = Bracket::build(season_id, series);

        info!(season_id, teams = teams.len(), rounds = bracket.total_rounds(), best_of, "playoffs started");
        Ok(bracket)
    }

    pub async fn bracket(&self, season_id: SeasonId) -> Result<Bracket> {
        self.store.season(season_id).await?;
        Ok(Bracket::build(season_id, self.store.series_by_season(season_id).await?))
    }

    // Register the winner of a single series game.
    pub async fn record_series_game(&self, series_id: SeriesId, winner_id: TeamId) -> Result<SeriesOutcome> {
        let series = self.store.record_series_win(series_id, winner_id).await?;
        let outcome = series.outcome();
        log_outcome(&outcome);
        Ok(outcome)
    }

    // Play out the rest of a series one game at a time.
    // Every game is saved together with the win it gives, or not at all.
    pub async fn simulate_full_series<G: SeriesGameSimulator + ?Sized>(&self, series_id: SeriesId, simulator: &mut G) -> Result<SeriesSummary> {
        let mut series = self.store.series(series_id).await?;
        match series.state() {
            SeriesState::Complete => return Err(LeagueError::invalid_state(format!("series {series_id} is already complete"))),
            SeriesState::Pending => return Err(LeagueError::invalid_state(format!("series {series_id} is still waiting for its teams"))),
            SeriesState::Ready | SeriesState::InProgress => {}
        }

        let mut results = Vec::new();
        while !series.is_complete {
            let game_number = series.games_played() + 1;
            let (home_id, away_id) = series.matchup_for_game(game_number)
                .ok_or_else(|| LeagueError::invalid_state(format!("series {series_id} is missing a team")))?;

            let played = simulator.simulate_game(home_id, away_id, &series).await?;
            let score = played.score();
            let winner_id = match score.home > score.away {
                true => home_id,
                false => away_id,
            };

            let game_id = match &played {
                SeriesGame::Score(_) => {
                    series = self.store.record_series_win(series_id, winner_id).await?;
                    None
                }
                SeriesGame::Simulated(game) => {
                    let context = GameContext::playoff(series.season_id);
                    let (game_id, updated) = self.store.commit_series_game(game, context, series_id, winner_id).await?;
                    series = updated;
                    Some(game_id)
                }
            };
            log_outcome(&series.outcome());

            results.push(SeriesGameResult {
                game_number,
                game_id,
                home_team_id: home_id,
                away_team_id: away_id,
                home_score: score.home,
                away_score: score.away,
                winner_id,
                series_score: series.score_line(),
            });
        }

        let winner_id = series.winner_id
            .ok_or_else(|| LeagueError::invalid_state(format!("series {series_id} finished without a winner")))?;

        Ok(SeriesSummary {
            series_id,
            final_score: series.score_line(),
            winner_id,
            is_championship: series.is_championship(),
            results,
        })
    }

    // A series simulator that plays real games with this league's rosters.
    pub fn series_simulator(&self, seed: Option<u64>) -> LeagueSeriesSimulator<'_, S> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        LeagueSeriesSimulator { league: self, rng }
    }
}

pub struct LeagueSeriesSimulator<'a, S> {
    league: &'a League<S>,
    rng: StdRng,
}

#[async_trait]
impl<'a, S: LeagueStore> SeriesGameSimulator for LeagueSeriesSimulator<'a, S> {
    async fn simulate_game(&mut self, home_id: TeamId, away_id: TeamId, series: &Series) -> Result<SeriesGame> {
        let game = self.league.simulate_game(home_id, away_id, GameContext::playoff(series.season_id), &mut self.rng).await?;
        Ok(SeriesGame::Simulated(game))
    }
}

fn log_outcome(outcome: &SeriesOutcome) {
    match (outcome.is_championship, outcome.is_complete, outcome.winner_id) {
        (true, _, Some(champion)) => info!(series_id = outcome.series_id, champion, "league champion decided"),
        (false, true, Some(winner)) => info!(series_id = outcome.series_id, winner, next_series_id = ?outcome.next_series_id, "series complete"),
        _ => {}
    }
}
