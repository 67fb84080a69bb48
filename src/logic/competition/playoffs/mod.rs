// Single-elimination playoff brackets made of best-of-N series.
pub mod series;

use std::collections::{BTreeMap, HashSet};

use ordinal::ToOrdinal as _;
use serde::{Deserialize, Serialize};

use crate::logic::{
    competition::playoffs::series::Series,
    error::{LeagueError, Result},
    types::{RoundNumber, SeasonId, TeamId},
};

// A series of a bracket that has not been saved yet.
#[derive(Debug)]
#[derive(Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct PlannedSeries {
    pub round: RoundNumber,
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,

    // Index of the series the winner advances to.
    pub next: Option<usize>,
}

// Every series of a bracket, in the order they are created.
#[derive(Debug)]
#[derive(Default, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct BracketPlan {
    pub series: Vec<PlannedSeries>,
}

impl BracketPlan {
    pub fn rounds(&self) -> RoundNumber {
        self.series.iter().map(|s| s.round).max().unwrap_or(0)
    }

    pub fn round(&self, round: RoundNumber) -> Vec<&PlannedSeries> {
        self.series.iter().filter(|s| s.round == round).collect()
    }
}

// Lay out the bracket for teams given from the top seed down.
// The first round pairs the best remaining seed with the worst. Later rounds pair
// adjacent series, and an odd series left over gets a bye to the round after.
pub fn plan_bracket(teams: &[TeamId]) -> Result<BracketPlan> {
    if teams.len() < 2 || teams.len() % 2 != 0 {
        return Err(LeagueError::invalid_state(format!("playoffs need an even number of teams, at least 2, got {}", teams.len())));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = teams.iter().find(|id| !seen.insert(**id)) {
        return Err(LeagueError::invalid_state(format!("team {duplicate} is seeded more than once")));
    }

    let mut plan = BracketPlan::default();
    let count = teams.len();
    for i in 0..count / 2 {
        plan.series.push(PlannedSeries {
            round: 1,
            team1_id: Some(teams[i]),
            team2_id: Some(teams[count - 1 - i]),
            next: None,
        });
    }

    let mut feeders: Vec<usize> = (0..plan.series.len()).collect();
    let mut round: RoundNumber = 1;
    while feeders.len() > 1 {
        round += 1;
        let mut next_feeders = Vec::new();

        for pair in feeders.chunks(2) {
            let [first, second] = pair else {
                next_feeders.push(pair[0]);
                continue;
            };

            let index = plan.series.len();
            plan.series.push(PlannedSeries { round, team1_id: None, team2_id: None, next: None });
            plan.series[*first].next = Some(index);
            plan.series[*second].next = Some(index);
            next_feeders.push(index);
        }

        feeders = next_feeders;
    }

    Ok(plan)
}

// Generic name of a round based on how far it is from the final.
pub fn round_name(round: RoundNumber, total_rounds: RoundNumber, series_in_round: usize) -> String {
    let rounds_left = total_rounds.saturating_sub(round) + 1;

    match (rounds_left, series_in_round) {
        (1, 1) => "Final".to_string(),
        (2, 2) => "Semi Final".to_string(),
        (3, 4) => "Quarter Final".to_string(),
        _ => format!("{} Round", round.to_ordinal_string()),
    }
}

// The saved series of a season, by round.
#[derive(Debug)]
#[derive(Default, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Bracket {
    pub season_id: SeasonId,
    pub rounds: BTreeMap<RoundNumber, Vec<Series>>,
}

impl Bracket {
    pub fn build(season_id: SeasonId, series: Vec<Series>) -> Self {
        let mut rounds: BTreeMap<RoundNumber, Vec<Series>> = BTreeMap::new();
        for s in series {
            rounds.entry(s.round).or_default().push(s);
        }
        for round in rounds.values_mut() {
            round.sort_by_key(|s| s.id);
        }

        Self { season_id, rounds }
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn total_rounds(&self) -> RoundNumber {
        self.rounds.keys().next_back().copied().unwrap_or(0)
    }

    pub fn round_name(&self, round: RoundNumber) -> String {
        let series_in_round = self.rounds.get(&round).map(|r| r.len()).unwrap_or(0);
        round_name(round, self.total_rounds(), series_in_round)
    }

    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.rounds.values().flatten()
    }

    // The series with nowhere to advance to.
    pub fn championship(&self) -> Option<&Series> {
        self.series().find(|s| s.is_championship())
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.championship().and_then(|s| s.winner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairings(plan: &BracketPlan, round: RoundNumber) -> Vec<(Option<TeamId>, Option<TeamId>)> {
        plan.round(round).iter().map(|s| (s.team1_id, s.team2_id)).collect()
    }

    #[test]
    fn eight_teams_make_three_rounds() {
        let plan = plan_bracket(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        assert_eq!(plan.rounds(), 3);
        assert_eq!(plan.round(1).len(), 4);
        assert_eq!(plan.round(2).len(), 2);
        assert_eq!(plan.round(3).len(), 1);
        assert_eq!(pairings(&plan, 1), vec![
            (Some(1), Some(8)),
            (Some(2), Some(7)),
            (Some(3), Some(6)),
            (Some(4), Some(5)),
        ]);
        assert_eq!(pairings(&plan, 2), vec![(None, None), (None, None)]);

        // Adjacent series feed the same series of the next round.
        assert_eq!(plan.series[0].next, Some(4));
        assert_eq!(plan.series[1].next, Some(4));
        assert_eq!(plan.series[2].next, Some(5));
        assert_eq!(plan.series[3].next, Some(5));
        assert_eq!(plan.series[4].next, Some(6));
        assert_eq!(plan.series[5].next, Some(6));
        assert_eq!(plan.series[6].next, None);
    }

    #[test]
    fn odd_series_gets_a_bye() {
        let plan = plan_bracket(&[1, 2, 3, 4, 5, 6]).unwrap();

        // Three first round series, one second round series, then the final.
        assert_eq!(plan.series.len(), 5);
        assert_eq!(plan.series[0].next, Some(3));
        assert_eq!(plan.series[1].next, Some(3));
        assert_eq!(plan.series[2].next, Some(4));
        assert_eq!(plan.series[3].next, Some(4));
        assert_eq!(plan.series[4].round, 3);
        assert_eq!(plan.series.iter().filter(|s| s.next.is_none()).count(), 1);
    }

    #[test]
    fn two_teams_play_only_the_final() {
        let plan = plan_bracket(&[5, 9]).unwrap();
        assert_eq!(plan.series.len(), 1);
        assert_eq!(plan.series[0].next, None);
    }

    #[test]
    fn bad_team_counts_are_rejected() {
        assert!(plan_bracket(&[]).is_err());
        assert!(plan_bracket(&[1]).is_err());
        assert!(plan_bracket(&[1, 2, 3]).is_err());
        assert!(plan_bracket(&[1, 2, 2, 3]).is_err());
    }

    #[test]
    fn round_names_count_back_from_the_final() {
        assert_eq!(round_name(4, 4, 1), "Final");
        assert_eq!(round_name(3, 4, 2), "Semi Final");
        assert_eq!(round_name(2, 4, 4), "Quarter Final");
        assert_eq!(round_name(1, 4, 8), "1st Round");
        assert_eq!(round_name(1, 3, 3), "1st Round");
        assert_eq!(round_name(2, 3, 1), "2nd Round");
    }

    #[test]
    fn bracket_groups_series_by_round() {
        let mut final_series = Series::build(1, 2, Some(1), Some(2), 7);
        final_series.id = 3;
        final_series.winner_id = Some(2);
        final_series.is_complete = true;
        let semis = (1..=2).map(|id| Series { id, next_series_id: Some(3), ..Series::build(1, 1, Some(id), Some(id + 2), 7) });

        let bracket = Bracket::build(1, semis.chain([final_series]).collect());
        assert_eq!(bracket.total_rounds(), 2);
        assert_eq!(bracket.rounds[&1].len(), 2);
        assert_eq!(bracket.round_name(2), "Final");
        assert_eq!(bracket.round_name(1), "Semi Final");
        assert_eq!(bracket.champion(), Some(2));
    }
}
