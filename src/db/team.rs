use sqlx::{Executor, Sqlite};

use crate::logic::{
    error::{LeagueError, Result},
    game::{Side, stats::{Outcome, TeamDelta}},
    team::Team,
    types::{Db, TeamId},
};

impl Team {
    pub async fn fetch_from_db(db: &Db, id: TeamId) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Team
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?)
    }

    // Every team from best to worst. Points first, then wins.
    pub async fn fetch_standings(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Team
            ORDER BY (wins * 2 + ties) DESC, wins DESC, (goals_for - goals_against) DESC, id"
        ).fetch_all(db).await?)
    }

    pub async fn save(&self, db: &Db) -> Result<TeamId> {
        Ok(sqlx::query_scalar(
            "INSERT INTO Team (name, city, logo)
            VALUES ($1, $2, $3)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(self.city.as_str())
        .bind(self.logo.as_deref())
        .fetch_one(db).await?)
    }
}

// Add the result of one game to the record of a team.
pub async fn apply_result<'c, E: Executor<'c, Database = Sqlite>>(executor: E, delta: &TeamDelta) -> Result<()> {
    let won = (delta.outcome == Outcome::Win) as u32;
    let lost = (delta.outcome == Outcome::Loss) as u32;
    let tied = (delta.outcome == Outcome::Tie) as u32;
    let home = (delta.side == Side::Home) as u32;
    let away = 1 - home;

    let result = sqlx::query(
        "UPDATE Team SET
            wins = wins + $2,
            losses = losses + $3,
            ties = ties + $4,
            goals_for = goals_for + $5,
            goals_against = goals_against + $6,
            shots_for = shots_for + $7,
            shots_against = shots_against + $8,
            penalty_minutes = penalty_minutes + $9,
            home_wins = home_wins + $10,
            home_losses = home_losses + $11,
            away_wins = away_wins + $12,
            away_losses = away_losses + $13
        WHERE id = $1"
    ).bind(delta.team_id)
    .bind(won)
    .bind(lost)
    .bind(tied)
    .bind(delta.goals_for)
    .bind(delta.goals_against)
    .bind(delta.shots_for)
    .bind(delta.shots_against)
    .bind(delta.penalty_minutes)
    .bind(won * home)
    .bind(lost * home)
    .bind(won * away)
    .bind(lost * away)
    .execute(executor).await?;

    if result.rows_affected() == 0 {
        return Err(LeagueError::not_found("team", delta.team_id));
    }
    Ok(())
}
