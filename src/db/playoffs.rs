use sqlx::{Executor, FromRow, Row, Sqlite, SqliteConnection, sqlite::SqliteRow};

use crate::logic::{
    competition::{playoffs::{BracketPlan, series::Series}, season::Season},
    error::{LeagueError, Result},
    types::{Db, SeasonId, SeriesId, TeamId},
};

impl FromRow<'_, SqliteRow> for Series {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            season_id: row.try_get("season_id")?,
            round: row.try_get("round")?,
            team1_id: row.try_get("team1_id")?,
            team2_id: row.try_get("team2_id")?,
            team1_wins: row.try_get("team1_wins")?,
            team2_wins: row.try_get("team2_wins")?,
            best_of: row.try_get("best_of")?,
            is_complete: row.try_get("is_complete")?,
            winner_id: row.try_get("winner_id")?,
            next_series_id: row.try_get("next_series_id")?,
        })
    }
}

impl Series {
    pub async fn fetch_from_db<'c, E: Executor<'c, Database = Sqlite>>(executor: E, id: SeriesId) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM PlayoffSeries
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(executor).await?)
    }

    pub async fn fetch_season<'c, E: Executor<'c, Database = Sqlite>>(executor: E, season_id: SeasonId) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM PlayoffSeries
            WHERE season_id = $1
            ORDER BY round, id"
        ).bind(season_id)
        .fetch_all(executor).await?)
    }

    pub async fn save<'c, E: Executor<'c, Database = Sqlite>>(&self, executor: E) -> Result<SeriesId> {
        Ok(sqlx::query_scalar(
            "INSERT INTO PlayoffSeries
            (season_id, round, team1_id, team2_id, team1_wins, team2_wins, best_of, is_complete, winner_id, next_series_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id"
        ).bind(self.season_id)
        .bind(self.round)
        .bind(self.team1_id)
        .bind(self.team2_id)
        .bind(self.team1_wins)
        .bind(self.team2_wins)
        .bind(self.best_of)
        .bind(self.is_complete)
        .bind(self.winner_id)
        .bind(self.next_series_id)
        .fetch_one(executor).await?)
    }
}

pub async fn link<'c, E: Executor<'c, Database = Sqlite>>(executor: E, series_id: SeriesId, next_series_id: SeriesId) -> Result<()> {
    let result = sqlx::query(
        "UPDATE PlayoffSeries SET next_series_id = $2
        WHERE id = $1"
    ).bind(series_id)
    .bind(next_series_id)
    .execute(executor).await?;

    if result.rows_affected() == 0 {
        return Err(LeagueError::not_found("playoff series", series_id));
    }
    Ok(())
}

// Put a team into the first open slot of a series, team 1 before team 2.
// The check and the write are one statement, so two feeders finishing at once cannot claim the same slot.
// Returns None when the series does not exist or both slots are already taken.
pub async fn fill_slot<'c, E: Executor<'c, Database = Sqlite>>(executor: E, series_id: SeriesId, team_id: TeamId) -> Result<Option<Series>> {
    Ok(sqlx::query_as(
        "UPDATE PlayoffSeries SET
            team1_id = CASE WHEN team1_id IS NULL THEN $2 ELSE team1_id END,
            team2_id = CASE WHEN team1_id IS NOT NULL AND team2_id IS NULL THEN $2 ELSE team2_id END
        WHERE id = $1 AND (team1_id IS NULL OR team2_id IS NULL)
        RETURNING *"
    ).bind(series_id)
    .bind(team_id)
    .fetch_optional(executor).await?)
}

// Credit one game to a team, settle the series and advance its winner.
// Meant to run inside a transaction. The increment is its first statement on the series,
// so the row is write-locked before anything is read back from it.
pub async fn record_win(conn: &mut SqliteConnection, series_id: SeriesId, winner_id: TeamId) -> Result<Series> {
    let series: Option<Series> = sqlx::query_as(
        "UPDATE PlayoffSeries SET
            team1_wins = team1_wins + CASE WHEN team1_id = $2 THEN 1 ELSE 0 END,
            team2_wins = team2_wins + CASE WHEN team2_id = $2 THEN 1 ELSE 0 END
        WHERE id = $1 AND is_complete = FALSE AND (team1_id = $2 OR team2_id = $2)
        RETURNING *"
    ).bind(series_id)
    .bind(winner_id)
    .fetch_optional(&mut *conn).await?;

    let Some(mut series) = series else {
        return Err(match Series::fetch_from_db(&mut *conn, series_id).await? {
            Some(series) => match series.check_can_win(winner_id) {
                Err(e) => e,
                Ok(()) => LeagueError::invalid_state(format!("series {series_id} could not be updated")),
            },
            None => LeagueError::not_found("playoff series", series_id),
        });
    };

    if series.settle() {
        sqlx::query(
            "UPDATE PlayoffSeries SET is_complete = TRUE, winner_id = $2
            WHERE id = $1"
        ).bind(series.id)
        .bind(series.winner_id)
        .execute(&mut *conn).await?;

        if let (Some(winner_id), Some(next_id)) = (series.winner_id, series.next_series_id) {
            if fill_slot(&mut *conn, next_id, winner_id).await?.is_none() {
                return Err(LeagueError::invalid_state(format!("series {next_id} has no open slot for team {winner_id}")));
            }
        }
    }

    Ok(series)
}

// Save every series of a planned bracket and start the playoffs of the season, all or nothing.
pub async fn save_bracket(db: &Db, season_id: SeasonId, plan: &BracketPlan, best_of: u8) -> Result<Vec<Series>> {
    let mut tx = db.begin().await?;

    let mut ids = Vec::with_capacity(plan.series.len());
    for planned in plan.series.iter() {
        let series = Series::build(season_id, planned.round, planned.team1_id, planned.team2_id, best_of);
        ids.push(series.save(&mut *tx).await?);
    }

    for (i, planned) in plan.series.iter().enumerate() {
        if let Some(next) = planned.next {
            link(&mut *tx, ids[i], ids[next]).await?;
        }
    }

    Season::mark_playoffs_started(&mut *tx, season_id).await?;
    let series = Series::fetch_season(&mut *tx, season_id).await?;

    tx.commit().await?;
    Ok(series)
}
