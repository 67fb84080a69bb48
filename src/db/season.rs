use sqlx::{Executor, Sqlite};
use time::OffsetDateTime;

use crate::logic::{
    competition::season::Season,
    error::{LeagueError, Result},
    types::{Db, SeasonId},
};

impl Season {
    pub async fn fetch_from_db(db: &Db, id: SeasonId) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Season
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?)
    }

    // The season currently being played, if any.
    pub async fn fetch_active(db: &Db) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Season
            WHERE is_active = TRUE
            ORDER BY id DESC
            LIMIT 1"
        ).fetch_optional(db).await?)
    }

    // Save a new season. Only one season can be active at a time.
    pub async fn save(&self, db: &Db) -> Result<Self> {
        let mut tx = db.begin().await?;

        let active: Option<String> = sqlx::query_scalar(
            "SELECT name FROM Season
            WHERE is_active = TRUE"
        ).fetch_optional(&mut *tx).await?;
        if let Some(name) = active {
            return Err(LeagueError::invalid_state(format!("season {name} is still active, end it first")));
        }

        let season = sqlx::query_as(
            "INSERT INTO Season (name, start_date, end_date, is_active, is_playoffs, playoffs_started)
            VALUES ($1, $2, NULL, TRUE, FALSE, FALSE)
            RETURNING *"
        ).bind(self.name.as_str())
        .bind(self.start_date)
        .fetch_one(&mut *tx).await?;

        tx.commit().await?;
        Ok(season)
    }

    pub async fn end(db: &Db, id: SeasonId) -> Result<Self> {
        let season: Option<Self> = sqlx::query_as(
            "UPDATE Season SET is_active = FALSE, is_playoffs = FALSE, end_date = $2
            WHERE id = $1 AND is_active = TRUE
            RETURNING *"
        ).bind(id)
        .bind(OffsetDateTime::now_utc().date())
        .fetch_optional(db).await?;

        match season {
            Some(season) => Ok(season),
            None => match Self::fetch_from_db(db, id).await? {
                Some(season) => Err(LeagueError::invalid_state(format!("season {} has already ended", season.name))),
                None => Err(LeagueError::not_found("season", id)),
            },
        }
    }

    // Flip an active season over to the playoffs. Works only once per season.
    pub async fn mark_playoffs_started<'c, E: Executor<'c, Database = Sqlite>>(executor: E, id: SeasonId) -> Result<()> {
        let result = sqlx::query(
            "UPDATE Season SET is_playoffs = TRUE, playoffs_started = TRUE
            WHERE id = $1 AND is_active = TRUE AND playoffs_started = FALSE"
        ).bind(id)
        .execute(executor).await?;

        if result.rows_affected() == 0 {
            return Err(LeagueError::invalid_state(format!("playoffs of season {id} cannot be started")));
        }
        Ok(())
    }
}
