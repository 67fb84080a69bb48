use sqlx::{Executor, FromRow, Row, Sqlite, sqlite::SqliteRow};

use crate::logic::{
    error::Result,
    game::stats::StatDelta,
    person::{player::{Player, PlayerStats, PlayoffLeader}, skills::Skills},
    types::{Db, PlayerId, SeasonId, TeamId},
};

impl FromRow<'_, SqliteRow> for Player {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            position: row.try_get("position")?,
            number: row.try_get("number")?,
            team_id: row.try_get("team_id")?,
            skills: Skills::from_row(row)?,
        })
    }
}

impl Player {
    // Missing ratings are filled in with the default here, so nothing downstream has to.
    const SELECT_QUERY: &str = "
    SELECT Player.*,
        COALESCE(PlayerSkills.skating, 50) AS skating,
        COALESCE(PlayerSkills.shooting, 50) AS shooting,
        COALESCE(PlayerSkills.passing, 50) AS passing,
        COALESCE(PlayerSkills.defense, 50) AS defense,
        COALESCE(PlayerSkills.physical, 50) AS physical,
        COALESCE(PlayerSkills.goaltending, 50) AS goaltending
    FROM Player
    LEFT JOIN PlayerSkills ON PlayerSkills.player_id = Player.id";

    pub async fn fetch_from_db(db: &Db, id: PlayerId) -> Result<Option<Self>> {
        let query = Self::SELECT_QUERY;
        Ok(sqlx::query_as(format!("
            {query}
            WHERE Player.id = $1"
        ).as_str())
        .bind(id)
        .fetch_optional(db).await?)
    }

    // Get every player of a team in a stable order.
    pub async fn fetch_team(db: &Db, team_id: TeamId) -> Result<Vec<Self>> {
        let query = Self::SELECT_QUERY;
        Ok(sqlx::query_as(format!("
            {query}
            WHERE Player.team_id = $1
            ORDER BY Player.id"
        ).as_str())
        .bind(team_id)
        .fetch_all(db).await?)
    }

    // Save a new player along with the ratings.
    pub async fn save(&self, db: &Db) -> Result<PlayerId> {
        let mut tx = db.begin().await?;

        let id = sqlx::query_scalar(
            "INSERT INTO Player (name, position, number, team_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(self.position)
        .bind(self.number)
        .bind(self.team_id)
        .fetch_one(&mut *tx).await?;

        save_skills(&mut *tx, id, &self.skills).await?;
        tx.commit().await?;

        Ok(id)
    }
}

pub async fn fetch_skills(db: &Db, player_id: PlayerId) -> Result<Option<Skills>> {
    Ok(sqlx::query_as(
        "SELECT skating, shooting, passing, defense, physical, goaltending FROM PlayerSkills
        WHERE player_id = $1"
    ).bind(player_id)
    .fetch_optional(db).await?)
}

pub async fn save_skills<'c, E: Executor<'c, Database = Sqlite>>(executor: E, player_id: PlayerId, skills: &Skills) -> Result<()> {
    sqlx::query(
        "INSERT INTO PlayerSkills (player_id, skating, shooting, passing, defense, physical, goaltending)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (player_id) DO UPDATE SET
            skating = excluded.skating,
            shooting = excluded.shooting,
            passing = excluded.passing,
            defense = excluded.defense,
            physical = excluded.physical,
            goaltending = excluded.goaltending"
    ).bind(player_id)
    .bind(skills.skating)
    .bind(skills.shooting)
    .bind(skills.passing)
    .bind(skills.defense)
    .bind(skills.physical)
    .bind(skills.goaltending)
    .execute(executor).await?;

    Ok(())
}

// Add a stat delta to the running totals of a player in one statement.
pub async fn apply_stat_delta<'c, E: Executor<'c, Database = Sqlite>>(executor: E, player_id: PlayerId, delta: &StatDelta) -> Result<()> {
    if delta.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO PlayerStats
        (player_id, games_played, goals, assists, shots, hits, blocks, penalty_minutes, plus_minus, saves, goals_against, shutouts)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (player_id) DO UPDATE SET
            games_played = games_played + excluded.games_played,
            goals = goals + excluded.goals,
            assists = assists + excluded.assists,
            shots = shots + excluded.shots,
            hits = hits + excluded.hits,
            blocks = blocks + excluded.blocks,
            penalty_minutes = penalty_minutes + excluded.penalty_minutes,
            plus_minus = plus_minus + excluded.plus_minus,
            saves = saves + excluded.saves,
            goals_against = goals_against + excluded.goals_against,
            shutouts = shutouts + excluded.shutouts"
    ).bind(player_id)
    .bind(delta.games_played)
    .bind(delta.goals)
    .bind(delta.assists)
    .bind(delta.shots)
    .bind(delta.hits)
    .bind(delta.blocks)
    .bind(delta.penalty_minutes)
    .bind(delta.plus_minus)
    .bind(delta.saves)
    .bind(delta.goals_against)
    .bind(delta.shutouts)
    .execute(executor).await?;

    Ok(())
}

impl PlayerStats {
    // Players who have not played yet have all zeroes.
    pub async fn fetch_from_db(db: &Db, player_id: PlayerId) -> Result<Self> {
        let stats: Option<Self> = sqlx::query_as(
            "SELECT * FROM PlayerStats
            WHERE player_id = $1"
        ).bind(player_id)
        .fetch_optional(db).await?;

        Ok(stats.unwrap_or(Self { player_id, ..Default::default() }))
    }
}

impl PlayoffLeader {
    // Top scorers of the playoff games of a season.
    pub async fn fetch_season(db: &Db, season_id: SeasonId, limit: u32) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT Player.id AS player_id, Player.name, Player.team_id,
                COUNT(DISTINCT Credit.game_id) AS games_played,
                SUM(Credit.is_goal) AS goals,
                SUM(1 - Credit.is_goal) AS assists
            FROM (
                SELECT GameEvent.game_id, GameEvent.player_id, 1 AS is_goal FROM GameEvent
                WHERE GameEvent.kind = 'goal'
                UNION ALL
                SELECT GameEvent.game_id, GameEvent.secondary_id, 0 AS is_goal FROM GameEvent
                WHERE GameEvent.kind = 'goal' AND GameEvent.secondary_id IS NOT NULL
            ) Credit
            INNER JOIN Game ON Game.id = Credit.game_id
            INNER JOIN Player ON Player.id = Credit.player_id
            WHERE Game.season_id = $1 AND Game.is_playoff = TRUE
            GROUP BY Player.id
            ORDER BY (goals + assists) DESC, goals DESC, Player.id
            LIMIT $2"
        ).bind(season_id)
        .bind(limit)
        .fetch_all(db).await?)
    }
}
