use futures::TryStreamExt as _;
use sqlx::{
    Decode, Encode, Executor, FromRow, Row, Sqlite,
    encode::IsNull, error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteRow, SqliteTypeInfo, SqliteValueRef},
};
use time::OffsetDateTime;

use crate::logic::{
    error::Result,
    game::{Game, GameContext, SimulatedGame, event::{Event, GameTime, Infraction, Penalty}},
    types::{Db, GameId},
};

// Game clock times are stored as "m:ss" text.
impl sqlx::Type<Sqlite> for GameTime {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'q> Encode<'q, Sqlite> for GameTime {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> std::result::Result<IsNull, BoxDynError> {
        Encode::<Sqlite>::encode(self.to_string(), buf)
    }
}

impl<'r> Decode<'r, Sqlite> for GameTime {
    fn decode(value: SqliteValueRef<'r>) -> std::result::Result<Self, BoxDynError> {
        let text = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(text.parse()?)
    }
}

impl FromRow<'_, SqliteRow> for Event {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let infraction: Option<Infraction> = row.try_get("infraction")?;
        let minutes: Option<u8> = row.try_get("penalty_minutes")?;

        Ok(Self {
            kind: row.try_get("kind")?,
            side: row.try_get("side")?,
            player_id: row.try_get("player_id")?,
            secondary_id: row.try_get("secondary_id")?,
            period: row.try_get("period")?,
            time: row.try_get("time")?,
            penalty: infraction.zip(minutes).map(|(infraction, minutes)| Penalty { infraction, minutes }),
            description: row.try_get("description")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for Game {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            season_id: row.try_get("season_id")?,
            home_team_id: row.try_get("home_team_id")?,
            away_team_id: row.try_get("away_team_id")?,
            home_score: row.try_get("home_score")?,
            away_score: row.try_get("away_score")?,
            played: row.try_get("played")?,
            is_playoff: row.try_get("is_playoff")?,
            overtime: row.try_get("overtime")?,
            played_at: row.try_get("played_at")?,
        })
    }
}

impl Game {
    pub async fn fetch_from_db(db: &Db, id: GameId) -> Result<Option<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM Game
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?)
    }

    // Get every event of a game in the order it was written.
    pub async fn fetch_events(db: &Db, id: GameId) -> Result<Vec<Event>> {
        let mut rows = sqlx::query_as::<_, Event>(
            "SELECT * FROM GameEvent
            WHERE game_id = $1
            ORDER BY id"
        ).bind(id)
        .fetch(db);

        let mut events = Vec::new();
        while let Some(event) = rows.try_next().await? {
            events.push(event);
        }
        Ok(events)
    }
}

// Save the final score of a played game.
pub async fn save_result<'c, E: Executor<'c, Database = Sqlite>>(executor: E, game: &SimulatedGame, context: GameContext) -> Result<GameId> {
    Ok(sqlx::query_scalar(
        "INSERT INTO Game
        (season_id, home_team_id, away_team_id, home_score, away_score, played, is_playoff, overtime, played_at)
        VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7, $8)
        RETURNING id"
    ).bind(context.season_id)
    .bind(game.home_team_id)
    .bind(game.away_team_id)
    .bind(game.score.home)
    .bind(game.score.away)
    .bind(context.is_playoff)
    .bind(game.overtime)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(executor).await?)
}

pub async fn save_event<'c, E: Executor<'c, Database = Sqlite>>(executor: E, game_id: GameId, event: &Event) -> Result<()> {
    sqlx::query(
        "INSERT INTO GameEvent
        (game_id, kind, side, player_id, secondary_id, period, time, infraction, penalty_minutes, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
    ).bind(game_id)
    .bind(event.kind)
    .bind(event.side)
    .bind(event.player_id)
    .bind(event.secondary_id)
    .bind(event.period)
    .bind(event.time)
    .bind(event.penalty.map(|p| p.infraction))
    .bind(event.penalty.map(|p| p.minutes))
    .bind(event.description.as_str())
    .execute(executor).await?;

    Ok(())
}
