use async_trait::async_trait;
use deadpool_postgres::Pool;
use postgres_types::Json;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::travel::{Travel, TravelFields},
};

/// Persistence for travel records.
///
/// Every read joins the owner's display name. Lists are newest first and
/// unbounded. Update and delete only match a row with both the given ID and
/// the given owner; anything else is `AppError::TravelNotOwned`, so callers
/// cannot tell a foreign travel from a missing one.
#[async_trait]
pub trait TravelRepository: Send + Sync {
    /// Inserts a travel owned by `owner_id`.
    async fn create(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel>;

    /// Every travel, newest first.
    async fn list_all(&self) -> Result<Vec<Travel>>;

    /// The travels of one owner, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Travel>>;

    /// A single travel.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Travel>>;

    /// Replaces every field of an owned travel.
    async fn update(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel>;

    /// Removes an owned travel.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()>;
}

/// Expands to one string literal selecting the travel columns from `t`,
/// joined to its owner `u`, followed by any extra clauses. The `with` form
/// first binds `t` to the rows returned by a data-modifying statement.
macro_rules! select_travel {
    (with $cte:literal) => {
        concat!("WITH t AS (", $cte, " RETURNING *) ", select_travel!("t"))
    };
    ($from:literal $(, $rest:literal)*) => {
        concat!(
            "SELECT t.id, t.user_id, u.name AS user_name, t.title, t.description, ",
            "t.location, t.cost, t.images, t.cultural_sites, t.places_to_visit, ",
            "t.ratings, t.created_at FROM ",
            $from,
            " JOIN users u ON u.id = t.user_id"
            $(, " ", $rest)*
        )
    };
}

const INSERT_TRAVEL: &str = select_travel!(
    with "INSERT INTO travels \
     (id, user_id, title, description, location, cost, \
     images, cultural_sites, places_to_visit, ratings) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
);

// Equal timestamps fall back to the ID so repeated listings agree.
const LIST_ALL: &str = select_travel!("travels t", "ORDER BY t.created_at DESC, t.id DESC");

const LIST_BY_OWNER: &str = select_travel!(
    "travels t",
    "WHERE t.user_id = $1",
    "ORDER BY t.created_at DESC, t.id DESC"
);

const GET_BY_ID: &str = select_travel!("travels t", "WHERE t.id = $1");

const UPDATE_TRAVEL: &str = select_travel!(
    with "UPDATE travels \
     SET title = $3, description = $4, location = $5, cost = $6, \
     images = $7, cultural_sites = $8, places_to_visit = $9, ratings = $10 \
     WHERE id = $1 AND user_id = $2"
);

/// The PostgreSQL-backed travel repository.
#[derive(Clone)]
pub struct PgTravelRepository {
    pool: Pool,
}

impl PgTravelRepository {
    /// Creates a new `PgTravelRepository`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TravelRepository for PgTravelRepository {
    async fn create(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_TRAVEL).await?;

        let row = client
            .query_one(
                &statement,
                &[
                    &id,
                    &owner_id,
                    &fields.title,
                    &fields.description,
                    &fields.location,
                    &fields.cost,
                    &fields.images,
                    &fields.cultural_sites,
                    &fields.places_to_visit,
                    &Json(fields.ratings),
                ],
            )
            .await?;

        Ok(Travel::from(&row))
    }

    async fn list_all(&self) -> Result<Vec<Travel>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(LIST_ALL).await?;

        let rows = client.query(&statement, &[]).await?;
        Ok(rows.iter().map(Travel::from).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Travel>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(LIST_BY_OWNER).await?;

        let rows = client.query(&statement, &[&owner_id]).await?;
        Ok(rows.iter().map(Travel::from).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Travel>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(GET_BY_ID).await?;

        let row = client.query_opt(&statement, &[&id]).await?;
        Ok(row.as_ref().map(Travel::from))
    }

    async fn update(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(UPDATE_TRAVEL).await?;

        let row = client
            .query_opt(
                &statement,
                &[
                    &id,
                    &owner_id,
                    &fields.title,
                    &fields.description,
                    &fields.location,
                    &fields.cost,
                    &fields.images,
                    &fields.cultural_sites,
                    &fields.places_to_visit,
                    &Json(fields.ratings),
                ],
            )
            .await?
            .ok_or(AppError::TravelNotOwned)?;

        Ok(Travel::from(&row))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("DELETE FROM travels WHERE id = $1 AND user_id = $2")
            .await?;

        let deleted = client.execute(&statement, &[&id, &owner_id]).await?;
        if deleted == 0 {
            return Err(AppError::TravelNotOwned);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listings_break_timestamp_ties_by_id() {
        for query in [LIST_ALL, LIST_BY_OWNER] {
            assert!(query.ends_with("ORDER BY t.created_at DESC, t.id DESC"));
        }
    }

    #[test]
    fn writes_return_the_joined_row() {
        assert_eq!(
            INSERT_TRAVEL,
            "WITH t AS (INSERT INTO travels \
             (id, user_id, title, description, location, cost, \
             images, cultural_sites, places_to_visit, ratings) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *) \
             SELECT t.id, t.user_id, u.name AS user_name, t.title, t.description, \
             t.location, t.cost, t.images, t.cultural_sites, t.places_to_visit, \
             t.ratings, t.created_at FROM t JOIN users u ON u.id = t.user_id"
        );
        assert!(UPDATE_TRAVEL.starts_with("WITH t AS (UPDATE travels SET"));
        assert!(UPDATE_TRAVEL.contains("WHERE id = $1 AND user_id = $2 RETURNING *)"));
        assert!(GET_BY_ID.ends_with("JOIN users u ON u.id = t.user_id WHERE t.id = $1"));
    }
}
