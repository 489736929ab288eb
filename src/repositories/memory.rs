use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        travel::{Travel, TravelFields},
        user::{NewUser, User},
    },
    repositories::{travel::TravelRepository, user::UserRepository},
};

/// A stored travel without the joined owner name.
#[derive(Debug, Clone)]
struct TravelRow {
    id: Uuid,
    user_id: Uuid,
    fields: TravelFields,
    created_at: chrono::DateTime<Utc>,
    /// Insertion order; breaks ties between identical timestamps.
    seq: u64,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    travels: Vec<TravelRow>,
    next_seq: u64,
}

impl Tables {
    fn owner_name(&self, user_id: Uuid) -> Result<String> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| user.name.clone())
            .ok_or_else(|| AppError::Internal(format!("Travel owner {} does not exist", user_id)))
    }

    fn join(&self, row: &TravelRow) -> Result<Travel> {
        Ok(Travel {
            id: row.id,
            user_id: row.user_id,
            user_name: self.owner_name(row.user_id)?,
            title: row.fields.title.clone(),
            description: row.fields.description.clone(),
            location: row.fields.location.clone(),
            cost: row.fields.cost,
            images: row.fields.images.clone(),
            cultural_sites: row.fields.cultural_sites.clone(),
            places_to_visit: row.fields.places_to_visit.clone(),
            ratings: row.fields.ratings,
            created_at: row.created_at,
        })
    }

    fn newest_first<'a>(&self, rows: impl Iterator<Item = &'a TravelRow>) -> Result<Vec<Travel>> {
        let mut rows: Vec<&TravelRow> = rows.collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        rows.into_iter().map(|row| self.join(row)).collect()
    }
}

/// An in-process store implementing both repositories over shared tables.
///
/// Used when no `DATABASE_URL` is configured and by the test suites. Each
/// call takes the lock once, so every operation is atomic on its own.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    /// Creates an empty `MemoryRepository`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|existing| existing.email == user.email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = User {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }
}

#[async_trait]
impl TravelRepository for MemoryRepository {
    async fn create(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel> {
        let mut tables = self.tables.write().await;

        // Mirrors the foreign key on travels.user_id.
        tables.owner_name(owner_id)?;

        let seq = tables.next_seq;
        tables.next_seq += 1;

        let row = TravelRow {
            id,
            user_id: owner_id,
            fields: fields.clone(),
            created_at: Utc::now(),
            seq,
        };
        let travel = tables.join(&row)?;
        tables.travels.push(row);

        Ok(travel)
    }

    async fn list_all(&self) -> Result<Vec<Travel>> {
        let tables = self.tables.read().await;
        tables.newest_first(tables.travels.iter())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Travel>> {
        let tables = self.tables.read().await;
        tables.newest_first(tables.travels.iter().filter(|row| row.user_id == owner_id))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Travel>> {
        let tables = self.tables.read().await;
        tables
            .travels
            .iter()
            .find(|row| row.id == id)
            .map(|row| tables.join(row))
            .transpose()
    }

    async fn update(&self, id: Uuid, owner_id: Uuid, fields: &TravelFields) -> Result<Travel> {
        let mut tables = self.tables.write().await;

        let index = tables
            .travels
            .iter()
            .position(|row| row.id == id && row.user_id == owner_id)
            .ok_or(AppError::TravelNotOwned)?;

        tables.travels[index].fields = fields.clone();
        tables.join(&tables.travels[index])
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;

        let index = tables
            .travels
            .iter()
            .position(|row| row.id == id && row.user_id == owner_id)
            .ok_or(AppError::TravelNotOwned)?;

        tables.travels.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::travel::Ratings;

    fn fields(title: &str) -> TravelFields {
        TravelFields {
            title: title.to_string(),
            description: "desc".to_string(),
            location: "somewhere".to_string(),
            cost: 0.0,
            images: vec![],
            cultural_sites: vec![],
            places_to_visit: vec![],
            ratings: Ratings::default(),
        }
    }

    async fn user(repo: &MemoryRepository, email: &str, name: &str) -> User {
        UserRepository::create(
            repo,
            NewUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_keeps_first_user() {
        let repo = MemoryRepository::new();
        let first = user(&repo, "a@example.com", "First").await;

        let second = UserRepository::create(
            &repo,
            NewUser {
                id: Uuid::new_v4(),
                email: "a@example.com".to_string(),
                password_hash: "other".to_string(),
                name: "Second".to_string(),
            },
        )
        .await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
        let stored = repo.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.name, "First");
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let repo = MemoryRepository::new();
        user(&repo, "Ann@example.com", "Ann").await;

        assert!(repo.find_by_email("ann@example.com").await.unwrap().is_none());
        assert!(repo.find_by_email("Ann@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn lists_are_newest_first_and_owner_filtered() {
        let repo = MemoryRepository::new();
        let ann = user(&repo, "ann@example.com", "Ann").await;
        let bob = user(&repo, "bob@example.com", "Bob").await;

        for (owner, title) in [(ann.id, "a1"), (bob.id, "b1"), (ann.id, "a2"), (bob.id, "b2")] {
            TravelRepository::create(&repo, Uuid::new_v4(), owner, &fields(title))
                .await
                .unwrap();
        }

        let all: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(all, vec!["b2", "a2", "b1", "a1"]);

        let mine = repo.list_by_owner(ann.id).await.unwrap();
        let titles: Vec<&str> = mine.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a2", "a1"]);
        assert!(mine.iter().all(|t| t.user_name == "Ann"));
    }

    #[tokio::test]
    async fn update_and_delete_require_ownership() {
        let repo = MemoryRepository::new();
        let ann = user(&repo, "ann@example.com", "Ann").await;
        let bob = user(&repo, "bob@example.com", "Bob").await;

        let travel = TravelRepository::create(&repo, Uuid::new_v4(), ann.id, &fields("Trip"))
            .await
            .unwrap();

        let hijack = repo.update(travel.id, bob.id, &fields("Mine now")).await;
        assert!(matches!(hijack, Err(AppError::TravelNotOwned)));
        assert!(matches!(
            repo.delete(travel.id, bob.id).await,
            Err(AppError::TravelNotOwned)
        ));
        assert!(matches!(
            repo.delete(Uuid::new_v4(), ann.id).await,
            Err(AppError::TravelNotOwned)
        ));

        let unchanged = repo.get_by_id(travel.id).await.unwrap().unwrap();
        assert_eq!(unchanged.title, "Trip");

        let updated = repo.update(travel.id, ann.id, &fields("Trip2")).await.unwrap();
        assert_eq!(updated.title, "Trip2");
        assert_eq!(updated.created_at, travel.created_at);

        repo.delete(travel.id, ann.id).await.unwrap();
        assert!(repo.get_by_id(travel.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_requires_existing_owner() {
        let repo = MemoryRepository::new();
        let result = TravelRepository::create(&repo, Uuid::new_v4(), Uuid::new_v4(), &fields("x")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
