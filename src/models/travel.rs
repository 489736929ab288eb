use chrono::{DateTime, Utc};
use postgres_types::Json;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Lowest star a rating can hold.
pub const MIN_RATING: i32 = 1;
/// Highest star a rating can hold.
pub const MAX_RATING: i32 = 5;

/// The four per-category star ratings of a travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub mobility: i32,
    pub safety: i32,
    pub population: i32,
    pub vegetation: i32,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            mobility: MIN_RATING,
            safety: MIN_RATING,
            population: MIN_RATING,
            vegetation: MIN_RATING,
        }
    }
}

impl Ratings {
    /// Pulls every score into `[MIN_RATING, MAX_RATING]`.
    pub fn clamped(self) -> Self {
        let clamp = |score: i32| score.clamp(MIN_RATING, MAX_RATING);
        Self {
            mobility: clamp(self.mobility),
            safety: clamp(self.safety),
            population: clamp(self.population),
            vegetation: clamp(self.vegetation),
        }
    }

    /// The rounded mean of the four scores.
    pub fn average(&self) -> i32 {
        let sum = self.mobility + self.safety + self.population + self.vegetation;
        (sum as f64 / 4.0).round() as i32
    }
}

/// Represents a travel record with its owner's display name joined in.
#[derive(Debug, Clone, PartialEq)]
pub struct Travel {
    /// The unique identifier for the travel.
    pub id: Uuid,
    /// The owning user. Set at creation, never changed.
    pub user_id: Uuid,
    /// The owner's display name at read time.
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Non-negative cost; zero means "not specified".
    pub cost: f64,
    pub images: Vec<String>,
    pub cultural_sites: Vec<String>,
    pub places_to_visit: Vec<String>,
    pub ratings: Ratings,
    /// The timestamp when the travel was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for Travel {
    fn from(row: &Row) -> Self {
        let Json(ratings): Json<Ratings> = row.get("ratings");
        Self {
            id: row.get("id"),
            user_id: row.get("user_id"),
            user_name: row.get("user_name"),
            title: row.get("title"),
            description: row.get("description"),
            location: row.get("location"),
            cost: row.get("cost"),
            images: row.get("images"),
            cultural_sites: row.get("cultural_sites"),
            places_to_visit: row.get("places_to_visit"),
            ratings,
            created_at: row.get("created_at"),
        }
    }
}

/// The complete, already-normalised field set written on create and update.
///
/// Updates replace every field; there is no partial merge.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelFields {
    pub title: String,
    pub description: String,
    pub location: String,
    pub cost: f64,
    pub images: Vec<String>,
    pub cultural_sites: Vec<String>,
    pub places_to_visit: Vec<String>,
    pub ratings: Ratings,
}

/// The wire shape of a travel.
///
/// The owner fields are camelCase while the list fields keep their column
/// names; the single-page client reads exactly these keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelDto {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub cost: f64,
    pub images: Vec<String>,
    pub cultural_sites: Vec<String>,
    pub places_to_visit: Vec<String>,
    pub ratings: Ratings,
    pub created_at: DateTime<Utc>,
}

impl From<Travel> for TravelDto {
    fn from(travel: Travel) -> Self {
        Self {
            id: travel.id,
            user_id: travel.user_id,
            user_name: travel.user_name,
            title: travel.title,
            description: travel.description,
            location: travel.location,
            cost: travel.cost,
            images: travel.images,
            cultural_sites: travel.cultural_sites,
            places_to_visit: travel.places_to_visit,
            ratings: travel.ratings,
            created_at: travel.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_pulls_scores_into_range() {
        let ratings = Ratings {
            mobility: 0,
            safety: 7,
            population: 3,
            vegetation: -2,
        }
        .clamped();

        assert_eq!(
            ratings,
            Ratings {
                mobility: 1,
                safety: 5,
                population: 3,
                vegetation: 1,
            }
        );
    }

    #[test]
    fn average_rounds_to_nearest_star() {
        let ratings = Ratings {
            mobility: 5,
            safety: 4,
            population: 4,
            vegetation: 5,
        };
        assert_eq!(ratings.average(), 5);
        assert_eq!(Ratings::default().average(), 1);
    }

    #[test]
    fn dto_uses_client_field_names() {
        let dto = TravelDto {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            user_name: "Ann".into(),
            title: "Trip".into(),
            description: "d".into(),
            location: "l".into(),
            cost: 0.0,
            images: vec![],
            cultural_sites: vec!["Louvre".into()],
            places_to_visit: vec![],
            ratings: Ratings::default(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["userName"], "Ann");
        assert!(value.get("userId").is_some());
        assert_eq!(value["cultural_sites"][0], "Louvre");
        assert!(value.get("password_hash").is_none());
    }
}
