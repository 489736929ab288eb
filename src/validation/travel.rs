use garde::Validate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::travel::{Ratings, TravelFields, MIN_RATING};
use crate::validation::auth::non_blank;

/// Star scores as submitted. Missing scores fall back to the minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingsInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetation: Option<i32>,
}

impl From<Ratings> for RatingsInput {
    fn from(ratings: Ratings) -> Self {
        Self {
            mobility: Some(ratings.mobility),
            safety: Some(ratings.safety),
            population: Some(ratings.population),
            vegetation: Some(ratings.vegetation),
        }
    }
}

impl RatingsInput {
    fn resolve(self) -> Ratings {
        Ratings {
            mobility: self.mobility.unwrap_or(MIN_RATING),
            safety: self.safety.unwrap_or(MIN_RATING),
            population: self.population.unwrap_or(MIN_RATING),
            vegetation: self.vegetation.unwrap_or(MIN_RATING),
        }
        .clamped()
    }
}

/// The body of travel create and update requests.
///
/// Update takes the same complete field set as create; the defaulting
/// rules are applied identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TravelPayload {
    #[serde(default)]
    #[garde(custom(non_blank))]
    pub title: String,

    #[serde(default)]
    #[garde(custom(non_blank))]
    pub description: String,

    #[serde(default)]
    #[garde(custom(non_blank))]
    pub location: String,

    #[serde(
        default,
        deserialize_with = "lenient_cost",
        skip_serializing_if = "Option::is_none"
    )]
    #[garde(custom(non_negative_cost))]
    pub cost: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub cultural_sites: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub places_to_visit: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub ratings: Option<RatingsInput>,
}

impl TravelPayload {
    /// Applies the defaulting rules and produces the stored field set.
    pub fn into_fields(self) -> TravelFields {
        TravelFields {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            cost: self.cost.unwrap_or(0.0),
            images: clean_list(self.images),
            cultural_sites: clean_list(self.cultural_sites),
            places_to_visit: clean_list(self.places_to_visit),
            ratings: self.ratings.unwrap_or_default().resolve(),
        }
    }
}

fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn non_negative_cost(cost: &Option<f64>, _ctx: &()) -> garde::Result {
    match cost {
        Some(value) if *value < 0.0 => Err(garde::Error::new("must not be negative")),
        _ => Ok(()),
    }
}

/// Accepts a JSON number or a numeric string. Anything else, including
/// non-finite values, counts as absent.
fn lenient_cost<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let cost = value.and_then(|value| match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    });
    Ok(cost.filter(|cost| cost.is_finite()))
}
