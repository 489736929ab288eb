use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::travel::Travel,
    state::AppState,
    validation::travel::TravelPayload,
};

/// Creates a travel owned by `owner_id`.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `owner_id` - The authenticated caller.
/// * `payload` - The validated request body.
///
/// # Returns
///
/// A `Result` containing the created `Travel` with the owner name joined.
pub async fn create_travel(state: &AppState, owner_id: Uuid, payload: TravelPayload) -> Result<Travel> {
    let travel_id = Uuid::new_v4();
    let fields = payload.into_fields();

    let travel = state.travels.create(travel_id, owner_id, &fields).await?;
    tracing::info!("✅ Travel {} created by {}", travel.id, owner_id);

    Ok(travel)
}

/// Lists every travel, newest first.
pub async fn list_travels(state: &AppState) -> Result<Vec<Travel>> {
    state.travels.list_all().await
}

/// Lists the travels of one owner, newest first.
pub async fn list_owned_travels(state: &AppState, owner_id: Uuid) -> Result<Vec<Travel>> {
    state.travels.list_by_owner(owner_id).await
}

/// Gets a single travel.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `travel_id` - The raw path segment. Anything that is not a UUID cannot
///   name a travel and is reported as not found.
pub async fn get_travel(state: &AppState, travel_id: &str) -> Result<Travel> {
    let not_found = || AppError::NotFound("Travel not found".to_string());
    let travel_id = Uuid::parse_str(travel_id).map_err(|_| not_found())?;

    state.travels.get_by_id(travel_id).await?.ok_or_else(not_found)
}

/// Replaces every field of a travel the caller owns.
///
/// Returns `AppError::TravelNotOwned` both when the travel is missing and
/// when it belongs to someone else.
pub async fn update_travel(
    state: &AppState,
    owner_id: Uuid,
    travel_id: &str,
    payload: TravelPayload,
) -> Result<Travel> {
    let travel_id = Uuid::parse_str(travel_id).map_err(|_| AppError::TravelNotOwned)?;
    let fields = payload.into_fields();

    let travel = state.travels.update(travel_id, owner_id, &fields).await?;
    tracing::info!("✅ Travel {} updated by {}", travel.id, owner_id);

    Ok(travel)
}

/// Deletes a travel the caller owns.
pub async fn delete_travel(state: &AppState, owner_id: Uuid, travel_id: &str) -> Result<()> {
    let travel_id = Uuid::parse_str(travel_id).map_err(|_| AppError::TravelNotOwned)?;

    state.travels.delete(travel_id, owner_id).await?;
    tracing::info!("🗑️ Travel {} deleted by {}", travel_id, owner_id);

    Ok(())
}
