use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{claims::Claims, travel::TravelDto},
    services::travels as travel_service,
    state::AppState,
    validation::{json::ValidatedJson, travel::TravelPayload},
};

/// The response payload for create and update.
#[derive(Serialize, Deserialize)]
pub struct TravelMutationResponse {
    pub success: bool,
    pub travel: TravelDto,
}

/// The response payload for a single travel.
#[derive(Serialize, Deserialize)]
pub struct TravelResponse {
    pub travel: TravelDto,
}

/// The response payload for travel lists.
#[derive(Serialize, Deserialize)]
pub struct TravelListResponse {
    pub travels: Vec<TravelDto>,
}

/// The response payload for delete.
#[derive(Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Creates a travel owned by the caller.
#[axum::debug_handler]
pub async fn create_travel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(payload): ValidatedJson<TravelPayload>,
) -> Result<impl IntoResponse> {
    let travel = travel_service::create_travel(&state, claims.id, payload).await?;

    Ok(Json(TravelMutationResponse {
        success: true,
        travel: travel.into(),
    }))
}

/// Lists every travel, newest first.
#[axum::debug_handler]
pub async fn list_travels(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let travels = travel_service::list_travels(&state).await?;

    Ok(Json(TravelListResponse {
        travels: travels.into_iter().map(TravelDto::from).collect(),
    }))
}

/// Lists the caller's travels, newest first.
#[axum::debug_handler]
pub async fn list_my_travels(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let travels = travel_service::list_owned_travels(&state, claims.id).await?;

    Ok(Json(TravelListResponse {
        travels: travels.into_iter().map(TravelDto::from).collect(),
    }))
}

/// Gets a single travel.
#[axum::debug_handler]
pub async fn get_travel(
    State(state): State<AppState>,
    Path(travel_id): Path<String>,
) -> Result<impl IntoResponse> {
    let travel = travel_service::get_travel(&state, &travel_id).await?;

    Ok(Json(TravelResponse {
        travel: travel.into(),
    }))
}

/// Replaces every field of a travel the caller owns.
#[axum::debug_handler]
pub async fn update_travel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(travel_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<TravelPayload>,
) -> Result<impl IntoResponse> {
    let travel = travel_service::update_travel(&state, claims.id, &travel_id, payload).await?;

    Ok(Json(TravelMutationResponse {
        success: true,
        travel: travel.into(),
    }))
}

/// Deletes a travel the caller owns.
#[axum::debug_handler]
pub async fn delete_travel(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(travel_id): Path<String>,
) -> Result<impl IntoResponse> {
    travel_service::delete_travel(&state, claims.id, &travel_id).await?;

    Ok(Json(DeleteResponse { success: true }))
}
