use axum::{extract::State, Extension, Json};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

pub(super) async fn list_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let profiles = pbdb_db::list_distinct_profiles(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(profiles, req_id.0)))
}
