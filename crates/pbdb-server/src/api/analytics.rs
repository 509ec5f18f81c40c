use axum::{
    extract::{Query, State},
    Extension, Json,
};
use pbdb_analytics::{generate_windowed_report, AnalyticsError};
use pbdb_core::{AnalyticsReport, AnalyticsReportFilter};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ProfileQuery {
    #[serde(alias = "profileUrl")]
    pub profile_url: Option<String>,
}

/// Report for one profile. The window comes from `start_date`/`end_date`
/// (or their camelCase spellings) in the same query string.
pub(super) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(profile): Query<ProfileQuery>,
    Query(window): Query<AnalyticsReportFilter>,
) -> Result<Json<ApiResponse<AnalyticsReport>>, ApiError> {
    let Some(profile_url) = profile.profile_url.filter(|p| !p.trim().is_empty()) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "profile_url is required",
        ));
    };

    let activities = pbdb_db::list_profile_activities(&state.pool, &profile_url)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let report = generate_windowed_report(&activities, &window)
        .map_err(|e| map_analytics_error(req_id.0.clone(), &e, &profile_url))?;

    Ok(Json(ApiResponse::new(report, req_id.0)))
}

fn map_analytics_error(request_id: String, error: &AnalyticsError, profile_url: &str) -> ApiError {
    match error {
        AnalyticsError::NoData => ApiError::new(
            request_id,
            "no_data",
            format!("no activities for {profile_url} in the requested window"),
        ),
        AnalyticsError::InvalidFilter(e) => {
            ApiError::new(request_id, "validation_error", e.to_string())
        }
    }
}
