use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::Slug;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn revalidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug_str): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let Some(admin_token) = state.admin_token.as_deref() else {
        return Err((StatusCode::FORBIDDEN, "Revalidation is disabled".into()));
    };

    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing Authorization header".to_string(),
        ))?;
    let expected_token = format!("Bearer {}", admin_token);
    if auth_header != expected_token {
        return Err((StatusCode::FORBIDDEN, "Invalid Admin Token".into()));
    }

    let slug = Slug::new(slug_str).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match tokio::time::timeout(std::time::Duration::from_secs(5), state.cache.revalidate(&slug)).await {
        Ok(Ok(Some(page))) => Ok(Json(json!({ "revalidated": true, "etag": page.etag }))),
        Ok(Ok(None)) => Err((StatusCode::NOT_FOUND, format!("No post for slug '{}'", slug))),
        Ok(Err(e)) => Err((StatusCode::INTERNAL_SERVER_ERROR, format!("CMS Error: {}", e))),
        Err(_) => Err((StatusCode::GATEWAY_TIMEOUT, "Timeout".into())),
    }
}
