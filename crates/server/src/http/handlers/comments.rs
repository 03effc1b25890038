use axum::{extract::State, http::StatusCode, Json};
use domain::CommentSubmission;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::state::AppState;

pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CommentSubmission>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if payload.post_id.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Missing post _id".to_string()));
    }

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        let fields: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Missing required field(s): {}", fields.join(", ")),
        ));
    }

    state.source.create_comment(&payload).await.map_err(|e| {
        error!("Couldn't submit comment for post {}: {}", payload.post_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Couldn't submit comment: {}", e),
        )
    })?;

    info!("Comment received for post {}, awaiting approval", payload.post_id);
    Ok(Json(json!({ "message": "Comment submitted" })))
}
