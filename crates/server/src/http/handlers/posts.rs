use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Form,
};
use domain::{CommentSubmission, Slug};
use pages::{CmsTransport, CommentForm, PageCache, Served};
use tracing::error;

use crate::state::AppState;

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    let posts = state.source.post_summaries().await.map_err(|e| {
        error!("Failed to load post list: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Html(state.site.home(&posts).into_string()))
}

pub async fn show_post(
    State(state): State<AppState>,
    Path(slug_str): Path<String>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let Some(served) = find_page(&state.cache, &slug_str).await? else {
        return Ok(not_found_page(&state, &format!("/post/{}", slug_str)));
    };

    let etag = HeaderValue::from_str(&served.page.etag)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let max_age = state.cache.revalidate_window().as_secs();
    let cache_control = HeaderValue::from_str(&format!(
        "public, s-maxage={}, stale-while-revalidate",
        max_age
    ))
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let x_cache = HeaderValue::from_static(served.status.as_str());

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| etag_matches(v, &served.page.etag));
    if not_modified {
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, cache_control),
            (header::HeaderName::from_static("x-cache"), x_cache),
        ],
        Html(served.page.html.clone()),
    )
        .into_response())
}

/// No-JS form post: runs the comment form server-side and re-renders the page.
pub async fn submit_comment_form(
    State(state): State<AppState>,
    Path(slug_str): Path<String>,
    Form(payload): Form<CommentSubmission>,
) -> Result<Response, (StatusCode, String)> {
    let Some(served) = find_page(&state.cache, &slug_str).await? else {
        return Ok(not_found_page(&state, &format!("/post/{}", slug_str)));
    };
    let post = &served.page.post;

    let mut form = CommentForm::from_submission(CommentSubmission {
        post_id: post.id.clone(),
        ..payload
    });
    form.submit(&CmsTransport(state.source.as_ref())).await;

    Ok(Html(state.site.post(post, &form).into_string()).into_response())
}

/// Weak comparison against an `If-None-Match` list, as used for GET.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let bare = |t: &str| t.trim().trim_start_matches("W/").to_string();
    let ours = bare(etag);
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || bare(tag) == ours)
}

pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    not_found_page(&state, uri.path())
}

async fn find_page(cache: &PageCache, slug: &str) -> Result<Option<Served>, (StatusCode, String)> {
    let Ok(slug) = Slug::new(slug) else {
        return Ok(None);
    };
    cache.get(&slug).await.map_err(|e| {
        error!("Failed to generate page '{}': {}", slug, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

fn not_found_page(state: &AppState, path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(state.site.not_found(path).into_string()),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_list_and_weak_tags_match() {
        let etag = "\"abc\"";
        assert!(etag_matches("\"abc\"", etag));
        assert!(etag_matches("W/\"abc\"", etag));
        assert!(etag_matches("\"old\", W/\"abc\"", etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches("\"old\", \"other\"", etag));
        assert!(!etag_matches("abc", etag));
    }
}
