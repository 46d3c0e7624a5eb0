use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::errors::AppError;
use crate::AppState;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let path = PathBuf::from(&state.config.templates_dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "Viewer page missing");
            Err(AppError::NotFound("index page".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Single path segment, no traversal.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Image fallback for hosts where the `/resources` mount misbehaves.
pub async fn image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    req: Request,
) -> Response {
    let path = PathBuf::from(&state.config.resources_dir)
        .join("images")
        .join(&filename);

    let exists = is_plain_file_name(&filename)
        && tokio::fs::metadata(&path)
            .await
            .is_ok_and(|m| m.is_file());

    if !exists {
        return Json(json!({ "error": format!("Image {filename} not found") })).into_response();
    }

    match ServeFile::new(path).oneshot(req).await {
        Ok(resp) => resp.map(Body::new),
        Err(never) => match never {},
    }
}
