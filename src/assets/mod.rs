//! Embedded static assets (API documentation UI).
//!
//! Files under `static/swagger/` are compiled into the binary and served
//! read-only under `/swagger/`.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};

pub const MOUNT_PATH: &str = "/swagger";
const INDEX: &str = "index.html";

/// One embedded file.
#[derive(Debug, Clone, Copy)]
pub struct Asset {
    pub path: &'static str,
    pub bytes: &'static [u8],
}

static SWAGGER: &[Asset] = &[
    Asset {
        path: "index.html",
        bytes: include_bytes!("../../static/swagger/index.html"),
    },
    Asset {
        path: "openapi.json",
        bytes: include_bytes!("../../static/swagger/openapi.json"),
    },
];

/// Look up a file by its path relative to the asset root.
pub fn get_asset(path: &str) -> Option<&'static Asset> {
    let path = path.trim_start_matches('/');
    let path = if path.is_empty() { INDEX } else { path };
    SWAGGER.iter().find(|asset| asset.path == path)
}

pub fn list() -> impl Iterator<Item = &'static str> {
    SWAGGER.iter().map(|asset| asset.path)
}

pub fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn respond(path: &str) -> Response {
    match get_asset(path) {
        Some(asset) => (
            [(header::CONTENT_TYPE, content_type(asset.path))],
            asset.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve_index() -> Response {
    respond(INDEX)
}

async fn serve_file(Path(file): Path<String>) -> Response {
    respond(&file)
}

/// Router serving the embedded files.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            MOUNT_PATH,
            get(|| async { Redirect::permanent("/swagger/") }),
        )
        .route("/swagger/", get(serve_index))
        .route("/swagger/{*file}", get(serve_file))
}
