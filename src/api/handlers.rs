// HTTP request handlers for catalog pages

use std::path::PathBuf;

use actix_web::http::header;
use actix_web::{error, web, HttpResponse, Result};

use crate::api::models::{ApiResponse, HealthResponse};
use crate::api::templates::Templates;
use crate::catalog::{Category, PageDataProvider, RefreshKind, RefreshState};

/// Shared state handed to every worker.
pub struct AppState {
    pub pages: PageDataProvider,
    pub templates: Templates,
    pub assets_dir: PathBuf,
}

fn render(state: &AppState, category: Option<Category>) -> Result<HttpResponse> {
    let page = state.pages.get_snapshot(category);
    let body = state
        .templates
        .render(category, &page)
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Landing page
pub async fn landing(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.pages.notify_page_viewed();
    render(&state, None)
}

/// Category page; unknown slugs go back to the landing page.
pub async fn category_page(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    state.pages.notify_page_viewed();
    match Category::from_slug(&path.into_inner()) {
        Some(category) => render(&state, Some(category)),
        None => Ok(see_other_home()),
    }
}

/// Fallback for every other path
pub async fn redirect_home(state: web::Data<AppState>) -> HttpResponse {
    state.pages.notify_page_viewed();
    see_other_home()
}

fn see_other_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

async fn serve_asset(state: &AppState, file: &str, content_type: &str) -> Result<HttpResponse> {
    let path = state.assets_dir.join(file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(HttpResponse::Ok().content_type(content_type).body(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "asset not found");
            Ok(HttpResponse::NotFound().finish())
        }
        Err(e) => Err(error::ErrorInternalServerError(e)),
    }
}

pub async fn favicon(state: web::Data<AppState>) -> Result<HttpResponse> {
    serve_asset(&state, "favicon.png", "image/png").await
}

pub async fn styles(state: web::Data<AppState>) -> Result<HttpResponse> {
    serve_asset(&state, "styles.css", "text/css").await
}

/// Health check endpoint; reports cache contents without triggering refreshes.
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let cache = state.pages.cache();
    let snapshot = cache.snapshot();

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        items: snapshot.items.len(),
        manufacturers: snapshot.manufacturers.len(),
        availability_entries: snapshot.availability.len(),
        items_refreshing: cache.state(RefreshKind::Items) == RefreshState::Refreshing,
        availabilities_refreshing: cache.state(RefreshKind::Availabilities)
            == RefreshState::Refreshing,
        last_updated: snapshot.last_updated,
    });

    Ok(HttpResponse::Ok().json(response))
}
