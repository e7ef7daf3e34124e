use axum::Json;
use axum::extract::{Path, Query, State};
use openbooks_core::{BookRecord, CategoryList};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the Open Books Search Engine API!";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub limit: Option<usize>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<BookRecord>> {
    let limit = params.limit.unwrap_or(state.search.default_limit);
    Json(state.search_and_cache(&params.query, limit).await)
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookRecord>, ApiError> {
    let book = state.with_db(move |db| db.get_book(&id)).await?;
    Ok(Json(book))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoryList>, ApiError> {
    let categories = state.with_db(|db| db.list_categories()).await?;
    Ok(Json(CategoryList { categories }))
}

pub async fn search_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<BookRecord>> {
    let limit = state.search.category_limit;
    Json(state.search_category(&name, limit).await)
}

pub async fn featured(State(state): State<AppState>) -> Json<Vec<BookRecord>> {
    let limit = state.search.featured_limit;
    Json(state.featured().await.featured_head(limit))
}

pub async fn fantasy_featured(State(state): State<AppState>) -> Json<Vec<BookRecord>> {
    let limit = state.search.fantasy_featured_limit;
    Json(state.featured().await.fantasy_head(limit))
}
