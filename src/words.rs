use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Integer;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::model::{NewWord, Word};
use crate::schema::words;
use crate::{DbPool, categories, filter, import};

/// How many category values a single store query will filter by; past this
/// we fetch the unrestricted set and filter in memory instead.
pub const CATEGORY_BATCH_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

pub(crate) fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result::<i32>(conn)
}

pub fn all_words(conn: &mut SqliteConnection) -> QueryResult<Vec<Word>> {
    words::table
        .order(words::created_at.desc())
        .load::<Word>(conn)
}

pub fn find_word(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Word>> {
    words::table.find(id).first::<Word>(conn).optional()
}

pub fn words_by_categories(
    conn: &mut SqliteConnection,
    names: &[String],
) -> QueryResult<Vec<Word>> {
    if names.is_empty() {
        return all_words(conn);
    }

    if names.len() > CATEGORY_BATCH_LIMIT {
        log::info!(
            "{} categories exceed the batch filter limit, filtering in memory",
            names.len()
        );
        let all = all_words(conn)?;
        return Ok(all
            .into_iter()
            .filter(|w| names.contains(&w.category))
            .collect());
    }

    words::table
        .filter(words::category.eq_any(names))
        .order(words::created_at.desc())
        .load::<Word>(conn)
}

pub fn insert_word(
    conn: &mut SqliteConnection,
    english: &str,
    turkish: &str,
    category: &str,
) -> QueryResult<i32> {
    diesel::insert_into(words::table)
        .values(&NewWord {
            english,
            turkish,
            category,
            created_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;

    last_insert_rowid(conn)
}

pub fn update_word(
    conn: &mut SqliteConnection,
    id: i32,
    english: &str,
    turkish: &str,
    category: &str,
) -> QueryResult<usize> {
    diesel::update(words::table.find(id))
        .set((
            words::english.eq(english),
            words::turkish.eq(turkish),
            words::category.eq(category),
        ))
        .execute(conn)
}

pub fn delete_word(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(words::table.find(id)).execute(conn)
}

#[derive(Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub categories: Option<String>,
    pub letters: Option<String>,
}

fn csv_param(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn load_filtered(conn: &mut SqliteConnection, params: &ListParams) -> Result<Vec<Word>, ApiError> {
    let categories = csv_param(&params.categories);
    let letters = csv_param(&params.letters);

    let candidates = words_by_categories(conn, &categories)?;
    let mut matching = filter::filter_words(&candidates, &[], &letters);
    if let Some(term) = &params.search {
        matching = filter::search_words(&matching, term);
    }
    Ok(matching)
}

pub async fn list_words(
    State(pool): State<DbPool>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Word>>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(load_filtered(&mut conn, &params)?))
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
}

pub async fn count_words(
    State(pool): State<DbPool>,
    Query(params): Query<ListParams>,
) -> Result<Json<CountResponse>, ApiError> {
    let mut conn = pool.get()?;
    let matching = load_filtered(&mut conn, &params)?;
    Ok(Json(CountResponse {
        count: matching.len(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct WordForm {
    #[validate(length(min = 1, message = "English term cannot be empty"))]
    pub english: String,
    #[validate(length(min = 1, message = "Turkish term cannot be empty"))]
    pub turkish: String,
    #[validate(length(min = 1, message = "Please select a category"))]
    pub category: String,
}

impl WordForm {
    /// Trimmed field triple, rejecting whitespace-only values before any
    /// store call is made.
    fn trimmed(&self) -> Result<(&str, &str, &str), ApiError> {
        self.validate()?;
        let english = self.english.trim();
        let turkish = self.turkish.trim();
        let category = self.category.trim();
        if english.is_empty() || turkish.is_empty() {
            return Err(ApiError::Validation(
                "English and Turkish terms cannot be empty".into(),
            ));
        }
        if category.is_empty() {
            return Err(ApiError::Validation("Please select a category".into()));
        }
        Ok((english, turkish, category))
    }
}

pub async fn add_word(
    State(pool): State<DbPool>,
    Json(form): Json<WordForm>,
) -> Result<Json<ApiResponse>, ApiError> {
    let (english, turkish, category) = form.trimmed()?;

    let mut conn = pool.get()?;
    insert_word(&mut conn, english, turkish, category)?;
    categories::recompute_word_count(&mut conn, category)?;

    Ok(Json(ApiResponse {
        success: true,
        message: "Word added successfully".to_string(),
    }))
}

pub async fn update_word_handler(
    State(pool): State<DbPool>,
    Path(id): Path<i32>,
    Json(form): Json<WordForm>,
) -> Result<Json<ApiResponse>, ApiError> {
    let (english, turkish, category) = form.trimmed()?;

    let mut conn = pool.get()?;
    let old = find_word(&mut conn, id)?.ok_or(ApiError::NotFound("Word"))?;
    update_word(&mut conn, id, english, turkish, category)?;
    if old.category != category {
        categories::recompute_word_count(&mut conn, &old.category)?;
        categories::recompute_word_count(&mut conn, category)?;
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Word updated successfully".to_string(),
    }))
}

pub async fn delete_word_handler(
    State(pool): State<DbPool>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut conn = pool.get()?;
    let old = find_word(&mut conn, id)?.ok_or(ApiError::NotFound("Word"))?;
    delete_word(&mut conn, id)?;
    categories::recompute_word_count(&mut conn, &old.category)?;

    Ok(Json(ApiResponse {
        success: true,
        message: "Word deleted successfully".to_string(),
    }))
}

#[derive(Serialize)]
pub struct DeleteAllResponse {
    pub deleted: usize,
    pub failed: usize,
}

/// Deletes every word one by one; a failed delete is counted and the rest
/// are still attempted. Word counts are recomputed once per category
/// afterwards, not once per word.
pub async fn delete_all_words(
    State(pool): State<DbPool>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let mut conn = pool.get()?;
    let all = all_words(&mut conn)?;

    let mut deleted = 0;
    let mut failed = 0;
    for word in &all {
        match delete_word(&mut conn, word.id) {
            Ok(_) => deleted += 1,
            Err(e) => {
                log::error!("Failed to delete word {} ({}): {}", word.id, word.english, e);
                failed += 1;
            }
        }
    }

    for category in categories::all_categories(&mut conn)? {
        if let Err(e) = categories::recompute_word_count(&mut conn, &category.name) {
            log::error!("Failed to recompute count for {}: {}", category.name, e);
        }
    }

    Ok(Json(DeleteAllResponse { deleted, failed }))
}

#[derive(Deserialize)]
pub struct BulkAddRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct BulkAddResponse {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn bulk_add_words(
    State(pool): State<DbPool>,
    Json(req): Json<BulkAddRequest>,
) -> Result<Json<BulkAddResponse>, ApiError> {
    let (parsed, skipped) = import::parse_bulk_lines(&req.text);
    if parsed.is_empty() {
        return Err(ApiError::Validation("No valid word lines found".into()));
    }

    let mut conn = pool.get()?;
    let mut added = 0;
    let mut failed = 0;
    for entry in &parsed {
        match insert_word(&mut conn, &entry.english, &entry.turkish, &entry.category) {
            Ok(_) => added += 1,
            Err(e) => {
                log::error!("Failed to add word {}: {}", entry.english, e);
                failed += 1;
            }
        }
    }

    let mut affected: Vec<&str> = Vec::new();
    for entry in &parsed {
        if !affected.contains(&entry.category.as_str()) {
            affected.push(&entry.category);
        }
    }
    for category in affected {
        if let Err(e) = categories::recompute_word_count(&mut conn, category) {
            log::error!("Failed to recompute count for {}: {}", category, e);
        }
    }

    Ok(Json(BulkAddResponse {
        added,
        skipped,
        failed,
    }))
}

pub async fn export_words(State(pool): State<DbPool>) -> Result<impl IntoResponse, ApiError> {
    let mut conn = pool.get()?;
    let all = all_words(&mut conn)?;

    let csv = all
        .iter()
        .map(|w| format!("{},{},{}", w.english, w.turkish, w.category))
        .collect::<Vec<_>>()
        .join("\n");

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    ))
}
