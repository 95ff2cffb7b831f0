use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use diesel::prelude::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::error::ApiError;
use crate::model::{Category, NewCategory};
use crate::schema::{categories, words};
use crate::words::{ApiResponse, last_insert_rowid};
use crate::DbPool;

lazy_static! {
    static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Starter set created on first run, when the category list is empty.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Genel", "#2196F3"),
    ("Hayvanlar", "#4CAF50"),
    ("Renkler", "#FF5722"),
    ("Sayılar", "#9C27B0"),
    ("Aile", "#FF9800"),
    ("Ev Eşyaları", "#795548"),
    ("Yiyecekler", "#F44336"),
    ("Duygular", "#E91E63"),
];

pub fn all_categories(conn: &mut SqliteConnection) -> QueryResult<Vec<Category>> {
    categories::table
        .order(categories::name.asc())
        .load::<Category>(conn)
}

pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Category>> {
    categories::table
        .filter(categories::name.eq(name))
        .first::<Category>(conn)
        .optional()
}

pub fn insert_category(conn: &mut SqliteConnection, name: &str, color: &str) -> QueryResult<i32> {
    diesel::insert_into(categories::table)
        .values(&NewCategory {
            name,
            color,
            word_count: 0,
            created_at: Utc::now().naive_utc(),
        })
        .execute(conn)?;

    last_insert_rowid(conn)
}

pub fn delete_category(conn: &mut SqliteConnection, id: i32) -> QueryResult<usize> {
    diesel::delete(categories::table.find(id)).execute(conn)
}

/// Writes the live word count onto the category record's cached
/// `word_count`. A name with no backing category record is a no-op; words
/// can reference categories that were never created.
pub fn recompute_word_count(conn: &mut SqliteConnection, name: &str) -> QueryResult<()> {
    let count: i64 = words::table
        .filter(words::category.eq(name))
        .count()
        .get_result(conn)?;

    let updated = diesel::update(categories::table.filter(categories::name.eq(name)))
        .set(categories::word_count.eq(count as i32))
        .execute(conn)?;
    if updated == 0 {
        log::debug!("No category record named {}, skipping word count", name);
    }

    Ok(())
}

pub fn seed_default_categories(conn: &mut SqliteConnection) -> QueryResult<usize> {
    for (name, color) in DEFAULT_CATEGORIES {
        insert_category(conn, name, color)?;
    }
    Ok(DEFAULT_CATEGORIES.len())
}

pub async fn list_categories(State(pool): State<DbPool>) -> Result<Json<Vec<Category>>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(all_categories(&mut conn)?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, message = "Category name cannot be empty"))]
    pub name: String,
    pub color: String,
}

pub async fn add_category(
    State(pool): State<DbPool>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<ApiResponse>, ApiError> {
    form.validate()?;
    let name = form.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Category name cannot be empty".into()));
    }
    if !HEX_COLOR_RE.is_match(&form.color) {
        return Err(ApiError::Validation(
            "Color must be a hex value like #2196F3".into(),
        ));
    }

    let mut conn = pool.get()?;
    insert_category(&mut conn, name, &form.color)?;

    Ok(Json(ApiResponse {
        success: true,
        message: "Category added successfully".to_string(),
    }))
}

#[derive(Deserialize, AsChangeset)]
#[diesel(table_name = categories)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub color: Option<String>,
}

pub async fn update_category(
    State(pool): State<DbPool>,
    Path(id): Path<i32>,
    Json(mut changes): Json<CategoryChanges>,
) -> Result<Json<ApiResponse>, ApiError> {
    if changes.name.is_none() && changes.color.is_none() {
        return Err(ApiError::Validation("No changes provided".into()));
    }
    if let Some(name) = &changes.name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Validation("Category name cannot be empty".into()));
        }
        changes.name = Some(trimmed.to_string());
    }
    if let Some(color) = &changes.color {
        if !HEX_COLOR_RE.is_match(color) {
            return Err(ApiError::Validation(
                "Color must be a hex value like #2196F3".into(),
            ));
        }
    }

    let mut conn = pool.get()?;
    let updated = diesel::update(categories::table.find(id))
        .set(&changes)
        .execute(&mut conn)?;
    if updated == 0 {
        return Err(ApiError::NotFound("Category"));
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Category updated successfully".to_string(),
    }))
}

/// Deleting a category never cascades: its words keep their category name
/// and simply lose the backing record.
pub async fn delete_category_handler(
    State(pool): State<DbPool>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse>, ApiError> {
    let mut conn = pool.get()?;
    if delete_category(&mut conn, id)? == 0 {
        return Err(ApiError::NotFound("Category"));
    }

    Ok(Json(ApiResponse {
        success: true,
        message: "Category deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::{insert_word, testutil};

    #[test]
    fn test_seed_creates_the_starter_set() {
        let mut conn = testutil::conn();
        assert_eq!(seed_default_categories(&mut conn).unwrap(), 8);

        let all = all_categories(&mut conn).unwrap();
        assert_eq!(all.len(), 8);
        assert!(all.iter().all(|c| c.word_count == 0));
        assert!(all.iter().any(|c| c.name == "Hayvanlar"));
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let mut conn = testutil::conn();
        insert_category(&mut conn, "Renkler", "#FF5722").unwrap();
        insert_category(&mut conn, "Aile", "#FF9800").unwrap();

        let all = all_categories(&mut conn).unwrap();
        assert_eq!(
            all.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Aile", "Renkler"]
        );
    }

    #[test]
    fn test_recompute_tracks_the_live_count() {
        let mut conn = testutil::conn();
        insert_category(&mut conn, "Hayvanlar", "#4CAF50").unwrap();
        let word_id = insert_word(&mut conn, "cat", "kedi", "Hayvanlar").unwrap();

        recompute_word_count(&mut conn, "Hayvanlar").unwrap();
        let category = find_by_name(&mut conn, "Hayvanlar").unwrap().unwrap();
        assert_eq!(category.word_count, 1);

        crate::words::delete_word(&mut conn, word_id).unwrap();
        recompute_word_count(&mut conn, "Hayvanlar").unwrap();
        let category = find_by_name(&mut conn, "Hayvanlar").unwrap().unwrap();
        assert_eq!(category.word_count, 0);
    }

    #[test]
    fn test_recompute_without_a_record_is_a_silent_noop() {
        let mut conn = testutil::conn();
        insert_word(&mut conn, "stray", "kayıp", "Bilinmeyen").unwrap();
        assert!(recompute_word_count(&mut conn, "Bilinmeyen").is_ok());
        assert!(find_by_name(&mut conn, "Bilinmeyen").unwrap().is_none());
    }

    #[test]
    fn test_recompute_uses_exact_name_match() {
        let mut conn = testutil::conn();
        insert_category(&mut conn, "Hayvanlar", "#4CAF50").unwrap();
        insert_word(&mut conn, "cat", "kedi", "hayvanlar").unwrap();

        recompute_word_count(&mut conn, "Hayvanlar").unwrap();
        let category = find_by_name(&mut conn, "Hayvanlar").unwrap().unwrap();
        assert_eq!(category.word_count, 0);
    }

    #[test]
    fn test_hex_color_pattern() {
        assert!(HEX_COLOR_RE.is_match("#2196F3"));
        assert!(HEX_COLOR_RE.is_match("#4caf50"));
        assert!(!HEX_COLOR_RE.is_match("2196F3"));
        assert!(!HEX_COLOR_RE.is_match("#21 6F3"));
        assert!(!HEX_COLOR_RE.is_match("#FFF"));
    }
}
