use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::{DbPool, categories, words};

/// Colors handed to auto-created categories, in import order.
pub const COLOR_PALETTE: &[&str] = &[
    "#FF5722", "#2196F3", "#4CAF50", "#FF9800", "#9C27B0", "#F44336", "#009688", "#795548",
    "#607D8B", "#E91E63", "#3F51B5", "#8BC34A", "#FFC107", "#673AB7", "#00BCD4", "#CDDC39",
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4",
];

pub fn palette_color(index: usize) -> &'static str {
    COLOR_PALETTE[index % COLOR_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportWord {
    pub english: String,
    pub turkish: String,
    pub category: String,
}

/// Parses the line-oriented bulk format, one `english,turkish,category` per
/// line. A line with fewer than 3 non-empty fields is skipped and counted,
/// never fatal.
pub fn parse_bulk_lines(text: &str) -> (Vec<ImportWord>, usize) {
    let mut parsed = Vec::new();
    let mut errors = 0;

    for line in text.trim().lines() {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() >= 3 && !parts[0].is_empty() && !parts[1].is_empty() && !parts[2].is_empty()
        {
            parsed.push(ImportWord {
                english: parts[0].to_string(),
                turkish: parts[1].to_string(),
                category: parts[2].to_string(),
            });
        } else {
            errors += 1;
        }
    }

    (parsed, errors)
}

#[derive(Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub categories_created: usize,
}

/// Imports a JSON array of `{english, turkish, category}` objects. A parse
/// failure aborts the whole import before any write; per-word failures are
/// counted and the rest are still attempted.
pub async fn import_words(
    State(pool): State<DbPool>,
    body: String,
) -> Result<Json<ImportSummary>, ApiError> {
    let entries: Vec<ImportWord> =
        serde_json::from_str(&body).map_err(ApiError::MalformedImport)?;

    let mut conn = pool.get()?;
    let existing: Vec<String> = categories::all_categories(&mut conn)?
        .into_iter()
        .map(|c| c.name)
        .collect();

    // Unknown categories are auto-created, colors cycling through the palette.
    let mut new_categories: Vec<&str> = Vec::new();
    for entry in &entries {
        if !existing.contains(&entry.category)
            && !new_categories.contains(&entry.category.as_str())
        {
            new_categories.push(&entry.category);
        }
    }

    let mut categories_created = 0;
    let mut color_index = 0;
    for name in &new_categories {
        match categories::insert_category(&mut conn, name, palette_color(color_index)) {
            Ok(_) => {
                categories_created += 1;
                color_index += 1;
            }
            Err(e) => log::error!("Failed to create category {}: {}", name, e),
        }
    }

    let mut imported = 0;
    let mut failed = 0;
    for entry in &entries {
        match words::insert_word(&mut conn, &entry.english, &entry.turkish, &entry.category) {
            Ok(_) => imported += 1,
            Err(e) => {
                log::error!("Failed to import word {}: {}", entry.english, e);
                failed += 1;
            }
        }
    }

    // Once per affected category, not once per imported word.
    let mut affected: Vec<&str> = Vec::new();
    for entry in &entries {
        if !affected.contains(&entry.category.as_str()) {
            affected.push(&entry.category);
        }
    }
    for name in affected {
        if let Err(e) = categories::recompute_word_count(&mut conn, name) {
            log::error!("Failed to recompute count for {}: {}", name, e);
        }
    }

    log::info!(
        "Import finished: {} words, {} failures, {} new categories",
        imported,
        failed,
        categories_created
    );

    Ok(Json(ImportSummary {
        imported,
        failed,
        categories_created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_lines() {
        let (parsed, errors) = parse_bulk_lines("apple, elma, Yiyecekler\ncat,kedi,Hayvanlar");
        assert_eq!(errors, 0);
        assert_eq!(
            parsed,
            vec![
                ImportWord {
                    english: "apple".to_string(),
                    turkish: "elma".to_string(),
                    category: "Yiyecekler".to_string(),
                },
                ImportWord {
                    english: "cat".to_string(),
                    turkish: "kedi".to_string(),
                    category: "Hayvanlar".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_short_and_blank_lines_are_counted_not_fatal() {
        let text = "apple,elma,Yiyecekler\njust-english\n\n,kedi,Hayvanlar\ndog,köpek,Hayvanlar";
        let (parsed, errors) = parse_bulk_lines(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(errors, 3);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let (parsed, errors) = parse_bulk_lines("run,koşmak,Fiiller,extra,fields");
        assert_eq!(errors, 0);
        assert_eq!(parsed[0].category, "Fiiller");
    }

    #[test]
    fn test_empty_input_parses_to_nothing() {
        let (parsed, errors) = parse_bulk_lines("   ");
        assert!(parsed.is_empty());
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(COLOR_PALETTE.len(), 20);
        assert_eq!(palette_color(0), "#FF5722");
        assert_eq!(palette_color(20), palette_color(0));
        assert_eq!(palette_color(21), palette_color(1));
    }
}
