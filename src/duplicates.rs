use std::collections::{HashMap, HashSet};

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::Word;
use crate::{DbPool, words};

/// Which field(s) must repeat for a word to count as a duplicate.
/// `All` applies no filter and returns the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateMode {
    English,
    Turkish,
    Both,
    #[default]
    All,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateStats {
    pub english: usize,
    pub turkish: usize,
    pub exact: usize,
}

fn english_key(word: &Word) -> String {
    word.english.trim().to_lowercase()
}

fn turkish_key(word: &Word) -> String {
    word.turkish.trim().to_lowercase()
}

fn pair_key(word: &Word) -> String {
    format!("{}|{}", english_key(word), turkish_key(word))
}

fn key_counts(all: &[Word], key: fn(&Word) -> String) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in all {
        *counts.entry(key(word)).or_insert(0) += 1;
    }
    counts
}

/// Returns every word belonging to a group of size > 1 under the given mode,
/// in input order, never listing the same word twice.
pub fn find_duplicates(all: &[Word], mode: DuplicateMode) -> Vec<Word> {
    let key: fn(&Word) -> String = match mode {
        DuplicateMode::English => english_key,
        DuplicateMode::Turkish => turkish_key,
        DuplicateMode::Both => pair_key,
        DuplicateMode::All => return all.to_vec(),
    };

    let counts = key_counts(all, key);
    let mut seen = HashSet::new();
    all.iter()
        .filter(|word| counts[&key(word)] > 1 && seen.insert(word.id))
        .cloned()
        .collect()
}

/// Counts distinct duplicate groups per dimension, not duplicate words.
pub fn duplicate_stats(all: &[Word]) -> DuplicateStats {
    let group_count = |counts: HashMap<String, usize>| counts.values().filter(|c| **c > 1).count();

    DuplicateStats {
        english: group_count(key_counts(all, english_key)),
        turkish: group_count(key_counts(all, turkish_key)),
        exact: group_count(key_counts(all, pair_key)),
    }
}

#[derive(Deserialize)]
pub struct DuplicatesParams {
    #[serde(default)]
    pub mode: DuplicateMode,
}

pub async fn list_duplicates(
    State(pool): State<DbPool>,
    Query(params): Query<DuplicatesParams>,
) -> Result<Json<Vec<Word>>, ApiError> {
    let mut conn = pool.get()?;
    let all = words::all_words(&mut conn)?;
    Ok(Json(find_duplicates(&all, params.mode)))
}

pub async fn stats(State(pool): State<DbPool>) -> Result<Json<DuplicateStats>, ApiError> {
    let mut conn = pool.get()?;
    let all = words::all_words(&mut conn)?;
    Ok(Json(duplicate_stats(&all)))
}
