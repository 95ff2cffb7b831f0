use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::schema::{categories, game_stats, test_history, words};

/// Translation direction for a quiz: which side is asked, which is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    #[serde(rename = "eng-to-tur")]
    EngToTur,
    #[serde(rename = "tur-to-eng")]
    TurToEng,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::EngToTur => "eng-to-tur",
            GameMode::TurToEng => "tur-to-eng",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = words)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Word {
    pub id: i32,
    pub english: String,
    pub turkish: String,
    pub category: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = words)]
pub struct NewWord<'a> {
    pub english: &'a str,
    pub turkish: &'a str,
    pub category: &'a str,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub word_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub word_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = game_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameStat {
    pub id: i32,
    pub mode: String,
    pub categories: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub completed_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = game_stats)]
pub struct NewGameStat<'a> {
    pub mode: &'a str,
    pub categories: &'a str,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub completed_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = test_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TestRecord {
    pub id: i32,
    pub date: NaiveDateTime,
    pub mode: String,
    pub selected_categories: String,
    pub selected_letters: String,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub percentage: i32,
    pub edited_words_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = test_history)]
pub struct NewTestRecord<'a> {
    pub date: NaiveDateTime,
    pub mode: &'a str,
    pub selected_categories: &'a str,
    pub selected_letters: &'a str,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub percentage: i32,
    pub edited_words_count: i32,
    pub created_at: NaiveDateTime,
}
