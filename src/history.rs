use axum::Json;
use axum::extract::{Query, State};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::DbPool;
use crate::error::ApiError;
use crate::model::{GameStat, NewGameStat, NewTestRecord, TestRecord};
use crate::schema::{game_stats, test_history};
use crate::words::last_insert_rowid;

pub fn append_game_stat(conn: &mut SqliteConnection, stat: &NewGameStat) -> QueryResult<i32> {
    diesel::insert_into(game_stats::table)
        .values(stat)
        .execute(conn)?;
    last_insert_rowid(conn)
}

/// Test records are append-only; nothing in the service mutates or deletes
/// them after this write.
pub fn append_test_record(
    conn: &mut SqliteConnection,
    record: &NewTestRecord,
) -> QueryResult<i32> {
    diesel::insert_into(test_history::table)
        .values(record)
        .execute(conn)?;
    last_insert_rowid(conn)
}

pub fn all_test_records(
    conn: &mut SqliteConnection,
    limit: Option<i64>,
) -> QueryResult<Vec<TestRecord>> {
    let query = test_history::table.order(test_history::created_at.desc());
    match limit {
        Some(n) => query.limit(n).load::<TestRecord>(conn),
        None => query.load::<TestRecord>(conn),
    }
}

pub fn recent_game_stats(conn: &mut SqliteConnection, limit: i64) -> QueryResult<Vec<GameStat>> {
    game_stats::table
        .order(game_stats::completed_at.desc())
        .limit(limit)
        .load::<GameStat>(conn)
}

pub fn top_game_stats(conn: &mut SqliteConnection, limit: i64) -> QueryResult<Vec<GameStat>> {
    game_stats::table
        .order(game_stats::score.desc())
        .limit(limit)
        .load::<GameStat>(conn)
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_games: usize,
    pub average_score: i32,
    pub best_score: i32,
    pub total_correct_answers: i32,
    pub total_questions: i32,
    pub accuracy: i32,
}

pub fn summarize(games: &[GameStat]) -> StatsSummary {
    if games.is_empty() {
        return StatsSummary {
            total_games: 0,
            average_score: 0,
            best_score: 0,
            total_correct_answers: 0,
            total_questions: 0,
            accuracy: 0,
        };
    }

    let total_games = games.len();
    let total_score: i32 = games.iter().map(|g| g.score).sum();
    let best_score = games.iter().map(|g| g.score).max().unwrap_or(0);
    let total_correct_answers: i32 = games.iter().map(|g| g.correct_answers).sum();
    let total_questions: i32 = games.iter().map(|g| g.total_questions).sum();
    let accuracy = if total_questions > 0 {
        (total_correct_answers as f64 / total_questions as f64 * 100.0).round() as i32
    } else {
        0
    };

    StatsSummary {
        total_games,
        average_score: (total_score as f64 / total_games as f64).round() as i32,
        best_score,
        total_correct_answers,
        total_questions,
        accuracy,
    }
}

#[derive(Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

pub async fn list_history(
    State(pool): State<DbPool>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<TestRecord>>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(all_test_records(&mut conn, params.limit)?))
}

pub async fn list_stats(
    State(pool): State<DbPool>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<GameStat>>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(recent_game_stats(&mut conn, params.limit.unwrap_or(10))?))
}

pub async fn top_scores(
    State(pool): State<DbPool>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<GameStat>>, ApiError> {
    let mut conn = pool.get()?;
    Ok(Json(top_game_stats(&mut conn, params.limit.unwrap_or(10))?))
}

pub async fn stats_summary(State(pool): State<DbPool>) -> Result<Json<StatsSummary>, ApiError> {
    let mut conn = pool.get()?;
    let games = recent_game_stats(&mut conn, 100)?;
    Ok(Json(summarize(&games)))
}
