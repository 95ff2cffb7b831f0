use axum::Json;
use axum::extract::State;
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

use crate::error::ApiError;
use crate::model::{GameMode, NewGameStat, NewTestRecord, Word};
use crate::words::ApiResponse;
use crate::{DbPool, categories, filter, history, words};

const GAME_SESSION_KEY: &str = "game";

/// Outcome of one completed quiz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub score: i32,
    pub percentage: i32,
}

/// Uniform-random permutation of the question set.
pub fn shuffle_words(mut words: Vec<Word>) -> Vec<Word> {
    let mut rng = rand::thread_rng();
    words.shuffle(&mut rng);
    words
}

/// Exact comparison of a raw answer against the expected term, trimmed and
/// case-folded. No partial credit, no fuzzy matching.
pub fn check_answer(raw: &str, expected: &str) -> bool {
    raw.trim().to_lowercase() == expected.to_lowercase()
}

/// `time_bonus` is a reserved extension point; every current caller passes 0.
pub fn calculate_score(correct_answers: i32, total_questions: i32, time_bonus: f64) -> i32 {
    if total_questions == 0 {
        return 0;
    }
    let base = correct_answers as f64 / total_questions as f64 * 100.0;
    ((base + time_bonus).round() as i32).clamp(0, 100)
}

pub fn calculate_quiz_result(answers: &[bool]) -> QuizResult {
    let total_questions = answers.len() as i32;
    let correct_answers = answers.iter().filter(|a| **a).count() as i32;
    let wrong_answers = total_questions - correct_answers;
    let percentage = if total_questions > 0 {
        (correct_answers as f64 / total_questions as f64 * 100.0).round() as i32
    } else {
        0
    };

    QuizResult {
        total_questions,
        correct_answers,
        wrong_answers,
        score: calculate_score(correct_answers, total_questions, 0.0),
        percentage,
    }
}

/// Ephemeral state of one quiz run, held in the server session. Discarded
/// on abandon or expiry without writing anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub mode: GameMode,
    pub selected_categories: Vec<String>,
    pub selected_letters: Vec<String>,
    pub words: Vec<Word>,
    pub current_index: usize,
    pub answers: Vec<bool>,
    pub edited_words_count: i32,
}

impl GameSession {
    /// Shuffles the question set and starts at position 0 with every answer
    /// recorded as incorrect. `words` must be non-empty (callers reject an
    /// empty filter result before constructing a session).
    pub fn start(
        mode: GameMode,
        selected_categories: Vec<String>,
        selected_letters: Vec<String>,
        words: Vec<Word>,
    ) -> Self {
        let words = shuffle_words(words);
        let answers = vec![false; words.len()];
        GameSession {
            mode,
            selected_categories,
            selected_letters,
            words,
            current_index: 0,
            answers,
            edited_words_count: 0,
        }
    }

    pub fn current_word(&self) -> &Word {
        &self.words[self.current_index]
    }

    pub fn prompt(&self) -> &str {
        match self.mode {
            GameMode::EngToTur => &self.current_word().english,
            GameMode::TurToEng => &self.current_word().turkish,
        }
    }

    pub fn expected_answer(&self) -> &str {
        match self.mode {
            GameMode::EngToTur => &self.current_word().turkish,
            GameMode::TurToEng => &self.current_word().english,
        }
    }

    /// Records the result at the current position. Re-submitting before
    /// advancing overwrites; blocking that is the caller's concern.
    pub fn submit(&mut self, raw: &str) -> bool {
        let correct = check_answer(raw, self.expected_answer());
        self.answers[self.current_index] = correct;
        correct
    }

    /// Moves to the next question. Returns false when already at the last
    /// index, which completes the session.
    pub fn advance(&mut self) -> bool {
        if self.current_index + 1 < self.words.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Swaps in a corrected word at the current position. The recorded
    /// answer for this position is untouched; the edit counter goes up by
    /// one regardless of how many fields changed.
    pub fn record_edit(&mut self, word: Word) {
        self.words[self.current_index] = word;
        self.edited_words_count += 1;
    }

    pub fn result(&self) -> QuizResult {
        calculate_quiz_result(&self.answers)
    }

    pub fn question_view(&self) -> QuestionView {
        QuestionView {
            index: self.current_index,
            total_questions: self.words.len(),
            prompt: self.prompt().to_string(),
            category: self.current_word().category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub total_questions: usize,
    pub prompt: String,
    pub category: String,
}

#[derive(Deserialize)]
pub struct StartGameRequest {
    pub mode: GameMode,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub letters: Vec<String>,
}

#[derive(Serialize)]
pub struct StartGameResponse {
    pub total_questions: usize,
    pub question: QuestionView,
}

#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub correct_answer: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum AdvanceResponse {
    Next {
        completed: bool,
        question: QuestionView,
    },
    Completed {
        completed: bool,
        result: QuizResult,
        stats_saved: bool,
        history_saved: bool,
    },
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditWordRequest {
    #[validate(length(min = 1, message = "English term cannot be empty"))]
    pub english: String,
    #[validate(length(min = 1, message = "Turkish term cannot be empty"))]
    pub turkish: String,
    #[validate(length(min = 1, message = "Please select a category"))]
    pub category: String,
}

async fn load_game(session: &Session) -> Result<GameSession, ApiError> {
    session
        .get::<GameSession>(GAME_SESSION_KEY)
        .await?
        .ok_or(ApiError::NoActiveGame)
}

async fn save_game(session: &Session, game: &GameSession) -> Result<(), ApiError> {
    session.insert(GAME_SESSION_KEY, game).await?;
    Ok(())
}

pub async fn start_game(
    State(pool): State<DbPool>,
    session: Session,
    Json(req): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, ApiError> {
    let mut conn = pool.get()?;
    let candidates = words::words_by_categories(&mut conn, &req.categories)?;
    let matching = filter::filter_words(&candidates, &[], &req.letters);

    if matching.is_empty() {
        return Err(ApiError::Validation(
            "No words match the selected categories and letters".into(),
        ));
    }

    log::info!(
        "Starting {} game with {} words ({} categories, {} letters)",
        req.mode.as_str(),
        matching.len(),
        req.categories.len(),
        req.letters.len()
    );

    let game = GameSession::start(req.mode, req.categories, req.letters, matching);
    let response = StartGameResponse {
        total_questions: game.words.len(),
        question: game.question_view(),
    };
    save_game(&session, &game).await?;

    Ok(Json(response))
}

pub async fn current_question(session: Session) -> Result<Json<QuestionView>, ApiError> {
    let game = load_game(&session).await?;
    Ok(Json(game.question_view()))
}

pub async fn submit_answer(
    session: Session,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let mut game = load_game(&session).await?;
    let correct = game.submit(&req.answer);
    let correct_answer = game.expected_answer().to_string();
    save_game(&session, &game).await?;

    Ok(Json(AnswerResponse {
        correct,
        correct_answer,
    }))
}

pub async fn next_question(
    State(pool): State<DbPool>,
    session: Session,
) -> Result<Json<AdvanceResponse>, ApiError> {
    let mut game = load_game(&session).await?;

    if game.advance() {
        let question = game.question_view();
        save_game(&session, &game).await?;
        return Ok(Json(AdvanceResponse::Next {
            completed: false,
            question,
        }));
    }

    // Last question answered: the result is computed in memory first and
    // returned no matter what happens to the write-backs.
    let result = game.result();
    let (stats_saved, history_saved) = persist_results(&pool, &game, &result);
    session.remove::<GameSession>(GAME_SESSION_KEY).await?;

    Ok(Json(AdvanceResponse::Completed {
        completed: true,
        result,
        stats_saved,
        history_saved,
    }))
}

fn persist_results(pool: &DbPool, game: &GameSession, result: &QuizResult) -> (bool, bool) {
    let mut conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            log::error!("Failed to get connection for result write-back: {}", e);
            return (false, false);
        }
    };

    let now = Utc::now().naive_utc();
    let categories_json =
        serde_json::to_string(&game.selected_categories).unwrap_or_else(|_| "[]".to_string());
    let letters_json =
        serde_json::to_string(&game.selected_letters).unwrap_or_else(|_| "[]".to_string());

    let stats_saved = match history::append_game_stat(
        &mut conn,
        &NewGameStat {
            mode: game.mode.as_str(),
            categories: &categories_json,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            score: result.score,
            completed_at: now,
        },
    ) {
        Ok(_) => true,
        Err(e) => {
            log::error!("Failed to save game stats: {}", e);
            false
        }
    };

    let history_saved = match history::append_test_record(
        &mut conn,
        &NewTestRecord {
            date: now,
            mode: game.mode.as_str(),
            selected_categories: &categories_json,
            selected_letters: &letters_json,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            score: result.score,
            percentage: result.percentage,
            edited_words_count: game.edited_words_count,
            created_at: now,
        },
    ) {
        Ok(_) => true,
        Err(e) => {
            log::error!("Failed to save test history: {}", e);
            false
        }
    };

    (stats_saved, history_saved)
}

pub async fn edit_word(
    State(pool): State<DbPool>,
    session: Session,
    Json(req): Json<EditWordRequest>,
) -> Result<Json<QuestionView>, ApiError> {
    req.validate()?;

    let english = req.english.trim();
    let turkish = req.turkish.trim();
    let category = req.category.trim();
    if english.is_empty() || turkish.is_empty() || category.is_empty() {
        return Err(ApiError::Validation(
            "English and Turkish terms cannot be empty".into(),
        ));
    }

    let mut game = load_game(&session).await?;
    let current = game.current_word().clone();

    let mut conn = pool.get()?;
    words::update_word(&mut conn, current.id, english, turkish, category)?;
    if category != current.category {
        categories::recompute_word_count(&mut conn, &current.category)?;
        categories::recompute_word_count(&mut conn, category)?;
    }

    game.record_edit(Word {
        id: current.id,
        english: english.to_string(),
        turkish: turkish.to_string(),
        category: category.to_string(),
        created_at: current.created_at,
    });
    let question = game.question_view();
    save_game(&session, &game).await?;

    Ok(Json(question))
}

pub async fn abandon_game(session: Session) -> Result<Json<ApiResponse>, ApiError> {
    session.remove::<GameSession>(GAME_SESSION_KEY).await?;
    Ok(Json(ApiResponse {
        success: true,
        message: "Game abandoned".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn word(id: i32, english: &str, turkish: &str) -> Word {
        Word {
            id,
            english: english.to_string(),
            turkish: turkish.to_string(),
            category: "Genel".to_string(),
            created_at: NaiveDateTime::default(),
        }
    }

    fn forward_session(words: Vec<Word>) -> GameSession {
        let answers = vec![false; words.len()];
        GameSession {
            mode: GameMode::EngToTur,
            selected_categories: vec![],
            selected_letters: vec![],
            words,
            current_index: 0,
            answers,
            edited_words_count: 0,
        }
    }

    #[test]
    fn test_empty_result_has_no_division_by_zero() {
        let result = calculate_quiz_result(&[]);
        assert_eq!(
            result,
            QuizResult {
                total_questions: 0,
                correct_answers: 0,
                wrong_answers: 0,
                score: 0,
                percentage: 0
            }
        );
    }

    #[test]
    fn test_three_of_four_scores_75() {
        let result = calculate_quiz_result(&[true, true, false, true]);
        assert_eq!(
            result,
            QuizResult {
                total_questions: 4,
                correct_answers: 3,
                wrong_answers: 1,
                score: 75,
                percentage: 75
            }
        );
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(calculate_quiz_result(&[true, false, false]).percentage, 33);
        assert_eq!(calculate_quiz_result(&[true, true, false]).percentage, 67);
    }

    #[test]
    fn test_score_clamps_with_time_bonus() {
        assert_eq!(calculate_score(3, 4, 30.0), 100);
        assert_eq!(calculate_score(0, 4, -10.0), 0);
        assert_eq!(calculate_score(2, 4, 0.0), 50);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let words: Vec<Word> = (0..50).map(|i| word(i, "en", "tr")).collect();
        let shuffled = shuffle_words(words.clone());

        let mut before: Vec<i32> = words.iter().map(|w| w.id).collect();
        let mut after: Vec<i32> = shuffled.iter().map(|w| w.id).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        assert!(shuffle_words(vec![]).is_empty());
        assert_eq!(shuffle_words(vec![word(1, "a", "b")]).len(), 1);
    }

    #[test]
    fn test_check_answer_trims_and_folds_case() {
        assert!(check_answer("  Elma ", "elma"));
        assert!(check_answer("KeDi", "kedi"));
        assert!(!check_answer("elm", "elma"));
        assert!(!check_answer("elma yemek", "elma"));
    }

    #[test]
    fn test_session_start_shuffles_and_sizes_answers() {
        let words: Vec<Word> = (0..10).map(|i| word(i, "en", "tr")).collect();
        let game = GameSession::start(GameMode::TurToEng, vec![], vec![], words.clone());

        assert_eq!(game.current_index, 0);
        assert_eq!(game.answers, vec![false; 10]);
        let mut ids: Vec<i32> = game.words.iter().map(|w| w.id).collect();
        ids.sort();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_resubmitting_overwrites_the_current_answer() {
        let mut game = forward_session(vec![word(1, "apple", "elma")]);
        assert!(!game.submit("armut"));
        assert!(game.submit("elma"));
        assert_eq!(game.answers, vec![true]);
    }

    #[test]
    fn test_reverse_mode_swaps_prompt_and_answer() {
        let mut game = forward_session(vec![word(1, "apple", "elma")]);
        game.mode = GameMode::TurToEng;
        assert_eq!(game.prompt(), "elma");
        assert_eq!(game.expected_answer(), "apple");
    }

    #[test]
    fn test_edit_keeps_recorded_answer_and_counts_once() {
        let mut game = forward_session(vec![word(1, "aple", "elma"), word(2, "cat", "kedi")]);
        game.submit("elma");
        game.record_edit(word(1, "apple", "elma"));

        assert_eq!(game.edited_words_count, 1);
        assert_eq!(game.answers[0], true);
        assert_eq!(game.current_word().english, "apple");
    }

    #[test]
    fn test_full_forward_session() {
        let mut game = forward_session(vec![word(1, "apple", "elma"), word(2, "cat", "kedi")]);

        assert_eq!(game.prompt(), "apple");
        assert!(game.submit("elma"));
        assert!(game.advance());

        assert_eq!(game.prompt(), "cat");
        assert!(!game.submit("yanlis"));
        assert!(!game.advance());

        let result = game.result();
        assert_eq!(
            result,
            QuizResult {
                total_questions: 2,
                correct_answers: 1,
                wrong_answers: 1,
                score: 50,
                percentage: 50
            }
        );
        assert_eq!(game.edited_words_count, 0);
    }
}
