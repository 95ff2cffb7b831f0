use anyhow::Context;
use axum::{
    Router,
    routing::{get, post, put},
};
use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};
use time::Duration;
use tokio::net::TcpListener;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

mod categories;
mod duplicates;
mod error;
mod filter;
mod game;
mod history;
mod import;
mod model;
mod schema;
mod words;

type DbPool = Pool<ConnectionManager<SqliteConnection>>;

fn seed_categories_if_empty(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("Failed to get a connection for seeding")?;
    let existing =
        categories::all_categories(&mut conn).context("Failed to list categories")?;
    if existing.is_empty() {
        let created = categories::seed_default_categories(&mut conn)
            .context("Failed to seed default categories")?;
        log::info!("Seeded {} default categories", created);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Database configuration
    dotenv::dotenv().ok();
    env_logger::init();

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://words.db".into());

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .build(manager)
        .expect("Failed to create DB pool");

    // First run starts with the default category set
    if let Err(e) = seed_categories_if_empty(&pool) {
        eprintln!("Startup failed: {:#}", e);
        std::process::exit(1);
    }

    // Sessions hold the ephemeral quiz state; an abandoned quiz simply
    // expires with its session
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(Duration::hours(2)))
        .with_secure(false);

    // Word API router
    let words_router = Router::new()
        .route(
            "/",
            get(words::list_words)
                .post(words::add_word)
                .delete(words::delete_all_words),
        )
        .route("/count", get(words::count_words))
        .route("/bulk", post(words::bulk_add_words))
        .route("/export", get(words::export_words))
        .route("/duplicates", get(duplicates::list_duplicates))
        .route("/duplicates/stats", get(duplicates::stats))
        .route(
            "/{id}",
            put(words::update_word_handler).delete(words::delete_word_handler),
        )
        .with_state(pool.clone());

    // Category API router
    let categories_router = Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::add_category),
        )
        .route(
            "/{id}",
            put(categories::update_category).delete(categories::delete_category_handler),
        )
        .with_state(pool.clone());

    // Quiz session router
    let game_router = Router::new()
        .route("/", get(game::current_question).delete(game::abandon_game))
        .route("/start", post(game::start_game))
        .route("/answer", post(game::submit_answer))
        .route("/next", post(game::next_question))
        .route("/edit", post(game::edit_word))
        .with_state(pool.clone());

    // Test history and game statistics routers
    let history_router = Router::new()
        .route("/", get(history::list_history))
        .with_state(pool.clone());

    let stats_router = Router::new()
        .route("/", get(history::list_stats))
        .route("/top", get(history::top_scores))
        .route("/summary", get(history::stats_summary))
        .with_state(pool.clone());

    let import_router = Router::new()
        .route("/", post(import::import_words))
        .with_state(pool.clone());

    // Combined API router
    let api_router = Router::new()
        .nest("/words", words_router)
        .nest("/categories", categories_router)
        .nest("/game", game_router)
        .nest("/history", history_router)
        .nest("/stats", stats_router)
        .nest("/import", import_router);

    // Main application router
    let app = Router::new().nest("/api", api_router).layer(session_layer);

    // Start server
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".into());
    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to address: {}", e);
            std::process::exit(1);
        }
    };

    println!("Server running on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
