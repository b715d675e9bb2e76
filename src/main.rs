use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;

use parley::application::services::ChatService;
use parley::infrastructure::llm::CompletionClientFactory;
use parley::infrastructure::observability::{TracingConfig, init_tracing};
use parley::infrastructure::persistence::SqliteConversationRepository;
use parley::presentation::{AppState, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("Invalid configuration")?;

    init_tracing(TracingConfig::default(), settings.server.port);

    let connect_options = SqliteConnectOptions::from_str(&settings.database.url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await
        .context("Failed to open database")?;

    let repository = Arc::new(SqliteConversationRepository::new(pool));
    repository
        .migrate()
        .await
        .context("Failed to run migrations")?;

    // Construction-time validation: a misconfigured provider aborts startup
    // before the listener binds.
    let completion_client =
        CompletionClientFactory::create(&settings.llm).context("Invalid LLM configuration")?;

    let chat_service = Arc::new(ChatService::new(repository, completion_client));

    let state = AppState { chat_service };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
