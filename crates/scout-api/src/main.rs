use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scout_api::{build_router, config::Config, state::AppState, tools};
use scout_graph::LLMConfig;
use scout_llm::{OpenAIClient, OpenAIConfig};
use scout_persist::StoreBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Scout API server");

    let mut provider =
        OpenAIConfig::groq(config.groq_api_key.clone()).with_timeout(config.llm.timeout());
    if let Some(base_url) = &config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    tracing::info!(
        model = %config.llm.model,
        api_key = %provider.masked_api_key(),
        temperature = config.llm.temperature,
        base_url = %provider.base_url,
        "Model configured"
    );
    let llm_client = Arc::new(OpenAIClient::new(provider)?);

    let store = StoreBuilder::new()
        .mongodb_uri(config.mongodb_uri.clone())
        .database(config.persist.database.clone())
        .build()
        .await?;

    let data_source = match &config.data.url {
        Some(url) => {
            tracing::info!(url = %url, max_rows = config.data.max_rows, "query_db enabled");
            Some(tools::QueryDb::new(
                url.clone(),
                config.supabase_key.clone(),
                config.data.max_rows,
                config.data.timeout(),
            )?)
        }
        None => {
            tracing::warn!("SUPABASE_URL is not set; query_db is disabled");
            None
        }
    };

    let graph = scout_graph::Graph::builder()
        .llm_client(llm_client)
        .tools(tools::default_registry(data_source))
        .checkpointer(Arc::clone(&store).checkpointer())
        .llm_config(LLMConfig::from(&config.llm))
        .config(config.graph.clone())
        .build()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store, graph));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
