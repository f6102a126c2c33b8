use anyhow::Context;
use scribe::api::routes;
use scribe::artifact::{ArtifactRenderer, MarkdownRenderer};
use scribe::bus::{BusBridge, BusTransport, InMemoryBus};
use scribe::config::Config;
use scribe::llm::{CompletionFactory, Provider};
use scribe::research::ResearchPipeline;
use scribe::retrievers::RetrieverRegistry;
use scribe::scrape::PageFetcher;
use scribe::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scribe=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env().context("failed to load configuration")?);

    let factory = CompletionFactory::new(Provider::OpenAi {
        api_key: config.llm.api_key.clone(),
        api_base: config.llm.api_base.clone(),
    });
    let smart = factory.client(&config.llm.smart_model);
    let fast = factory.client(&config.llm.fast_model);

    let registry = RetrieverRegistry::with_builtins();
    let retriever = registry
        .resolve(
            &config.research.retriever,
            config.research.max_search_results,
        )
        .context("failed to resolve search provider")?;

    let pipeline = Arc::new(ResearchPipeline::new(
        smart,
        fast,
        retriever,
        Arc::new(PageFetcher::new()),
        config.research.clone(),
    ));
    let renderer: Arc<dyn ArtifactRenderer> =
        Arc::new(MarkdownRenderer::new(&config.research.output_dir));

    // A transport subscribe failure here is fatal: the process must not
    // come up half-listening.
    if let Some(bus_config) = config.bus.clone() {
        let transport: Arc<dyn BusTransport> = Arc::new(InMemoryBus::new());
        let bridge = Arc::new(BusBridge::new(
            bus_config,
            transport,
            Arc::clone(&pipeline),
            Arc::clone(&renderer),
        ));
        let _bridge_task = bridge
            .start()
            .await
            .context("failed to start bus bridge")?;
    }

    let state = AppState {
        config: Arc::clone(&config),
        pipeline,
        renderer,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "scribe server listening");

    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
