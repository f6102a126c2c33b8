use crate::types::{AppError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub research: ResearchConfig,
    /// Bus bridge settings; `None` disables the bus side entirely.
    pub bus: Option<BusConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_base: String,
    /// Model for agent selection, planning and report synthesis.
    pub smart_model: String,
    /// Model for per-chunk summarization.
    pub fast_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchConfig {
    /// Search provider name, resolved through the retriever registry.
    pub retriever: String,
    /// Upper bound on generated sub-queries, minimum 1.
    pub max_iterations: usize,
    /// Words per summarization chunk.
    pub chunk_size: usize,
    /// Cap on concurrently summarized chunks within one source.
    pub max_concurrent_chunks: usize,
    /// Ranked URLs taken per sub-query.
    pub max_search_results: usize,
    /// Word budget handed to the report prompt.
    pub total_words: usize,
    /// Citation/format instruction handed to the report prompt.
    pub report_format: String,
    /// Directory artifacts are rendered into.
    pub output_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Shared HMAC secret for envelope signing and verification.
    pub secret: String,
    /// Inbound topic the bridge subscribes to.
    pub sub_topic: String,
    /// Outbound topic results and progress are published to.
    pub pub_topic: String,
    /// Maximum messages concurrently in flight.
    pub flow_control_window: usize,
    /// Mirror every outbound event to the local log sink.
    pub verbose_logging: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bus = match env::var("BUS_SECRET") {
            Ok(secret) => Some(BusConfig {
                secret,
                sub_topic: require("BUS_SUB_TOPIC")?,
                pub_topic: require("BUS_PUB_TOPIC")?,
                flow_control_window: parsed("BUS_FLOW_CONTROL_WINDOW", 5)?,
                verbose_logging: env::var("BUS_VERBOSE_LOGGING")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            }),
            Err(_) => None,
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parsed("PORT", 8000)?,
            },
            llm: LlmConfig {
                api_key: require("OPENAI_API_KEY")?,
                api_base: env::var("OPENAI_API_BASE")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                smart_model: env::var("SMART_LLM_MODEL")
                    .unwrap_or_else(|_| "gpt-4o".to_string()),
                fast_model: env::var("FAST_LLM_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            research: ResearchConfig {
                retriever: env::var("RETRIEVER").unwrap_or_else(|_| "duckduckgo".to_string()),
                max_iterations: parsed("MAX_ITERATIONS", 3)?,
                chunk_size: parsed("SUMMARY_CHUNK_SIZE", 10_000)?,
                max_concurrent_chunks: parsed("MAX_CONCURRENT_CHUNKS", 8)?,
                max_search_results: parsed("MAX_SEARCH_RESULTS", 5)?,
                total_words: parsed("TOTAL_WORDS", 1_000)?,
                report_format: env::var("REPORT_FORMAT").unwrap_or_else(|_| "APA".to_string()),
                output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "outputs".to_string()),
            },
            bus,
        })
    }
}

impl ResearchConfig {
    /// The planner always asks for at least one sub-query.
    pub fn effective_iterations(&self) -> usize {
        self.max_iterations.max(1)
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::Config(format!("{} not set", key)))
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a valid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
