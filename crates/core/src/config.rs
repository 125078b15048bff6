//! Configuration management for the Math Tutor Agent.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.mathtutor/config.yaml)
//!
//! The configuration is workspace-centric, with the knowledge base index
//! stored under `.mathtutor/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Environment variable holding the Tavily web-search API key.
pub const SEARCH_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Main application configuration.
///
/// This struct holds all global options that affect agent behavior across
/// the CLI, the REPL, and the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .mathtutor/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Ollama endpoint for generation and embeddings
    pub endpoint: String,

    /// Generation model identifier
    pub model: String,

    /// Embedding provider ("ollama" or "trigram")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// Number of chunks to retrieve from the knowledge base
    pub top_k: usize,

    /// Minimum cosine similarity for a retrieved chunk to count as relevant
    pub relevance_threshold: f32,

    /// Minimum web-search result score for inclusion in context
    pub search_min_score: f32,

    /// Address the HTTP server binds to
    pub bind: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    knowledge: Option<KnowledgeSection>,
    search: Option<SearchSection>,
    server: Option<ServerSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    endpoint: Option<String>,
    model: Option<String>,
    #[serde(rename = "embeddingProvider")]
    embedding_provider: Option<String>,
    #[serde(rename = "embeddingModel")]
    embedding_model: Option<String>,
    #[serde(rename = "embeddingDim")]
    embedding_dim: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "relevanceThreshold")]
    relevance_threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchSection {
    #[serde(rename = "minScore")]
    min_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            endpoint: "http://localhost:11434".to_string(),
            model: "qwen2.5-math".to_string(),
            embedding_provider: "ollama".to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dim: 384,
            top_k: 4,
            relevance_threshold: 0.75,
            search_min_score: 0.75,
            bind: "127.0.0.1:8000".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MATHTUTOR_WORKSPACE`: Override workspace path
    /// - `MATHTUTOR_CONFIG`: Path to config file
    /// - `MATHTUTOR_ENDPOINT`: Ollama endpoint URL
    /// - `MATHTUTOR_MODEL`: Generation model identifier
    /// - `TAVILY_API_KEY`: Web-search API key (read lazily by the search client)
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("MATHTUTOR_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("MATHTUTOR_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".mathtutor/config.yaml")
        };

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(endpoint) = std::env::var("MATHTUTOR_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(model) = std::env::var("MATHTUTOR_MODEL") {
            config.model = model;
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(llm) = config_file.llm {
            if let Some(endpoint) = llm.endpoint {
                self.endpoint = endpoint;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if let Some(embedding_provider) = llm.embedding_provider {
                self.embedding_provider = embedding_provider;
            }
            if let Some(embedding_model) = llm.embedding_model {
                self.embedding_model = embedding_model;
            }
            if let Some(embedding_dim) = llm.embedding_dim {
                self.embedding_dim = embedding_dim;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(top_k) = knowledge.top_k {
                self.top_k = top_k;
            }
            if let Some(threshold) = knowledge.relevance_threshold {
                self.relevance_threshold = threshold;
            }
        }

        if let Some(search) = config_file.search {
            if let Some(min_score) = search.min_score {
                self.search_min_score = min_score;
            }
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                self.bind = bind;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config
    /// file.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        endpoint: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .mathtutor directory.
    pub fn tutor_dir(&self) -> PathBuf {
        self.workspace.join(".mathtutor")
    }

    /// Get the path to the knowledge base index database.
    pub fn index_path(&self) -> PathBuf {
        self.tutor_dir().join("index.db")
    }

    /// Ensure the .mathtutor directory exists.
    pub fn ensure_tutor_dir(&self) -> AppResult<()> {
        let dir = self.tutor_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .mathtutor directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the web-search API key from the environment.
    pub fn search_api_key(&self) -> Option<String> {
        std::env::var(SEARCH_API_KEY_ENV).ok()
    }
}
