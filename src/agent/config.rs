//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default maximum number of search rounds per question.
const DEFAULT_MAX_ITER: usize = 2;
/// Default results requested from the search service per query.
const DEFAULT_SEARCH_MAX_RESULTS: usize = 3;
/// Default maximum concurrent search calls.
const DEFAULT_SEARCH_CONCURRENCY: usize = 8;
/// Default query-writer max tokens.
const DEFAULT_QUERY_MAX_TOKENS: u32 = 512;
/// Default reflector max tokens.
const DEFAULT_REFLECT_MAX_TOKENS: u32 = 512;
/// Default synthesizer max tokens.
const DEFAULT_SYNTHESIZER_MAX_TOKENS: u32 = 1024;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default Tavily search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://api.tavily.com/search";
/// Gemini's OpenAI-compatible endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Configuration for the research agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// LLM provider name (`"openai"` or `"gemini"`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Model for the query-writer agent.
    pub query_model: String,
    /// Model for the reflection agent.
    pub reflect_model: String,
    /// Model for the synthesizer agent.
    pub synthesizer_model: String,
    /// Maximum tokens for query-writer responses.
    pub query_max_tokens: u32,
    /// Maximum tokens for reflection responses.
    pub reflect_max_tokens: u32,
    /// Maximum tokens for synthesizer responses.
    pub synthesizer_max_tokens: u32,
    /// Request timeout applied to LLM and search HTTP clients.
    pub timeout: Duration,
    /// Maximum search rounds per question.
    ///
    /// Reflection may ask for more evidence any number of times; the loop
    /// stops searching once this many rounds have run.
    pub max_iter: usize,
    /// API key for the search service. `None` degrades search to empty results.
    pub search_api_key: Option<String>,
    /// Search endpoint.
    pub search_url: String,
    /// Results requested per search query.
    pub search_max_results: usize,
    /// Maximum concurrent search calls within one round.
    pub search_concurrency: usize,
    /// Directory containing prompt template files.
    ///
    /// When set, system prompts are loaded from markdown files in this
    /// directory, falling back to compiled-in defaults for any missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    query_model: Option<String>,
    reflect_model: Option<String>,
    synthesizer_model: Option<String>,
    query_max_tokens: Option<u32>,
    reflect_max_tokens: Option<u32>,
    synthesizer_max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_iter: Option<usize>,
    search_api_key: Option<String>,
    search_url: Option<String>,
    search_max_results: Option<usize>,
    search_concurrency: Option<usize>,
    prompt_dir: Option<PathBuf>,
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_non_empty(name).and_then(|v| v.trim().parse().ok())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    ///
    /// A `GOOGLE_API_KEY` selects the `gemini` provider unless a provider
    /// was chosen explicitly; otherwise `OPENAI_API_KEY` (or
    /// `RESEARCH_API_KEY`) is used with the `openai` provider.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = env_non_empty("RESEARCH_PROVIDER");
        }
        if self.api_key.is_none() {
            let google = env_non_empty("GOOGLE_API_KEY");
            let openai =
                env_non_empty("OPENAI_API_KEY").or_else(|| env_non_empty("RESEARCH_API_KEY"));
            match self.provider.as_deref() {
                Some("gemini") => self.api_key = google.or(openai),
                Some(_) => self.api_key = openai.or(google),
                None => {
                    if google.is_some() {
                        self.provider = Some("gemini".to_string());
                        self.api_key = google;
                    } else {
                        self.api_key = openai;
                    }
                }
            }
        }
        if self.base_url.is_none() {
            self.base_url =
                env_non_empty("OPENAI_BASE_URL").or_else(|| env_non_empty("RESEARCH_BASE_URL"));
        }
        if self.query_model.is_none() {
            self.query_model = env_non_empty("RESEARCH_QUERY_MODEL");
        }
        if self.reflect_model.is_none() {
            self.reflect_model = env_non_empty("RESEARCH_REFLECT_MODEL");
        }
        if self.synthesizer_model.is_none() {
            self.synthesizer_model = env_non_empty("RESEARCH_SYNTHESIZER_MODEL");
        }
        if self.max_iter.is_none() {
            self.max_iter = env_parsed("RESEARCH_MAX_ITER");
        }
        if self.search_api_key.is_none() {
            self.search_api_key = env_non_empty("TAVILY_API_KEY");
        }
        if self.search_max_results.is_none() {
            self.search_max_results = env_parsed("RESEARCH_SEARCH_MAX_RESULTS");
        }
        if self.search_concurrency.is_none() {
            self.search_concurrency = env_parsed("RESEARCH_SEARCH_CONCURRENCY");
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = env_non_empty("RESEARCH_PROMPT_DIR").map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the query-writer model.
    #[must_use]
    pub fn query_model(mut self, model: impl Into<String>) -> Self {
        self.query_model = Some(model.into());
        self
    }

    /// Sets the reflection model.
    #[must_use]
    pub fn reflect_model(mut self, model: impl Into<String>) -> Self {
        self.reflect_model = Some(model.into());
        self
    }

    /// Sets the synthesizer model.
    #[must_use]
    pub fn synthesizer_model(mut self, model: impl Into<String>) -> Self {
        self.synthesizer_model = Some(model.into());
        self
    }

    /// Sets the synthesizer max tokens.
    #[must_use]
    pub const fn synthesizer_max_tokens(mut self, n: u32) -> Self {
        self.synthesizer_max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum number of search rounds.
    #[must_use]
    pub const fn max_iter(mut self, n: usize) -> Self {
        self.max_iter = Some(n);
        self
    }

    /// Sets the search API key.
    #[must_use]
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Sets the search endpoint.
    #[must_use]
    pub fn search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = Some(url.into());
        self
    }

    /// Sets the number of results requested per query.
    #[must_use]
    pub const fn search_max_results(mut self, n: usize) -> Self {
        self.search_max_results = Some(n);
        self
    }

    /// Sets the maximum concurrent search calls.
    #[must_use]
    pub const fn search_concurrency(mut self, n: usize) -> Self {
        self.search_concurrency = Some(n);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set, or
    /// [`AgentError::InvalidConfig`] if `max_iter`, `search_max_results`
    /// or `search_concurrency` is zero.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;

        let max_iter = self.max_iter.unwrap_or(DEFAULT_MAX_ITER);
        if max_iter == 0 {
            return Err(AgentError::InvalidConfig {
                message: "max_iter must be at least 1".to_string(),
            });
        }
        let search_max_results = self.search_max_results.unwrap_or(DEFAULT_SEARCH_MAX_RESULTS);
        if search_max_results == 0 {
            return Err(AgentError::InvalidConfig {
                message: "search_max_results must be at least 1".to_string(),
            });
        }
        let search_concurrency = self.search_concurrency.unwrap_or(DEFAULT_SEARCH_CONCURRENCY);
        if search_concurrency == 0 {
            return Err(AgentError::InvalidConfig {
                message: "search_concurrency must be at least 1".to_string(),
            });
        }

        let provider = self.provider.unwrap_or_else(|| "openai".to_string());
        let default_model = if provider == "gemini" {
            "gemini-1.5-flash"
        } else {
            "gpt-4o-mini"
        };

        Ok(AgentConfig {
            api_key,
            base_url: self.base_url,
            query_model: self
                .query_model
                .unwrap_or_else(|| default_model.to_string()),
            reflect_model: self
                .reflect_model
                .unwrap_or_else(|| default_model.to_string()),
            synthesizer_model: self
                .synthesizer_model
                .unwrap_or_else(|| default_model.to_string()),
            provider,
            query_max_tokens: self.query_max_tokens.unwrap_or(DEFAULT_QUERY_MAX_TOKENS),
            reflect_max_tokens: self
                .reflect_max_tokens
                .unwrap_or(DEFAULT_REFLECT_MAX_TOKENS),
            synthesizer_max_tokens: self
                .synthesizer_max_tokens
                .unwrap_or(DEFAULT_SYNTHESIZER_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_iter,
            search_api_key: self.search_api_key.filter(|k| !k.trim().is_empty()),
            search_url: self
                .search_url
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            search_max_results,
            search_concurrency,
            prompt_dir: self.prompt_dir,
        })
    }
}
