//! Environment-driven configuration

use std::str::FromStr;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_MCP_URL: &str = "https://home.atlan.com/mcp/api-key";
const DEFAULT_MAX_ITERATIONS: u32 = 5;
const DEFAULT_PORT: u16 = 8000;

/// Model endpoint settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Tool provider settings
#[derive(Debug, Clone)]
pub struct McpConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// Conversation loop settings
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub max_iterations: u32,
    /// Stop a run between steps once its progress session disconnects
    pub abort_on_disconnect: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            abort_on_disconnect: false,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub mcp: McpConfig,
    pub driver: DriverConfig,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            llm: LlmConfig {
                api_key: non_empty("ANTHROPIC_API_KEY"),
                api_url: non_empty("ANTHROPIC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                model: non_empty("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: parse_value::<u32>(non_empty("ANTHROPIC_MAX_TOKENS")).unwrap_or(DEFAULT_MAX_TOKENS),
            },
            mcp: McpConfig {
                endpoint: non_empty("CATALOG_MCP_URL").unwrap_or_else(|| DEFAULT_MCP_URL.to_string()),
                api_key: non_empty("CATALOG_MCP_API_KEY"),
            },
            driver: DriverConfig {
                max_iterations: parse_value::<u32>(non_empty("CATALOG_MAX_ITERATIONS"))
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_MAX_ITERATIONS),
                abort_on_disconnect: non_empty("CATALOG_ABORT_ON_DISCONNECT")
                    .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
            },
            port: parse_value::<u16>(non_empty("CATALOG_PORT")).unwrap_or(DEFAULT_PORT),
        }
    }
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}
