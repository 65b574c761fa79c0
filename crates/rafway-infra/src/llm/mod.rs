//! Generation provider implementations.
//!
//! Concrete implementations of the [`LlmProvider`] trait from `rafway-core`,
//! plus the factory ([`create_provider`]) that picks one from configuration.
//!
//! [`LlmProvider`]: rafway_core::llm::provider::LlmProvider

pub mod demo;
pub mod gemini;

use std::time::Duration;

use secrecy::SecretString;

use rafway_core::llm::box_provider::BoxLlmProvider;
use rafway_types::config::GenerationConfig;
use rafway_types::llm::{LlmError, ProviderType};

use self::demo::DemoProvider;
use self::gemini::GeminiProvider;

/// Environment variable checked when the configured one is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Read the API key from `config.api_key_env`, then `API_KEY`.
///
/// Empty values count as unset.
pub fn resolve_api_key(config: &GenerationConfig) -> Option<SecretString> {
    [config.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
        .into_iter()
        .find_map(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
        })
        .map(SecretString::from)
}

/// Create a [`BoxLlmProvider`] from the `[generation]` config.
///
/// Falls back to the demo provider when `provider = "demo"` or no API key
/// is available.
pub fn create_provider(
    config: &GenerationConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let demo = || BoxLlmProvider::new(DemoProvider::new(Duration::from_millis(config.demo_latency_ms)));

    match (&config.provider, api_key) {
        (ProviderType::Demo, _) => Ok(demo()),
        (ProviderType::Gemini, None) => {
            tracing::warn!(
                env = %config.api_key_env,
                "no Gemini API key found, replies will be simulated"
            );
            Ok(demo())
        }
        (ProviderType::Gemini, Some(key)) => {
            let mut provider = GeminiProvider::new(key, config.model.clone())?;
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(BoxLlmProvider::new(provider))
        }
    }
}
