//! Collaborator implementations: an HTTP text generator, offline heuristic
//! and keyword stand-ins, and scripted mocks for tests.

pub mod heuristic;
pub mod keyword;
pub mod mock;
pub mod openrouter;

use anyhow::Result;
use sentia_core::{EmotionClassifier, LlmConfig, TextGenerator};
use std::sync::Arc;
use std::time::Duration;

/// Build the text generator named by `config.provider`. Without an API key
/// the HTTP provider degrades to the heuristic one.
pub fn build_generator(config: &LlmConfig, timeout: Duration) -> Result<Arc<dyn TextGenerator>> {
    match config.provider.as_str() {
        "openrouter" => {
            if std::env::var(&config.api_key_env).is_err() {
                tracing::warn!(
                    "{} is not set, falling back to the offline heuristic generator",
                    config.api_key_env
                );
                return Ok(Arc::new(heuristic::HeuristicGenerator::new()));
            }
            Ok(Arc::new(openrouter::OpenRouterGenerator::from_config(
                config, timeout,
            )?))
        }
        "heuristic" => Ok(Arc::new(heuristic::HeuristicGenerator::new())),
        other => anyhow::bail!(
            "Unknown provider '{}' (expected \"openrouter\" or \"heuristic\")",
            other
        ),
    }
}

pub fn build_classifier() -> Arc<dyn EmotionClassifier> {
    Arc::new(keyword::KeywordClassifier::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_known_and_unknown_providers() {
        let mut config = LlmConfig {
            provider: "heuristic".to_string(),
            ..LlmConfig::default()
        };
        let generator = build_generator(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(generator.name(), "heuristic");

        config.provider = "carrier-pigeon".to_string();
        assert!(build_generator(&config, Duration::from_secs(5)).is_err());
    }
}
