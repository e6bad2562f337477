//! Provider router: builds the configured model provider.

use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;
use nova_core::error::ProviderError;
use nova_core::provider::Provider;
use std::sync::Arc;
use tracing::debug;

/// Build the provider named by `config.provider`.
///
/// `gemini` uses the native API; every other name is treated as an
/// OpenAI-compatible endpoint. A missing key is an error except for
/// local servers that don't check one.
pub fn build_from_config(
    config: &nova_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.provider.trim().to_lowercase();
    let api_key = config.api_key.clone().unwrap_or_default();

    if api_key.is_empty() && !is_keyless(&name) {
        return Err(ProviderError::NotConfigured(format!(
            "no API key for provider '{name}'; set NOVA_API_KEY or GOOGLE_API_KEY"
        )));
    }

    let provider: Arc<dyn Provider> = match name.as_str() {
        "gemini" | "google" => {
            let mut p = GeminiProvider::new(&api_key);
            if let Some(url) = &config.api_url {
                p = p.with_base_url(url);
            }
            Arc::new(p)
        }
        _ => {
            let base_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| default_base_url(&name));
            Arc::new(OpenAiCompatProvider::new(&name, &base_url, &api_key))
        }
    };

    debug!(provider = %provider.name(), model = %config.model, "Provider ready");
    Ok(provider)
}

fn is_keyless(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, key: Option<&str>) -> nova_config::AppConfig {
        nova_config::AppConfig {
            provider: provider.into(),
            api_key: key.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_builds_gemini() {
        let provider = build_from_config(&config("gemini", Some("k"))).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn openai_compatible_names_pass_through() {
        let provider = build_from_config(&config("OpenRouter", Some("k"))).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn missing_key_is_not_configured() {
        let err = build_from_config(&config("gemini", None)).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn local_servers_need_no_key() {
        let provider = build_from_config(&config("ollama", None)).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }
}
