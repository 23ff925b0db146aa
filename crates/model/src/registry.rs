//! Provider registry and resolution.
//!
//! A [`ProviderSpec`] describes how to validate a configuration and build a
//! [`Model`] for one provider. The [`Registry`] maps provider names to specs
//! and decides which spec serves a given configuration, in order: explicit
//! provider name, exact supported-model match, model-name heuristics, then
//! a custom base URL falling back to the OpenAI-compatible spec.

use crate::claude::{self, Claude};
use crate::openai::{OpenAi, endpoint};
use crate::provider::Model;
use compact_str::CompactString;
use llm::{ChatConfig, Error, Result};
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Name of the builtin OpenAI-compatible spec.
pub const OPENAI_NAME: &str = "openai";
/// Name of the builtin Claude spec.
pub const CLAUDE_NAME: &str = "claude";

/// Everything the registry needs to know about one provider.
pub trait ProviderSpec: std::fmt::Debug + Send + Sync {
    /// Stable registry name.
    fn name(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str;

    /// Models this provider serves natively.
    fn supported_models(&self) -> &[&str];

    /// Check a configuration before construction.
    fn validate(&self, config: &ChatConfig) -> Result<()>;

    /// Construct a model instance from a validated configuration.
    fn build(&self, client: Client, config: &ChatConfig) -> Result<Model>;

    /// A usable starting configuration for this provider.
    fn default_config(&self) -> ChatConfig;
}

/// Thread-safe name-to-spec map with resolution.
#[derive(Default)]
pub struct Registry {
    specs: RwLock<BTreeMap<CompactString, Arc<dyn ProviderSpec>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the builtin providers registered.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry
            .register(Arc::new(OpenAiSpec))
            .expect("builtin provider specs are valid");
        registry
            .register(Arc::new(ClaudeSpec))
            .expect("builtin provider specs are valid");
        registry
    }

    /// Register a spec under its name, replacing any existing registration.
    pub fn register(&self, spec: Arc<dyn ProviderSpec>) -> Result<()> {
        if spec.name().is_empty() || spec.label().is_empty() {
            return Err(Error::Configuration(
                "provider spec needs a non-empty name and label".into(),
            ));
        }
        if spec.supported_models().is_empty() {
            return Err(Error::Configuration(format!(
                "provider spec '{}' declares no supported models",
                spec.name()
            )));
        }
        let name = CompactString::from(spec.name());
        let mut specs = self.specs.write().expect("registry lock poisoned");
        if specs.insert(name.clone(), spec).is_some() {
            tracing::warn!("provider '{name}' re-registered, replacing previous spec");
        }
        Ok(())
    }

    /// Remove a spec by name.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn ProviderSpec>> {
        self.specs
            .write()
            .expect("registry lock poisoned")
            .remove(name)
    }

    /// Look up a spec by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderSpec>> {
        self.specs
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<CompactString> {
        self.specs
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Decide which spec serves this configuration.
    pub fn resolve(&self, config: &ChatConfig) -> Result<Arc<dyn ProviderSpec>> {
        if let Some(name) = &config.provider {
            return self.get(name).ok_or_else(|| {
                Error::Configuration(format!("unknown provider '{name}'"))
            });
        }
        let specs = self.specs.read().expect("registry lock poisoned");
        // Exact supported-model match beats heuristics, so a registered
        // custom spec can claim a model the builtins would guess at.
        for spec in specs.values() {
            if spec.supported_models().contains(&config.model.as_str()) {
                return Ok(Arc::clone(spec));
            }
        }
        if let Some(name) = heuristic_provider(&config.model)
            && let Some(spec) = specs.get(name)
        {
            return Ok(Arc::clone(spec));
        }
        // A custom endpoint that is not a first-party host speaks the
        // OpenAI-compatible protocol by convention.
        if let Some(base) = &config.base_url
            && !is_first_party(base)
            && let Some(spec) = specs.get(OPENAI_NAME)
        {
            return Ok(Arc::clone(spec));
        }
        Err(Error::Configuration(format!(
            "no provider can serve model '{}'",
            config.model
        )))
    }
}

/// Guess the provider from well-known model name shapes.
fn heuristic_provider(model: &str) -> Option<&'static str> {
    if model.contains("claude") {
        return Some(CLAUDE_NAME);
    }
    if model.starts_with("gpt-")
        || model.starts_with("chatgpt")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
    {
        return Some(OPENAI_NAME);
    }
    None
}

/// Whether a base URL points at one of the first-party endpoints.
fn is_first_party(base: &str) -> bool {
    let first_party = [
        endpoint::OPENAI,
        endpoint::GROK,
        endpoint::QWEN,
        endpoint::KIMI,
        claude::ENDPOINT,
    ];
    match host_of(base) {
        Some(host) => first_party
            .iter()
            .any(|url| host_of(url).is_some_and(|h| h == host)),
        None => false,
    }
}

/// Extract the host portion of a URL without a full parser.
fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?']).next()?;
    let host = host.split_once('@').map_or(host, |(_, host)| host);
    let host = host.split(':').next()?;
    (!host.is_empty()).then_some(host)
}

fn require_model(config: &ChatConfig) -> Result<()> {
    if config.model.is_empty() {
        return Err(Error::Validation("model must not be empty".into()));
    }
    Ok(())
}

fn check_range(name: &str, value: Option<f64>, min: f64, max: f64) -> Result<()> {
    if let Some(value) = value
        && !(min..=max).contains(&value)
    {
        return Err(Error::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

/// Builtin OpenAI-compatible spec, also serving custom endpoints.
#[derive(Debug)]
pub struct OpenAiSpec;

impl ProviderSpec for OpenAiSpec {
    fn name(&self) -> &str {
        OPENAI_NAME
    }

    fn label(&self) -> &str {
        "OpenAI compatible"
    }

    fn supported_models(&self) -> &[&str] {
        &[
            "gpt-4o",
            "gpt-4o-mini",
            "gpt-4-turbo",
            "gpt-3.5-turbo",
            "o1",
            "o1-mini",
            "o3",
            "o3-mini",
            "o4-mini",
        ]
    }

    fn validate(&self, config: &ChatConfig) -> Result<()> {
        require_model(config)?;
        // Local endpoints (Ollama) run without a credential.
        if config.api_key.is_empty() && config.base_url.is_none() {
            return Err(Error::Validation(
                "api_key is required without a custom base_url".into(),
            ));
        }
        check_range("temperature", config.temperature, 0.0, 2.0)?;
        check_range("top_p", config.top_p, 0.0, 1.0)
    }

    fn build(&self, client: Client, config: &ChatConfig) -> Result<Model> {
        Ok(Model::OpenAi(OpenAi::from_config(client, config)?))
    }

    fn default_config(&self) -> ChatConfig {
        ChatConfig::new("gpt-4o")
    }
}

/// Builtin Claude spec.
#[derive(Debug)]
pub struct ClaudeSpec;

impl ProviderSpec for ClaudeSpec {
    fn name(&self) -> &str {
        CLAUDE_NAME
    }

    fn label(&self) -> &str {
        "Claude"
    }

    fn supported_models(&self) -> &[&str] {
        &[
            "claude-opus-4-1",
            "claude-opus-4-0",
            "claude-sonnet-4-0",
            "claude-3-7-sonnet-latest",
            "claude-3-5-sonnet-latest",
            "claude-3-5-haiku-latest",
        ]
    }

    fn validate(&self, config: &ChatConfig) -> Result<()> {
        require_model(config)?;
        if config.api_key.is_empty() {
            return Err(Error::Validation("api_key is required".into()));
        }
        check_range("temperature", config.temperature, 0.0, 1.0)?;
        check_range("top_p", config.top_p, 0.0, 1.0)
    }

    fn build(&self, client: Client, config: &ChatConfig) -> Result<Model> {
        Ok(Model::Claude(Claude::from_config(client, config)?))
    }

    fn default_config(&self) -> ChatConfig {
        ChatConfig::new("claude-sonnet-4-0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_extraction() {
        assert_eq!(host_of("https://api.openai.com/v1"), Some("api.openai.com"));
        assert_eq!(host_of("http://localhost:11434/v1"), Some("localhost"));
        assert_eq!(host_of("no-scheme.example/path"), Some("no-scheme.example"));
        assert_eq!(host_of("https://"), None);
    }

    #[test]
    fn first_party_hosts_are_recognized() {
        assert!(is_first_party("https://api.openai.com/v1"));
        assert!(is_first_party("https://api.anthropic.com"));
        assert!(!is_first_party("https://llm.internal.example.com/v1"));
    }

    #[test]
    fn heuristics_cover_common_names() {
        assert_eq!(heuristic_provider("claude-sonnet-4-0"), Some(CLAUDE_NAME));
        assert_eq!(heuristic_provider("gpt-4o"), Some(OPENAI_NAME));
        assert_eq!(heuristic_provider("o3-mini"), Some(OPENAI_NAME));
        assert_eq!(heuristic_provider("mistral-large"), None);
    }
}
