//! Provider registration and resolution behavior.

use llm::{ChatConfig, Error};
use orca_model::openai::OpenAi;
use orca_model::{CLAUDE_NAME, Model, OPENAI_NAME, ProviderSpec, Registry};
use reqwest::Client;
use std::sync::Arc;

#[derive(Debug)]
struct StubSpec {
    name: &'static str,
    models: &'static [&'static str],
}

impl ProviderSpec for StubSpec {
    fn name(&self) -> &str {
        self.name
    }

    fn label(&self) -> &str {
        "Stub"
    }

    fn supported_models(&self) -> &[&str] {
        self.models
    }

    fn validate(&self, _config: &ChatConfig) -> llm::Result<()> {
        Ok(())
    }

    fn build(&self, client: Client, config: &ChatConfig) -> llm::Result<Model> {
        Ok(Model::OpenAi(OpenAi::from_config(client, config)?))
    }

    fn default_config(&self) -> ChatConfig {
        ChatConfig::new(self.models[0])
    }
}

#[test]
fn explicit_provider_name_wins() {
    let registry = Registry::with_defaults();
    let mut config = ChatConfig::new("claude-sonnet-4-0");
    config.provider = Some(OPENAI_NAME.into());
    let spec = registry.resolve(&config).unwrap();
    assert_eq!(spec.name(), OPENAI_NAME);
}

#[test]
fn unknown_explicit_provider_is_a_configuration_error() {
    let registry = Registry::with_defaults();
    let mut config = ChatConfig::new("gpt-4o");
    config.provider = Some("nonexistent".into());
    let err = registry.resolve(&config).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("nonexistent"));
}

#[test]
fn exact_supported_model_match_beats_heuristics() {
    let registry = Registry::with_defaults();
    registry
        .register(Arc::new(StubSpec {
            name: "special",
            models: &["special-model"],
        }))
        .unwrap();
    let spec = registry.resolve(&ChatConfig::new("special-model")).unwrap();
    assert_eq!(spec.name(), "special");
}

#[test]
fn model_name_heuristics_pick_builtins() {
    let registry = Registry::with_defaults();
    let claude = registry
        .resolve(&ChatConfig::new("claude-9-experimental"))
        .unwrap();
    assert_eq!(claude.name(), CLAUDE_NAME);
    let openai = registry.resolve(&ChatConfig::new("gpt-7-nano")).unwrap();
    assert_eq!(openai.name(), OPENAI_NAME);
}

#[test]
fn custom_base_url_falls_back_to_openai_compatible() {
    let registry = Registry::with_defaults();
    let mut config = ChatConfig::new("qwen-max");
    config.base_url = Some("https://llm.internal.example.com/v1".into());
    let spec = registry.resolve(&config).unwrap();
    assert_eq!(spec.name(), OPENAI_NAME);
}

#[test]
fn first_party_base_url_does_not_trigger_the_fallback() {
    let registry = Registry::with_defaults();
    let mut config = ChatConfig::new("unknown-model");
    config.base_url = Some("https://api.anthropic.com/v1".into());
    assert!(registry.resolve(&config).is_err());
}

#[test]
fn unresolvable_model_names_the_model_in_the_error() {
    let registry = Registry::with_defaults();
    let err = registry.resolve(&ChatConfig::new("mistral-large")).unwrap_err();
    assert!(err.to_string().contains("mistral-large"));
}

#[test]
fn registering_a_spec_without_models_fails() {
    let registry = Registry::new();
    let err = registry
        .register(Arc::new(StubSpec {
            name: "empty",
            models: &[],
        }))
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn reregistration_replaces_and_unregister_removes() {
    let registry = Registry::with_defaults();
    registry
        .register(Arc::new(StubSpec {
            name: "mine",
            models: &["model-a"],
        }))
        .unwrap();
    registry
        .register(Arc::new(StubSpec {
            name: "mine",
            models: &["model-b"],
        }))
        .unwrap();
    let spec = registry.get("mine").unwrap();
    assert_eq!(spec.supported_models(), &["model-b"]);
    assert!(registry.unregister("mine").is_some());
    assert!(registry.get("mine").is_none());
}

#[test]
fn openai_validation_requires_a_key_without_a_custom_endpoint() {
    let registry = Registry::with_defaults();
    let spec = registry.get(OPENAI_NAME).unwrap();

    let mut config = ChatConfig::new("gpt-4o");
    assert!(matches!(
        spec.validate(&config),
        Err(Error::Validation(_))
    ));

    // A local endpoint runs without credentials.
    config.base_url = Some("http://localhost:11434/v1".into());
    assert!(spec.validate(&config).is_ok());
}

#[test]
fn sampling_ranges_are_checked() {
    let registry = Registry::with_defaults();
    let openai = registry.get(OPENAI_NAME).unwrap();
    let claude = registry.get(CLAUDE_NAME).unwrap();

    let mut config = ChatConfig::new("gpt-4o");
    config.api_key = "sk-test".into();
    config.temperature = Some(1.5);
    assert!(openai.validate(&config).is_ok());

    config.temperature = Some(2.5);
    assert!(openai.validate(&config).is_err());

    let mut config = ChatConfig::new("claude-sonnet-4-0");
    config.api_key = "sk-ant-test".into();
    config.temperature = Some(1.5);
    assert!(claude.validate(&config).is_err());
}

#[test]
fn default_configs_resolve_back_to_their_spec() {
    let registry = Registry::with_defaults();
    for name in [OPENAI_NAME, CLAUDE_NAME] {
        let spec = registry.get(name).unwrap();
        let resolved = registry.resolve(&spec.default_config()).unwrap();
        assert_eq!(resolved.name(), name);
    }
}
