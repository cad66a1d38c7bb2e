//! Static catalog mapping public model ids to endpoint identifiers.
//!
//! ```rust
//! use tcprovider::{DEFAULT_MODEL_ID, ModelCatalog, ProviderId};
//!
//! let catalog = ModelCatalog::builtin();
//! let model = catalog.find(DEFAULT_MODEL_ID).expect("default model is listed");
//! assert_eq!(model.provider, ProviderId::HerokuInference);
//! assert!(catalog.find("gpt-2").is_none());
//! ```

use tccommon::Registry;

use crate::ProviderId;

pub const DEFAULT_MODEL_ID: &str = "claude-4-sonnet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub id: String,
    pub label: String,
    pub api_identifier: String,
    pub description: String,
    pub provider: ProviderId,
}

impl ModelSpec {
    pub fn new(
        id: impl Into<String>,
        api_identifier: impl Into<String>,
        provider: ProviderId,
    ) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            api_identifier: api_identifier.into(),
            description: String::new(),
            provider,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Models served by the hosted inference endpoint only accept the server-side key.
    pub fn requires_inference_key(&self) -> bool {
        self.provider == ProviderId::HerokuInference
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Registry<String, ModelSpec>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(
            ModelSpec::new(DEFAULT_MODEL_ID, "claude-4-sonnet", ProviderId::HerokuInference)
                .with_label("Claude 4 Sonnet")
                .with_description("Anthropic Claude 4 Sonnet via Heroku Inference API"),
        );
        catalog.register(
            ModelSpec::new("gpt-4o", "gpt-4o", ProviderId::OpenAi)
                .with_label("GPT 4o")
                .with_description("For complex, multi-step financial analysis"),
        );
        catalog.register(
            ModelSpec::new("gpt-4o-mini", "gpt-4o-mini", ProviderId::OpenAi)
                .with_label("GPT 4o mini")
                .with_description("For fast, lightweight lookups"),
        );
        catalog
    }

    pub fn register(&mut self, model: ModelSpec) -> Option<ModelSpec> {
        self.models.insert(model.id.clone(), model)
    }

    pub fn find(&self, id: &str) -> Option<&ModelSpec> {
        self.models.get(id)
    }

    pub fn list(&self) -> Vec<&ModelSpec> {
        self.models.values().collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
