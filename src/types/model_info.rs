use serde::{Deserialize, Serialize};

use crate::types::Model;

/// Information about a model listed by the models endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Unique model identifier.
    pub id: String,

    /// A human-readable name for the model.
    #[serde(default)]
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Per-token prices, as decimal strings.
    #[serde(default)]
    pub pricing: ModelPricing,
}

/// Prices for prompt and completion tokens.
///
/// The API reports prices as decimal strings; free models report `"0"` for both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per prompt token.
    #[serde(default)]
    pub prompt: String,

    /// Price per completion token.
    #[serde(default)]
    pub completion: String,
}

impl ModelInfo {
    /// Returns true if both prompt and completion tokens are free.
    pub fn is_free(&self) -> bool {
        self.pricing.prompt == "0" && self.pricing.completion == "0"
    }

    /// Returns the model identifier for requests.
    pub fn model(&self) -> Model {
        self.id.parse().unwrap_or_else(|_| Model::Custom(self.id.clone()))
    }
}

/// Response body of the models endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    /// Listed models.
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

impl ModelList {
    /// Returns the free models, preserving listing order.
    pub fn free_models(&self) -> Vec<Model> {
        self.data
            .iter()
            .filter(|info| info.is_free())
            .map(ModelInfo::model)
            .collect()
    }
}
