use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Represents a completion model identifier.
///
/// This can be one of the models in the built-in catalog or a custom string
/// value, e.g. a model discovered from the models endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Models offered by the built-in catalog, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.0 Flash Lite preview (free tier)
    #[serde(rename = "google/gemini-2.0-flash-lite-preview-02-05:free")]
    Gemini20FlashLitePreview,

    /// Gemini 2.0 Flash Thinking experimental (free tier)
    #[serde(rename = "google/gemini-2.0-flash-thinking-exp:free")]
    Gemini20FlashThinkingExp,

    /// DeepSeek R1 distilled into Llama 70B (free tier)
    #[serde(rename = "deepseek/deepseek-r1-distill-llama-70b:free")]
    DeepSeekR1DistillLlama70b,

    /// Llama 3.3 70B Instruct (free tier)
    #[serde(rename = "meta-llama/llama-3.3-70b-instruct:free")]
    Llama33Instruct70b,

    /// DeepSeek R1 (free tier)
    #[serde(rename = "deepseek/deepseek-r1:free")]
    DeepSeekR1,
}

impl KnownModel {
    /// Every known model, in catalog order.
    pub const ALL: [KnownModel; 5] = [
        KnownModel::Gemini20FlashLitePreview,
        KnownModel::Gemini20FlashThinkingExp,
        KnownModel::DeepSeekR1DistillLlama70b,
        KnownModel::Llama33Instruct70b,
        KnownModel::DeepSeekR1,
    ];

    /// Returns the identifier sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini20FlashLitePreview => {
                "google/gemini-2.0-flash-lite-preview-02-05:free"
            }
            KnownModel::Gemini20FlashThinkingExp => "google/gemini-2.0-flash-thinking-exp:free",
            KnownModel::DeepSeekR1DistillLlama70b => "deepseek/deepseek-r1-distill-llama-70b:free",
            KnownModel::Llama33Instruct70b => "meta-llama/llama-3.3-70b-instruct:free",
            KnownModel::DeepSeekR1 => "deepseek/deepseek-r1:free",
        }
    }
}

impl Model {
    /// Returns the identifier sent to the API.
    pub fn as_str(&self) -> &str {
        match self {
            Model::Known(known) => known.as_str(),
            Model::Custom(custom) => custom,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KnownModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KnownModel::ALL
            .into_iter()
            .find(|known| known.as_str() == s)
            .ok_or_else(|| Error::config(format!("unknown model: {s}"), Some("model".to_string())))
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::config("empty model identifier", Some("model".to_string())));
        }
        Ok(s.parse::<KnownModel>()
            .map(Model::Known)
            .unwrap_or_else(|_| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model),
        }
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model.to_string()),
        }
    }
}

/// The ordered, non-empty list of models offered at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<Model>,
}

impl ModelCatalog {
    /// Creates a catalog from an ordered model list.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `models` is empty.
    pub fn new(models: Vec<Model>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::config(
                "model catalog must not be empty",
                Some("models".to_string()),
            ));
        }
        Ok(Self { models })
    }

    /// The built-in catalog of free models.
    pub fn builtin() -> Self {
        Self {
            models: KnownModel::ALL.into_iter().map(Model::Known).collect(),
        }
    }

    /// Returns the model at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    /// Returns the models in catalog order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// Returns the menu labels for the catalog.
    pub fn labels(&self) -> Vec<String> {
        self.models.iter().map(Model::to_string).collect()
    }

    /// Returns the number of models in the catalog.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Always false; catalogs are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_serialization() {
        let model = Model::Known(KnownModel::DeepSeekR1);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""deepseek/deepseek-r1:free""#);
    }

    #[test]
    fn custom_model_serialization() {
        let model = Model::Custom("mistral/mistral-7b:free".to_string());
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""mistral/mistral-7b:free""#);
    }

    #[test]
    fn model_deserialization() {
        let model: Model = serde_json::from_str(r#""meta-llama/llama-3.3-70b-instruct:free""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Llama33Instruct70b));

        let model: Model = serde_json::from_str(r#""acme/model""#).unwrap();
        assert_eq!(model, Model::Custom("acme/model".to_string()));
    }

    #[test]
    fn parse_model() {
        assert_eq!(
            "deepseek/deepseek-r1:free".parse::<Model>().unwrap(),
            Model::Known(KnownModel::DeepSeekR1)
        );
        assert_eq!(
            " acme/model ".parse::<Model>().unwrap(),
            Model::Custom("acme/model".to_string())
        );
        assert!("  ".parse::<Model>().is_err());
    }

    #[test]
    fn from_string_resolves_known_ids() {
        assert_eq!(
            Model::from("deepseek/deepseek-r1:free"),
            Model::Known(KnownModel::DeepSeekR1)
        );
        assert_eq!(
            Model::from("meta-llama/llama-3.3-70b-instruct:free".to_string()),
            Model::Known(KnownModel::Llama33Instruct70b)
        );
        assert_eq!(Model::from("acme/model"), Model::Custom("acme/model".to_string()));
        assert_eq!(
            Model::from("deepseek/deepseek-r1:free"),
            "deepseek/deepseek-r1:free".parse::<Model>().unwrap()
        );
    }

    #[test]
    fn builtin_catalog_order() {
        let catalog = ModelCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.get(0),
            Some(&Model::Known(KnownModel::Gemini20FlashLitePreview))
        );
        assert_eq!(catalog.get(4), Some(&Model::Known(KnownModel::DeepSeekR1)));
        assert_eq!(catalog.get(5), None);
        assert_eq!(catalog.labels()[2], "deepseek/deepseek-r1-distill-llama-70b:free");
    }

    #[test]
    fn empty_catalog_rejected() {
        let err = ModelCatalog::new(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
