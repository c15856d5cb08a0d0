use serde::Deserialize;

use crate::error::{Error, Result};
use crate::observability::{DECODE_EMPTY_CHOICES, DECODE_ERRORS};

/// A chat-completion response, reduced to the fields the client reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    /// Candidate completions; only the first one is used.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Choice {
    /// The generated message.
    #[serde(default)]
    pub message: ChoiceMessage,
}

/// The message carried by a choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChoiceMessage {
    /// Generated text. Some providers send `null` here.
    #[serde(default)]
    pub content: Option<String>,
}

/// Error object some providers return in place of choices.
#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawCompletion {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

impl ChatCompletion {
    /// Returns the text of the first choice, or `None` when there are no choices.
    ///
    /// A choice whose content is `null` yields an empty string.
    pub fn first_choice_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_deref().unwrap_or(""))
    }
}

/// Decodes a raw response body into its first choice text.
///
/// Returns `Ok(None)` when the `choices` array is empty or absent.
///
/// # Errors
///
/// Returns a decode error for malformed JSON or a body that is not an object,
/// and an API error when the body carries an `error` object instead of choices.
pub fn decode_completion(body: &[u8]) -> Result<Option<String>> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        DECODE_ERRORS.click();
        Error::decode(format!("Failed to parse response: {e}"), Some(Box::new(e)))
    })?;
    if !value.is_object() {
        DECODE_ERRORS.click();
        return Err(Error::decode("response body is not a JSON object", None));
    }
    let raw: RawCompletion = serde_json::from_value(value).map_err(|e| {
        DECODE_ERRORS.click();
        Error::decode(format!("Failed to parse response: {e}"), Some(Box::new(e)))
    })?;

    if let (None, Some(error)) = (&raw.choices, raw.error) {
        DECODE_ERRORS.click();
        let status_code = error
            .code
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(200);
        let error_type = error.code.as_ref().map(|code| match code {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        return Err(Error::api(status_code, error_type, error.message));
    }

    let completion = ChatCompletion {
        choices: raw.choices.unwrap_or_default(),
    };
    let text = completion.first_choice_text().map(str::to_string);
    if text.is_none() {
        DECODE_EMPTY_CHOICES.click();
    }
    Ok(text)
}
