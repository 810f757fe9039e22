use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::api::{LlmClient, RequestBody};
use crate::api::response::extract_content;
use crate::error::{HyperlocalError, Result};
use crate::models::Message;

const EXTRACTION_INSTRUCTION: &str = "You are an expert at extracting location information. \
Analyze the user's query to infer the country name, its ISO 639-1 two-letter language code \
(e.g., 'en' for English, 'fr' for French), and its ISO 3166-1 alpha-2 two-letter country code \
(e.g., 'US' for United States, 'FR' for France). Ensure language and ISO codes are exactly \
two letters. Respond with a JSON object that strictly adheres to the provided schema. \
All fields (country, language, iso_code) are mandatory.";

/// Location metadata inferred from a query. Built once per query and
/// consumed by the prompt builder; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    /// Full country name, e.g. "France".
    pub country: String,
    /// ISO 639-1 two-letter language code, e.g. "fr".
    pub language: String,
    /// ISO 3166-1 alpha-2 two-letter country code, e.g. "FR".
    pub iso_code: String,
}

impl LocationInfo {
    /// Explicit shape check: country non-empty, both codes exactly two
    /// characters. Returns the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.country.is_empty() {
            return Err("country must not be empty".to_string());
        }
        if self.language.chars().count() != 2 {
            return Err(format!(
                "language code must be exactly 2 characters, got {:?}",
                self.language
            ));
        }
        if self.iso_code.chars().count() != 2 {
            return Err(format!(
                "ISO country code must be exactly 2 characters, got {:?}",
                self.iso_code
            ));
        }
        Ok(())
    }

    /// JSON schema sent as the structured-output constraint.
    pub fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "country": {
                    "type": "string",
                    "description": "The full name of the country. Example: France, United States of America."
                },
                "language": {
                    "type": "string",
                    "description": "The ISO 639-1 two-letter language code. Example: en, fr."
                },
                "iso_code": {
                    "type": "string",
                    "description": "The ISO 3166-1 alpha-2 two-letter country code. Example: US, FR."
                }
            },
            "required": ["country", "language", "iso_code"],
            "additionalProperties": false
        })
    }
}

/// Infer location metadata from the user's query with one schema-constrained
/// chat completion. Single attempt; any failure becomes an extraction error.
pub async fn extract_location_info(llm: &LlmClient, query: &str) -> Result<LocationInfo> {
    info!(query, "extracting location information from query");

    let request = RequestBody::new(
        llm.model(),
        vec![
            Message::system(EXTRACTION_INSTRUCTION),
            Message::user(query),
        ],
    )
    .with_json_schema("location_info", LocationInfo::schema());

    let response = llm.chat(&request).await.map_err(|e| {
        HyperlocalError::ExtractionError(format!("extraction request failed: {}", e))
    })?;

    let content = extract_content(&response)
        .ok()
        .flatten()
        .ok_or_else(|| HyperlocalError::ExtractionError("empty extraction response".to_string()))?;

    let location: LocationInfo = serde_json::from_str(&content).map_err(|e| {
        HyperlocalError::ExtractionError(format!("malformed response: {}", e))
    })?;

    location
        .validate()
        .map_err(HyperlocalError::ExtractionError)?;

    debug!(?location, "extracted location info");
    Ok(location)
}
