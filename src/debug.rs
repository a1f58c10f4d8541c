//! Response model for the hit validation (debug collect) endpoint.
//!
//! The debug endpoint does not record data; it echoes back, as JSON, whether
//! each submitted hit would have been accepted and why not. See
//! <https://developers.google.com/analytics/devguides/collection/protocol/v1/validating-hits>.

use serde::Deserialize;

use crate::error::{parse_error, AnalyticsResult};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HitValidationResponse {
    pub hit_parsing_result: Vec<HitParsingResult>,
}

impl HitValidationResponse {
    pub(crate) fn from_json(body: &str) -> AnalyticsResult<Self> {
        serde_json::from_str(body)
            .map_err(|err| parse_error(format!("invalid hit validation response: {err}")))
    }

    /// True when every submitted hit parsed cleanly.
    pub fn is_valid(&self) -> bool {
        !self.hit_parsing_result.is_empty() && self.hit_parsing_result.iter().all(|r| r.valid)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HitParsingResult {
    pub valid: bool,
    pub hit: String,
    pub parser_message: Vec<ParserMessage>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserMessage {
    pub message_type: String,
    pub description: String,
    pub message_code: Option<String>,
    pub parameter: Option<String>,
}
