//! The request model: a generic parameter bag with typed accessors, custom
//! dimensions and custom metrics, plus the typed hit variants in [`types`].

pub mod types;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{parse_error, AnalyticsResult};
use crate::parameter::{Parameter, HIT_PAGEVIEW};

/// One trackable event, on its way to the Measurement Protocol.
///
/// Values are stored as protocol-ready strings; the typed setters serialize
/// into that form and the typed getters parse back out of it. Setting a
/// parameter to `None` removes it entirely rather than storing an empty
/// string. `Clone` produces a fully independent copy of all three maps.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    parameters: BTreeMap<Parameter, String>,
    custom_dimensions: BTreeMap<u32, String>,
    custom_metrics: BTreeMap<u32, String>,
    occurred_at: DateTime<Utc>,
}

impl Hit {
    /// A new hit with the default `pageview` hit type.
    pub fn new() -> Self {
        Self::with_type(HIT_PAGEVIEW)
    }

    pub fn with_type(hit_type: &str) -> Self {
        let mut hit = Self {
            parameters: BTreeMap::new(),
            custom_dimensions: BTreeMap::new(),
            custom_metrics: BTreeMap::new(),
            occurred_at: Utc::now(),
        };
        hit.set_text(Parameter::HitType, Some(hit_type));
        hit
    }

    /// The hit-type discriminator. Always present; constructors pre-set it.
    pub fn hit_type(&self) -> &str {
        self.text(Parameter::HitType).unwrap_or(HIT_PAGEVIEW)
    }

    /// When the tracked event occurred. Defaults to the creation time of the
    /// hit and feeds the auto queue-time derivation.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn set_occurred_at(&mut self, occurred_at: DateTime<Utc>) -> &mut Self {
        self.occurred_at = occurred_at;
        self
    }

    pub fn set_text(&mut self, parameter: Parameter, value: Option<impl Into<String>>) -> &mut Self {
        match value {
            Some(value) => {
                self.parameters.insert(parameter, value.into());
            }
            None => {
                self.parameters.remove(&parameter);
            }
        }
        self
    }

    pub fn set_integer(&mut self, parameter: Parameter, value: Option<i64>) -> &mut Self {
        self.set_text(parameter, value.map(|v| v.to_string()))
    }

    pub fn set_double(&mut self, parameter: Parameter, value: Option<f64>) -> &mut Self {
        self.set_text(parameter, value.map(|v| v.to_string()))
    }

    pub fn set_boolean(&mut self, parameter: Parameter, value: Option<bool>) -> &mut Self {
        self.set_text(parameter, value.map(|v| if v { "true" } else { "false" }))
    }

    /// The raw stored value; `None` when absent or blank.
    pub fn text(&self, parameter: Parameter) -> Option<&str> {
        self.parameters
            .get(&parameter)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn integer(&self, parameter: Parameter) -> AnalyticsResult<Option<i64>> {
        match self.text(parameter) {
            None => Ok(None),
            Some(value) => value.parse::<i64>().map(Some).map_err(|err| {
                parse_error(format!(
                    "parameter `{}` holds `{value}`, which is not an integer: {err}",
                    parameter.wire_name()
                ))
            }),
        }
    }

    pub fn double(&self, parameter: Parameter) -> AnalyticsResult<Option<f64>> {
        match self.text(parameter) {
            None => Ok(None),
            Some(value) => value.parse::<f64>().map(Some).map_err(|err| {
                parse_error(format!(
                    "parameter `{}` holds `{value}`, which is not a number: {err}",
                    parameter.wire_name()
                ))
            }),
        }
    }

    pub fn boolean(&self, parameter: Parameter) -> AnalyticsResult<Option<bool>> {
        match self.text(parameter) {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(value) => Err(parse_error(format!(
                "parameter `{}` holds `{value}`, which is not a boolean literal",
                parameter.wire_name()
            ))),
        }
    }

    /// Custom dimension `index`, rendered on the wire as `cd<index>`. The
    /// protocol allows indexes 1..=200; no ceiling is enforced here.
    pub fn set_custom_dimension(&mut self, index: u32, value: Option<impl Into<String>>) -> &mut Self {
        match value {
            Some(value) => {
                self.custom_dimensions.insert(index, value.into());
            }
            None => {
                self.custom_dimensions.remove(&index);
            }
        }
        self
    }

    pub fn custom_dimension(&self, index: u32) -> Option<&str> {
        self.custom_dimensions.get(&index).map(String::as_str)
    }

    /// Custom metric `index`, rendered on the wire as `cm<index>`.
    pub fn set_custom_metric(&mut self, index: u32, value: Option<impl Into<String>>) -> &mut Self {
        match value {
            Some(value) => {
                self.custom_metrics.insert(index, value.into());
            }
            None => {
                self.custom_metrics.remove(&index);
            }
        }
        self
    }

    pub fn custom_metric(&self, index: u32) -> Option<&str> {
        self.custom_metrics.get(&index).map(String::as_str)
    }

    pub fn parameters(&self) -> impl Iterator<Item = (Parameter, &str)> {
        self.parameters.iter().map(|(p, v)| (*p, v.as_str()))
    }

    pub fn custom_dimensions(&self) -> &BTreeMap<u32, String> {
        &self.custom_dimensions
    }

    pub fn custom_metrics(&self) -> &BTreeMap<u32, String> {
        &self.custom_metrics
    }
}

impl Default for Hit {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_type_defaults_to_pageview() {
        assert_eq!(Hit::new().hit_type(), "pageview");
        assert_eq!(Hit::with_type("event").hit_type(), "event");
    }

    #[test]
    fn typed_accessors_round_trip() {
        let mut hit = Hit::new();
        hit.set_integer(Parameter::EventValue, Some(42))
            .set_double(Parameter::ItemPrice, Some(19.99))
            .set_boolean(Parameter::NonInteractionHit, Some(true))
            .set_boolean(Parameter::JavaEnabled, Some(false))
            .set_text(Parameter::DocumentTitle, Some("home"));

        assert_eq!(hit.integer(Parameter::EventValue).unwrap(), Some(42));
        assert_eq!(hit.double(Parameter::ItemPrice).unwrap(), Some(19.99));
        assert_eq!(hit.boolean(Parameter::NonInteractionHit).unwrap(), Some(true));
        assert_eq!(hit.boolean(Parameter::JavaEnabled).unwrap(), Some(false));
        assert_eq!(hit.text(Parameter::NonInteractionHit), Some("true"));
        assert_eq!(hit.text(Parameter::DocumentTitle), Some("home"));
    }

    #[test]
    fn none_removes_the_parameter() {
        let mut hit = Hit::new();
        hit.set_text(Parameter::DocumentPath, Some("/checkout"));
        assert_eq!(hit.text(Parameter::DocumentPath), Some("/checkout"));
        hit.set_text(Parameter::DocumentPath, None::<String>);
        assert_eq!(hit.text(Parameter::DocumentPath), None);
        assert!(!hit.parameters().any(|(p, _)| p == Parameter::DocumentPath));
    }

    #[test]
    fn blank_values_read_as_absent() {
        let mut hit = Hit::new();
        hit.set_text(Parameter::DocumentTitle, Some("  "));
        assert_eq!(hit.text(Parameter::DocumentTitle), None);
        assert_eq!(hit.integer(Parameter::QueueTime).unwrap(), None);
    }

    #[test]
    fn corrupt_stored_value_is_a_parse_error() {
        let mut hit = Hit::new();
        hit.set_text(Parameter::EventValue, Some("not-a-number"));
        let err = hit.integer(Parameter::EventValue).unwrap_err();
        assert_eq!(err.code_str(), "analytics/parse");
    }

    #[test]
    fn custom_dimensions_and_metrics_overwrite_by_index() {
        let mut hit = Hit::new();
        hit.set_custom_dimension(3, Some("alpha"))
            .set_custom_dimension(3, Some("beta"))
            .set_custom_metric(7, Some("12"));
        assert_eq!(hit.custom_dimension(3), Some("beta"));
        assert_eq!(hit.custom_metric(7), Some("12"));
        hit.set_custom_metric(7, None::<String>);
        assert_eq!(hit.custom_metric(7), None);
    }

    #[test]
    fn clone_is_independent() {
        let mut original = Hit::new();
        original
            .set_text(Parameter::DocumentPath, Some("/a"))
            .set_custom_dimension(1, Some("x"));
        let copy = original.clone();

        original
            .set_text(Parameter::DocumentPath, Some("/b"))
            .set_custom_dimension(1, Some("y"))
            .set_custom_metric(2, Some("9"));

        assert_eq!(copy.text(Parameter::DocumentPath), Some("/a"));
        assert_eq!(copy.custom_dimension(1), Some("x"));
        assert_eq!(copy.custom_metric(2), None);
        assert_eq!(copy.occurred_at(), original.occurred_at());
    }
}
