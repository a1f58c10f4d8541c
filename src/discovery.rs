//! Startup discovery of request parameters from the host environment.
//!
//! Runs once while the client is being built, filling the default hit's
//! user language and document encoding plus the transport user agent, but
//! only where the caller left them unset. Discovery is best-effort: anything
//! that cannot be determined simply stays blank.

use crate::config::AnalyticsConfig;
use crate::hit::Hit;
use crate::parameter::Parameter;

pub trait ParameterDiscoverer: Send + Sync {
    fn discover(&self, config: &mut AnalyticsConfig, defaults: &mut Hit);
}

/// Default discoverer: derives a user agent from the compile-time target and
/// the user language/document encoding from the locale environment
/// (`LC_ALL`, `LC_CTYPE`, `LANG`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemParameterDiscoverer;

impl ParameterDiscoverer for SystemParameterDiscoverer {
    fn discover(&self, config: &mut AnalyticsConfig, defaults: &mut Hit) {
        config.set_user_agent_if_missing(user_agent_string());

        let locale = locale_from_env();

        if defaults.text(Parameter::UserLanguage).is_none() {
            if let Some(language) = locale.as_deref().and_then(language_tag) {
                defaults.set_text(Parameter::UserLanguage, Some(language));
            }
        }

        if defaults.text(Parameter::DocumentEncoding).is_none() {
            if let Some(encoding) = locale.as_deref().and_then(encoding_name) {
                defaults.set_text(Parameter::DocumentEncoding, Some(encoding));
            }
        }

        log::debug!("discovered default request parameters: {defaults:?}");
    }
}

fn user_agent_string() -> String {
    format!(
        "rust/{}/{}/{}",
        std::env::consts::FAMILY,
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn locale_from_env() -> Option<String> {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// `en_US.UTF-8` → `en-us`.
pub(crate) fn language_tag(locale: &str) -> Option<String> {
    let base = locale.split('.').next()?.trim();
    if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(base.replace('_', "-").to_ascii_lowercase())
}

/// `en_US.UTF-8` → `UTF-8`.
pub(crate) fn encoding_name(locale: &str) -> Option<String> {
    let encoding = locale.split_once('.')?.1.trim();
    if encoding.is_empty() {
        return None;
    }
    Some(encoding.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_and_encoding_from_a_locale() {
        assert_eq!(language_tag("en_US.UTF-8").as_deref(), Some("en-us"));
        assert_eq!(language_tag("de_DE").as_deref(), Some("de-de"));
        assert_eq!(language_tag("C"), None);
        assert_eq!(language_tag("POSIX"), None);
        assert_eq!(encoding_name("en_US.UTF-8").as_deref(), Some("UTF-8"));
        assert_eq!(encoding_name("en_US"), None);
    }

    #[test]
    fn discovery_fills_only_blank_fields() {
        let mut config = AnalyticsConfig::new().with_user_agent("custom-agent/1.0");
        let mut defaults = Hit::new();
        defaults.set_text(Parameter::UserLanguage, Some("fr-fr"));

        SystemParameterDiscoverer.discover(&mut config, &mut defaults);

        assert_eq!(config.user_agent(), Some("custom-agent/1.0"));
        assert_eq!(defaults.text(Parameter::UserLanguage), Some("fr-fr"));
    }

    #[test]
    fn discovery_derives_a_user_agent_when_unset() {
        let mut config = AnalyticsConfig::new();
        let mut defaults = Hit::new();
        SystemParameterDiscoverer.discover(&mut config, &mut defaults);
        assert!(config.user_agent().unwrap().starts_with("rust/"));
    }
}
