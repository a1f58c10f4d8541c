use std::time::Duration;

pub const DEFAULT_HTTP_COLLECT_URL: &str = "http://www.google-analytics.com/collect";
pub const DEFAULT_HTTPS_COLLECT_URL: &str = "https://www.google-analytics.com/collect";
pub const DEFAULT_BATCH_URL: &str = "https://www.google-analytics.com/batch";
pub const DEFAULT_DEBUG_COLLECT_URL: &str = "https://www.google-analytics.com/debug/collect";

/// Configuration for a [`GoogleAnalytics`](crate::GoogleAnalytics) client.
///
/// All settings are initialization-level: set them before `build()`. Every
/// setter chains, so a config can be assembled in one expression:
///
/// ```
/// use google_analytics_sdk::AnalyticsConfig;
///
/// let config = AnalyticsConfig::new()
///     .with_batching(true, 50)
///     .with_gather_stats(true);
/// assert_eq!(config.batch_size(), 50);
/// ```
#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    enabled: bool,
    min_threads: usize,
    max_threads: usize,
    thread_queue_size: usize,
    thread_name_prefix: String,
    request_timeout: Duration,
    use_https: bool,
    validate: bool,
    batching_enabled: bool,
    batch_size: usize,
    http_url: String,
    https_url: String,
    batch_url: String,
    debug_url: String,
    user_agent: Option<String>,
    proxy_host: Option<String>,
    proxy_port: u16,
    proxy_user_name: Option<String>,
    proxy_password: Option<String>,
    discover_parameters: bool,
    gather_stats: bool,
    anonymize_ip: bool,
    auto_queue_time: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_threads: 0,
            max_threads: 5,
            thread_queue_size: 1000,
            thread_name_prefix: "google-analytics".to_string(),
            request_timeout: Duration::from_secs(10),
            use_https: true,
            validate: false,
            batching_enabled: false,
            batch_size: 20,
            http_url: DEFAULT_HTTP_COLLECT_URL.to_string(),
            https_url: DEFAULT_HTTPS_COLLECT_URL.to_string(),
            batch_url: DEFAULT_BATCH_URL.to_string(),
            debug_url: DEFAULT_DEBUG_COLLECT_URL.to_string(),
            user_agent: None,
            proxy_host: None,
            proxy_port: 80,
            proxy_user_name: None,
            proxy_password: None,
            discover_parameters: true,
            gather_stats: false,
            anonymize_ip: false,
            auto_queue_time: true,
        }
    }
}

impl AnalyticsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled, `send`/`send_async` no-op and return a default
    /// response without touching the transport or the stats.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Worker pool sizing for `send_async`. The pool is fixed at
    /// `max_threads` workers; `min_threads` is kept for configuration parity
    /// but the pool does not scale dynamically.
    pub fn with_threads(mut self, min_threads: usize, max_threads: usize) -> Self {
        self.min_threads = min_threads;
        self.max_threads = max_threads;
        self
    }

    /// Bound of the async work queue. When full, the submitting thread runs
    /// the dispatch itself instead of dropping the hit.
    pub fn with_thread_queue_size(mut self, size: usize) -> Self {
        self.thread_queue_size = size;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_use_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    /// Enables advisory validation: hits carrying parameters outside their
    /// hit type or over the documented length are logged, never rejected.
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn with_batching(mut self, enabled: bool, batch_size: usize) -> Self {
        self.batching_enabled = enabled;
        self.batch_size = batch_size;
        self
    }

    pub fn with_http_url(mut self, url: impl Into<String>) -> Self {
        self.http_url = url.into();
        self
    }

    pub fn with_https_url(mut self, url: impl Into<String>) -> Self {
        self.https_url = url.into();
        self
    }

    pub fn with_batch_url(mut self, url: impl Into<String>) -> Self {
        self.batch_url = url.into();
        self
    }

    pub fn with_debug_url(mut self, url: impl Into<String>) -> Self {
        self.debug_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = port;
        self
    }

    pub fn with_proxy_credentials(
        mut self,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.proxy_user_name = Some(user_name.into());
        self.proxy_password = Some(password.into());
        self
    }

    /// Whether the discoverer runs once at build time to fill user agent,
    /// language and encoding defaults.
    pub fn with_discover_parameters(mut self, discover: bool) -> Self {
        self.discover_parameters = discover;
        self
    }

    pub fn with_gather_stats(mut self, gather_stats: bool) -> Self {
        self.gather_stats = gather_stats;
        self
    }

    /// Zero the low bits of any `uip` value before it leaves the process.
    pub fn with_anonymize_ip(mut self, anonymize_ip: bool) -> Self {
        self.anonymize_ip = anonymize_ip;
        self
    }

    /// Derive the `qt` queue-time parameter from each hit's `occurred_at`
    /// timestamp at the moment of transmission. On by default.
    pub fn with_auto_queue_time(mut self, auto_queue_time: bool) -> Self {
        self.auto_queue_time = auto_queue_time;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn min_threads(&self) -> usize {
        self.min_threads
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    pub fn thread_queue_size(&self) -> usize {
        self.thread_queue_size
    }

    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn use_https(&self) -> bool {
        self.use_https
    }

    pub fn validate(&self) -> bool {
        self.validate
    }

    pub fn batching_enabled(&self) -> bool {
        self.batching_enabled
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The collect URL selected by `use_https`.
    pub fn collect_url(&self) -> &str {
        if self.use_https {
            &self.https_url
        } else {
            &self.http_url
        }
    }

    pub fn batch_url(&self) -> &str {
        &self.batch_url
    }

    pub fn debug_url(&self) -> &str {
        &self.debug_url
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn proxy_host(&self) -> Option<&str> {
        self.proxy_host.as_deref()
    }

    pub fn proxy_port(&self) -> u16 {
        self.proxy_port
    }

    pub fn proxy_user_name(&self) -> Option<&str> {
        self.proxy_user_name.as_deref()
    }

    pub fn proxy_password(&self) -> Option<&str> {
        self.proxy_password.as_deref()
    }

    pub fn discover_parameters(&self) -> bool {
        self.discover_parameters
    }

    pub fn gather_stats(&self) -> bool {
        self.gather_stats
    }

    pub fn anonymize_ip(&self) -> bool {
        self.anonymize_ip
    }

    pub fn auto_queue_time(&self) -> bool {
        self.auto_queue_time
    }

    pub(crate) fn set_user_agent_if_missing(&mut self, user_agent: String) {
        if self.user_agent.is_none() {
            self.user_agent = Some(user_agent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_url_follows_https_selection() {
        let config = AnalyticsConfig::new();
        assert_eq!(config.collect_url(), DEFAULT_HTTPS_COLLECT_URL);
        let config = config.with_use_https(false);
        assert_eq!(config.collect_url(), DEFAULT_HTTP_COLLECT_URL);
    }

    #[test]
    fn setters_chain() {
        let config = AnalyticsConfig::new()
            .with_enabled(false)
            .with_threads(1, 3)
            .with_batching(true, 7)
            .with_proxy("proxy.local", 3128)
            .with_proxy_credentials("user", "pass");
        assert!(!config.enabled());
        assert_eq!(config.max_threads(), 3);
        assert!(config.batching_enabled());
        assert_eq!(config.batch_size(), 7);
        assert_eq!(config.proxy_host(), Some("proxy.local"));
        assert_eq!(config.proxy_user_name(), Some("user"));
    }
}
