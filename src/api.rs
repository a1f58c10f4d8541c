//! The client facade: ties the merge/serialize pipeline, the batching
//! buffer, the transport, the worker pool and the stats together.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::batch::{BatchBuffer, BatchEntry};
use crate::config::AnalyticsConfig;
use crate::debug::HitValidationResponse;
use crate::discovery::{ParameterDiscoverer, SystemParameterDiscoverer};
use crate::error::{invalid_argument, AnalyticsResult, ErrorHandler, LoggingErrorHandler};
use crate::executor::{ResponseFuture, WorkerPool};
use crate::hit::types::{
    AnyHit, AppViewHit, EventHit, ExceptionHit, ItemHit, PageViewHit, ScreenViewHit, SocialHit,
    TimingHit, TransactionHit,
};
use crate::hit::Hit;
use crate::parameter::{self, Parameter};
use crate::response::Response;
use crate::serialize;
use crate::stats::{HitStats, StatsSnapshot};
use crate::transport::{HttpRequest, HttpTransport, ReqwestHttpTransport};

/// A Measurement Protocol tracking client.
///
/// Create one per tracking id and reuse it for every hit; the handle is a
/// cheap clone over shared state and is safe to use from any thread. The
/// client owns resources (worker threads, HTTP connections), so call
/// [`close`](Self::close) when tracking is finished; a closed client cannot
/// be reused.
#[derive(Clone)]
pub struct GoogleAnalytics {
    inner: Arc<Inner>,
}

struct Inner {
    config: AnalyticsConfig,
    // Read by every send, written only before construction completes.
    default_hit: Hit,
    transport: Arc<dyn HttpTransport>,
    error_handler: Arc<dyn ErrorHandler>,
    pool: WorkerPool,
    batch: BatchBuffer,
    stats: HitStats,
    closed: AtomicBool,
}

impl fmt::Debug for GoogleAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAnalytics")
            .field(
                "tracking_id",
                &self.inner.default_hit.text(Parameter::TrackingId),
            )
            .field("enabled", &self.inner.config.enabled())
            .finish()
    }
}

impl GoogleAnalytics {
    /// Starts building a client for the given tracking id.
    pub fn builder(tracking_id: impl Into<String>) -> GoogleAnalyticsBuilder {
        GoogleAnalyticsBuilder::new(tracking_id)
    }

    /// A client with default configuration.
    pub fn new(tracking_id: impl Into<String>) -> AnalyticsResult<Self> {
        Self::builder(tracking_id).build()
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.inner.config
    }

    /// The template hit whose values back-fill every sent hit.
    pub fn default_hit(&self) -> &Hit {
        &self.inner.default_hit
    }

    /// Synchronously dispatches one hit: merges the defaults, serializes,
    /// then either posts directly or hands the body to the batching buffer.
    ///
    /// With the default [`LoggingErrorHandler`] this never fails on
    /// transport problems; the returned [`Response`] simply carries no
    /// status code. A [`PropagatingErrorHandler`](crate::error::PropagatingErrorHandler)
    /// turns those into `Err` instead.
    pub fn send(&self, hit: &Hit) -> AnalyticsResult<Response> {
        if !self.inner.config.enabled() || self.inner.closed.load(Ordering::SeqCst) {
            return Ok(Response::default());
        }
        self.dispatch(hit)
    }

    /// The merge/serialize/post pipeline without the closed gate. The gate
    /// only rejects new work: jobs the pool accepted before `close` run
    /// through here while the pool drains during shutdown.
    fn dispatch(&self, hit: &Hit) -> AnalyticsResult<Response> {
        let merged = serialize::merge_defaults(hit, &self.inner.default_hit);
        if self.inner.config.validate() {
            for issue in parameter::validate(&merged) {
                log::warn!("hit validation: {issue}");
            }
        }

        let payload = serialize::build_post(merged, &self.inner.config, Utc::now());
        let hit_type = payload.hit_type.clone();
        let body = payload.body.clone();
        log::debug!("dispatching {hit_type} hit: {body:?}");

        let outcome = if self.inner.config.batching_enabled() {
            self.inner
                .batch
                .enqueue(BatchEntry::from(payload), self.inner.transport.as_ref())
                .map(|_| Response::buffered(body.clone()))
        } else {
            self.inner
                .transport
                .post(&HttpRequest {
                    url: self.inner.config.collect_url().to_string(),
                    body: body.clone(),
                })
                .map(|http| Response::sent(http.status_code, body.clone()))
        };

        match outcome {
            Ok(response) => {
                if self.inner.config.gather_stats() {
                    self.inner.stats.record(&hit_type);
                }
                Ok(response)
            }
            Err(err) => {
                self.inner.error_handler.on_error(err)?;
                Ok(Response::failed(body))
            }
        }
    }

    /// Schedules the dispatch on the worker pool. For a disabled or closed
    /// client the returned future is already completed and nothing is
    /// scheduled; once accepted, a dispatch always completes, even if the
    /// client is closed in the meantime. When the pool's queue is full the
    /// dispatch runs on the calling thread instead of being dropped.
    pub fn send_async(&self, hit: Hit) -> ResponseFuture {
        if !self.inner.config.enabled() || self.inner.closed.load(Ordering::SeqCst) {
            return ResponseFuture::completed(Ok(Response::default()));
        }

        let (sender, future) = ResponseFuture::channel();
        let client = self.clone();
        self.inner.pool.execute(Box::new(move || {
            let _ = sender.send(client.dispatch(&hit));
        }));
        future
    }

    /// Posts the hit to the debug collect endpoint and returns the service's
    /// validation verdict. Nothing is recorded, stats are untouched, and
    /// transport errors propagate directly rather than going through the
    /// error handler.
    pub fn send_debug(&self, hit: &Hit) -> AnalyticsResult<HitValidationResponse> {
        let merged = serialize::merge_defaults(hit, &self.inner.default_hit);
        let payload = serialize::build_post(merged, &self.inner.config, Utc::now());
        let http = self.inner.transport.post(&HttpRequest {
            url: self.inner.config.debug_url().to_string(),
            body: payload.body,
        })?;
        HitValidationResponse::from_json(&http.body)
    }

    /// Force-flushes the batching buffer. Errors follow the configured
    /// error handler policy, like a single send.
    pub fn flush(&self) -> AnalyticsResult<()> {
        match self.inner.batch.flush(self.inner.transport.as_ref()) {
            Ok(()) => Ok(()),
            Err(err) => self.inner.error_handler.on_error(err),
        }
    }

    /// Stops accepting new hits, lets async dispatches already accepted by
    /// the pool finish, flushes any pending batch and closes the transport.
    /// Idempotent; subsequent sends no-op.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // Drain the pool first: its jobs may still add entries to the batch
        // buffer, and those must leave with the final flush.
        self.inner.pool.shutdown();
        if let Err(err) = self.inner.batch.flush(self.inner.transport.as_ref()) {
            log::warn!("failed to flush pending batch during close: {err}");
        }
        self.inner.transport.close();
    }

    /// A point-in-time copy of the dispatch counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Atomically replaces all counters with a zeroed set.
    pub fn reset_stats(&self) {
        self.inner.stats.reset();
    }

    pub fn page_view(&self) -> PageViewHit {
        PageViewHit::bound(self.clone())
    }

    pub fn page_view_with(
        &self,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> PageViewHit {
        self.page_view().document_url(url).document_title(title)
    }

    pub fn screen_view(&self) -> ScreenViewHit {
        ScreenViewHit::bound(self.clone())
    }

    pub fn app_view(&self) -> AppViewHit {
        AppViewHit::bound(self.clone())
    }

    pub fn event(&self) -> EventHit {
        EventHit::bound(self.clone())
    }

    pub fn event_with(
        &self,
        category: impl Into<String>,
        action: impl Into<String>,
    ) -> EventHit {
        self.event().event_category(category).event_action(action)
    }

    pub fn transaction(&self) -> TransactionHit {
        TransactionHit::bound(self.clone())
    }

    pub fn item(&self) -> ItemHit {
        ItemHit::bound(self.clone())
    }

    pub fn social(&self) -> SocialHit {
        SocialHit::bound(self.clone())
    }

    pub fn timing(&self) -> TimingHit {
        TimingHit::bound(self.clone())
    }

    pub fn exception(&self) -> ExceptionHit {
        ExceptionHit::bound(self.clone())
    }

    pub fn any_hit(&self) -> AnyHit {
        AnyHit::bound(self.clone())
    }
}

pub struct GoogleAnalyticsBuilder {
    config: AnalyticsConfig,
    default_hit: Hit,
    transport: Option<Arc<dyn HttpTransport>>,
    discoverer: Arc<dyn ParameterDiscoverer>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl GoogleAnalyticsBuilder {
    fn new(tracking_id: impl Into<String>) -> Self {
        let mut default_hit = Hit::new();
        default_hit
            .set_text(Parameter::ProtocolVersion, Some("1"))
            .set_text(Parameter::TrackingId, Some(tracking_id.into()))
            .set_text(Parameter::ClientId, Some(generate_client_id()));
        Self {
            config: AnalyticsConfig::default(),
            default_hit,
            transport: None,
            discoverer: Arc::new(SystemParameterDiscoverer),
            error_handler: Arc::new(LoggingErrorHandler),
        }
    }

    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default hit template entirely. The template must carry a
    /// tracking id by build time.
    pub fn with_default_hit(mut self, default_hit: Hit) -> Self {
        self.default_hit = default_hit;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.default_hit
            .set_text(Parameter::ApplicationName, Some(name.into()));
        self
    }

    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.default_hit
            .set_text(Parameter::ApplicationVersion, Some(version.into()));
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.default_hit
            .set_text(Parameter::ClientId, Some(client_id.into()));
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_discoverer(mut self, discoverer: Arc<dyn ParameterDiscoverer>) -> Self {
        self.discoverer = discoverer;
        self
    }

    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    pub fn build(self) -> AnalyticsResult<GoogleAnalytics> {
        let mut config = self.config;
        let mut default_hit = self.default_hit;

        if config.discover_parameters() {
            self.discoverer.discover(&mut config, &mut default_hit);
        }

        if default_hit.text(Parameter::TrackingId).is_none() {
            return Err(invalid_argument("tracking id must not be empty"));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestHttpTransport::new(&config)?),
        };

        let pool = WorkerPool::new(
            config.max_threads(),
            config.thread_queue_size(),
            config.thread_name_prefix(),
        )?;
        let batch = BatchBuffer::new(
            config.batch_url(),
            config.batch_size(),
            config.auto_queue_time(),
        );

        log::debug!("initialized Google Analytics client with {config:?} and defaults {default_hit:?}");

        Ok(GoogleAnalytics {
            inner: Arc::new(Inner {
                config,
                default_hit,
                transport,
                error_handler: self.error_handler,
                pool,
                batch,
                stats: HitStats::new(),
                closed: AtomicBool::new(false),
            }),
        })
    }
}

/// A random version-4 UUID, the protocol's recommended client id shape.
fn generate_client_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{network_error, PropagatingErrorHandler};
    use crate::transport::{HttpBatchRequest, HttpResponse};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        posts: Mutex<Vec<HttpRequest>>,
        batches: Mutex<Vec<HttpBatchRequest>>,
        fail: AtomicBool,
        status_code: Option<u16>,
        response_body: Option<String>,
        delay: Option<std::time::Duration>,
    }

    impl RecordingTransport {
        fn post_count(&self) -> usize {
            self.posts.lock().unwrap().len()
        }

        fn batch_count(&self) -> usize {
            self.batches.lock().unwrap().len()
        }
    }

    impl HttpTransport for RecordingTransport {
        fn post(&self, request: &HttpRequest) -> AnalyticsResult<HttpResponse> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(network_error("collect endpoint unreachable"));
            }
            self.posts.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status_code: self.status_code.unwrap_or(200),
                body: self.response_body.clone().unwrap_or_default(),
            })
        }

        fn post_batch(&self, batch: &HttpBatchRequest) -> AnalyticsResult<HttpResponse> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(network_error("batch endpoint unreachable"));
            }
            self.batches.lock().unwrap().push(batch.clone());
            Ok(HttpResponse {
                status_code: 200,
                body: String::new(),
            })
        }
    }

    fn client_with(
        config: AnalyticsConfig,
        transport: Arc<RecordingTransport>,
    ) -> GoogleAnalytics {
        GoogleAnalytics::builder("UA-612100-12")
            .with_config(config.with_discover_parameters(false))
            .with_client_id("fixed-client")
            .with_transport(transport)
            .build()
            .unwrap()
    }

    fn base_config() -> AnalyticsConfig {
        AnalyticsConfig::new().with_auto_queue_time(false)
    }

    #[test]
    fn send_posts_merged_parameters() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config(), Arc::clone(&transport));

        let response = client
            .send(&PageViewHit::new().document_path("/pricing").into())
            .unwrap();

        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.posted_param("v"), Some("1"));
        assert_eq!(response.posted_param("tid"), Some("UA-612100-12"));
        assert_eq!(response.posted_param("cid"), Some("fixed-client"));
        assert_eq!(response.posted_param("t"), Some("pageview"));
        assert_eq!(response.posted_param("dp"), Some("/pricing"));

        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].body, response.posted_params());
    }

    #[test]
    fn explicit_hit_values_beat_the_defaults() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config(), Arc::clone(&transport));

        let mut hit: Hit = EventHit::new().event_category("video").into();
        hit.set_text(Parameter::ClientId, Some("caller-cid"));

        let response = client.send(&hit).unwrap();
        assert_eq!(response.posted_param("cid"), Some("caller-cid"));
    }

    #[test]
    fn disabled_client_never_touches_transport_or_stats() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(
            base_config().with_enabled(false).with_gather_stats(true),
            Arc::clone(&transport),
        );

        let response = client.send(&Hit::new()).unwrap();
        assert_eq!(response, Response::default());
        assert_eq!(transport.post_count(), 0);
        assert_eq!(client.stats().total_hits(), 0);

        let future = client.send_async(Hit::new());
        assert!(future.try_wait().is_some());
        assert_eq!(transport.post_count(), 0);
    }

    #[test]
    fn stats_count_dispatches_per_hit_type() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config().with_gather_stats(true), transport);

        for _ in 0..3 {
            client.send(&PageViewHit::new().into()).unwrap();
        }
        for _ in 0..2 {
            client.send(&EventHit::new().into()).unwrap();
        }
        client.send(&TimingHit::new().into()).unwrap();

        let stats = client.stats();
        assert_eq!(stats.page_view_hits(), 3);
        assert_eq!(stats.event_hits(), 2);
        assert_eq!(stats.timing_hits(), 1);
        assert_eq!(stats.total_hits(), 6);

        client.reset_stats();
        assert_eq!(client.stats(), StatsSnapshot::default());
    }

    #[test]
    fn stats_stay_zero_when_gathering_is_off() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config(), Arc::clone(&transport));
        client.send(&Hit::new()).unwrap();
        assert_eq!(transport.post_count(), 1);
        assert_eq!(client.stats().total_hits(), 0);
    }

    #[test]
    fn batching_buffers_until_the_threshold() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(
            base_config().with_batching(true, 3),
            Arc::clone(&transport),
        );

        for i in 0..2 {
            let response = client
                .send(&PageViewHit::new().document_path(format!("/{i}")).into())
                .unwrap();
            assert!(response.is_buffered());
            assert_eq!(response.status_code(), None);
        }
        assert_eq!(transport.batch_count(), 0);

        client.send(&PageViewHit::new().document_path("/2").into()).unwrap();

        let batches = transport.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].bodies.len(), 3);
        assert_eq!(transport.post_count(), 0);
    }

    #[test]
    fn flush_drains_a_partial_batch() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(
            base_config().with_batching(true, 100),
            Arc::clone(&transport),
        );
        client.send(&Hit::new()).unwrap();
        client.flush().unwrap();
        assert_eq!(transport.batch_count(), 1);
    }

    #[test]
    fn close_flushes_and_is_idempotent() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(
            base_config().with_batching(true, 100),
            Arc::clone(&transport),
        );
        client.send(&Hit::new()).unwrap();

        client.close();
        assert_eq!(transport.batch_count(), 1);
        client.close();
        assert_eq!(transport.batch_count(), 1);

        // Closed clients no-op.
        let response = client.send(&Hit::new()).unwrap();
        assert_eq!(response, Response::default());
    }

    #[test]
    fn close_completes_async_hits_already_accepted() {
        let transport = Arc::new(RecordingTransport {
            delay: Some(std::time::Duration::from_millis(50)),
            ..Default::default()
        });
        let client = client_with(
            base_config().with_threads(0, 1).with_thread_queue_size(16),
            Arc::clone(&transport),
        );

        let futures: Vec<_> = (0..6)
            .map(|i| {
                client.send_async(PageViewHit::new().document_path(format!("/{i}")).into())
            })
            .collect();
        client.close();

        // Everything accepted by the pool before close must still post.
        assert_eq!(transport.post_count(), 6);
        for future in futures {
            let response = future.try_wait().expect("dispatch finished during close");
            assert_eq!(response.unwrap().status_code(), Some(200));
        }
    }

    #[test]
    fn send_async_resolves_with_the_response() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config(), Arc::clone(&transport));

        let future = client.send_async(EventHit::new().event_action("play").into());
        let response = future.wait().unwrap();
        assert_eq!(response.status_code(), Some(200));
        assert_eq!(response.posted_param("ea"), Some("play"));
        assert_eq!(transport.post_count(), 1);
        client.close();
    }

    #[test]
    fn transport_failure_is_swallowed_by_default() {
        let transport = Arc::new(RecordingTransport::default());
        transport.fail.store(true, Ordering::SeqCst);
        let client = client_with(base_config(), Arc::clone(&transport));

        let response = client.send(&Hit::new()).unwrap();
        assert_eq!(response.status_code(), None);
        assert!(!response.posted_params().is_empty());
    }

    #[test]
    fn propagating_handler_surfaces_transport_failure() {
        let transport = Arc::new(RecordingTransport::default());
        transport.fail.store(true, Ordering::SeqCst);
        let client = GoogleAnalytics::builder("UA-612100-12")
            .with_config(base_config().with_discover_parameters(false))
            .with_transport(Arc::clone(&transport) as Arc<dyn HttpTransport>)
            .with_error_handler(Arc::new(PropagatingErrorHandler))
            .build()
            .unwrap();

        let err = client.send(&Hit::new()).unwrap_err();
        assert_eq!(err.code_str(), "analytics/network");
    }

    #[test]
    fn bound_factories_send_through_their_client() {
        let transport = Arc::new(RecordingTransport::default());
        let client = client_with(base_config(), Arc::clone(&transport));

        let response = client
            .event_with("video", "play")
            .event_label("intro")
            .send()
            .unwrap();
        assert_eq!(response.posted_param("ec"), Some("video"));
        assert_eq!(response.posted_param("ea"), Some("play"));
        assert_eq!(response.posted_param("el"), Some("intro"));
        assert_eq!(response.posted_param("t"), Some("event"));

        let future = client
            .page_view_with("https://example.test/", "Home")
            .send_async()
            .unwrap();
        let response = future.wait().unwrap();
        assert_eq!(response.posted_param("dl"), Some("https://example.test/"));
        assert_eq!(transport.post_count(), 2);
    }

    #[test]
    fn send_debug_parses_the_validation_verdict() {
        let transport = Arc::new(RecordingTransport {
            response_body: Some(
                r#"{"hitParsingResult":[{"valid":true,"hit":"/debug/collect","parserMessage":[]}]}"#
                    .to_string(),
            ),
            ..Default::default()
        });
        let client = client_with(base_config(), Arc::clone(&transport));

        let verdict = client.send_debug(&Hit::new()).unwrap();
        assert!(verdict.is_valid());

        // The debug call is a diagnostic: no stats, posted to the debug URL.
        assert_eq!(client.stats().total_hits(), 0);
        let posts = transport.posts.lock().unwrap();
        assert_eq!(posts[0].url, crate::config::DEFAULT_DEBUG_COLLECT_URL);
    }

    #[test]
    fn builder_rejects_a_blank_tracking_id() {
        let err = GoogleAnalytics::builder("  ")
            .with_config(AnalyticsConfig::new().with_discover_parameters(false))
            .build()
            .unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-argument");
    }

    #[test]
    fn generated_client_ids_are_uuid_shaped() {
        let id = generate_client_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
        assert_ne!(generate_client_id(), id);
    }
}
