//! The pluggable HTTP layer.
//!
//! The dispatch pipeline only knows about [`HttpTransport`]; the default
//! implementation posts through a blocking `reqwest` client. Non-2xx status
//! codes are not errors at this layer; the status is reported upward and
//! interpreted by the caller.

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::config::AnalyticsConfig;
use crate::error::{internal_error, network_error, AnalyticsResult};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One collect call: a URL plus the flattened form body.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub body: Vec<(String, String)>,
}

/// A batch call: several form bodies posted as one request, each entry's
/// URL-encoded body joined by CRLF.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpBatchRequest {
    pub url: String,
    pub bodies: Vec<Vec<(String, String)>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

pub trait HttpTransport: Send + Sync {
    fn post(&self, request: &HttpRequest) -> AnalyticsResult<HttpResponse>;

    fn post_batch(&self, batch: &HttpBatchRequest) -> AnalyticsResult<HttpResponse>;

    /// Releases any underlying connections. Called once from
    /// [`GoogleAnalytics::close`](crate::GoogleAnalytics::close).
    fn close(&self) {}
}

/// URL-encodes one form body.
pub(crate) fn encode_form(params: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Joins batch entries into the batch endpoint's wire format.
pub(crate) fn encode_batch(bodies: &[Vec<(String, String)>]) -> String {
    bodies
        .iter()
        .map(|body| encode_form(body))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Default transport backed by a blocking `reqwest` client, honoring the
/// configured timeout, user agent and proxy.
#[derive(Clone, Debug)]
pub struct ReqwestHttpTransport {
    client: Client,
}

impl ReqwestHttpTransport {
    pub fn new(config: &AnalyticsConfig) -> AnalyticsResult<Self> {
        let mut builder = Client::builder().timeout(config.request_timeout());

        if let Some(user_agent) = config.user_agent() {
            builder = builder.user_agent(user_agent.to_string());
        }

        if let Some(host) = config.proxy_host() {
            let mut proxy = reqwest::Proxy::all(format!("http://{host}:{}", config.proxy_port()))
                .map_err(|err| internal_error(format!("invalid proxy configuration: {err}")))?;
            if let (Some(user), Some(password)) =
                (config.proxy_user_name(), config.proxy_password())
            {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|err| internal_error(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }

    fn post_body(&self, url: &str, body: String) -> AnalyticsResult<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|err| network_error(format!("failed to post tracking request: {err}")))?;

        let status_code = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Ok(HttpResponse { status_code, body })
    }
}

impl HttpTransport for ReqwestHttpTransport {
    fn post(&self, request: &HttpRequest) -> AnalyticsResult<HttpResponse> {
        self.post_body(&request.url, encode_form(&request.body))
    }

    fn post_batch(&self, batch: &HttpBatchRequest) -> AnalyticsResult<HttpResponse> {
        self.post_body(&batch.url, encode_batch(&batch.bodies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn encodes_form_bodies() {
        let body = pairs(&[("tid", "UA-1"), ("dt", "hello world"), ("dp", "/a&b")]);
        assert_eq!(encode_form(&body), "tid=UA-1&dt=hello+world&dp=%2Fa%26b");
    }

    #[test]
    fn batch_entries_are_joined_by_crlf() {
        let bodies = vec![pairs(&[("t", "pageview")]), pairs(&[("t", "event")])];
        assert_eq!(encode_batch(&bodies), "t=pageview\r\nt=event");
    }

    #[test]
    fn posts_form_encoded_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/collect")
                .header("content-type", FORM_CONTENT_TYPE)
                .body("v=1&tid=UA-1");
            then.status(200).body("ok");
        });

        let transport = ReqwestHttpTransport::new(&AnalyticsConfig::new()).unwrap();
        let response = transport
            .post(&HttpRequest {
                url: server.url("/collect"),
                body: pairs(&[("v", "1"), ("tid", "UA-1")]),
            })
            .unwrap();

        mock.assert();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "ok");
    }

    #[test]
    fn non_2xx_status_is_reported_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/collect");
            then.status(500);
        });

        let transport = ReqwestHttpTransport::new(&AnalyticsConfig::new()).unwrap();
        let response = transport
            .post(&HttpRequest {
                url: server.url("/collect"),
                body: pairs(&[("v", "1")]),
            })
            .unwrap();
        assert_eq!(response.status_code, 500);
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        let transport = ReqwestHttpTransport::new(
            &AnalyticsConfig::new().with_request_timeout(std::time::Duration::from_millis(200)),
        )
        .unwrap();
        let err = transport
            .post(&HttpRequest {
                url: "http://127.0.0.1:9/collect".to_string(),
                body: pairs(&[("v", "1")]),
            })
            .unwrap_err();
        assert_eq!(err.code_str(), "analytics/network");
    }

    #[test]
    fn batch_post_sends_one_request_with_joined_bodies() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/batch")
                .body("t=pageview&tid=UA-1\r\nt=event&tid=UA-1");
            then.status(200);
        });

        let transport = ReqwestHttpTransport::new(&AnalyticsConfig::new()).unwrap();
        transport
            .post_batch(&HttpBatchRequest {
                url: server.url("/batch"),
                bodies: vec![
                    pairs(&[("t", "pageview"), ("tid", "UA-1")]),
                    pairs(&[("t", "event"), ("tid", "UA-1")]),
                ],
            })
            .unwrap();

        mock.assert();
    }
}
