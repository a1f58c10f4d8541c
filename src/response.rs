/// The simplified outcome of dispatching one hit.
///
/// Carries the HTTP status code (when a transport call completed) and the
/// exact parameters that were posted, in body order. A disabled client
/// returns the default response: no status, no parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Response {
    status_code: Option<u16>,
    posted_params: Vec<(String, String)>,
    buffered: bool,
}

impl Response {
    pub(crate) fn sent(status_code: u16, posted_params: Vec<(String, String)>) -> Self {
        Self {
            status_code: Some(status_code),
            posted_params,
            buffered: false,
        }
    }

    /// The hit went into the batching buffer; no per-hit status exists.
    pub(crate) fn buffered(posted_params: Vec<(String, String)>) -> Self {
        Self {
            status_code: None,
            posted_params,
            buffered: true,
        }
    }

    /// The transport call never completed; the error went through the
    /// configured error handler.
    pub(crate) fn failed(posted_params: Vec<(String, String)>) -> Self {
        Self {
            status_code: None,
            posted_params,
            buffered: false,
        }
    }

    /// HTTP status of the collect call, `None` when the hit was buffered,
    /// dropped by a disabled client, or the call never completed.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status_code, Some(code) if (200..300).contains(&code))
    }

    /// Whether the hit was accepted into the batching buffer rather than
    /// posted individually.
    pub fn is_buffered(&self) -> bool {
        self.buffered
    }

    /// The flattened wire parameters that were (or would have been) posted.
    pub fn posted_params(&self) -> &[(String, String)] {
        &self.posted_params
    }

    /// Convenience lookup of a posted parameter by its wire name.
    pub fn posted_param(&self, wire_name: &str) -> Option<&str> {
        self.posted_params
            .iter()
            .find(|(name, _)| name == wire_name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_response_has_no_status_or_params() {
        let response = Response::default();
        assert_eq!(response.status_code(), None);
        assert!(!response.is_success());
        assert!(!response.is_buffered());
        assert!(response.posted_params().is_empty());
    }

    #[test]
    fn sent_response_reports_status_and_params() {
        let response = Response::sent(200, vec![("tid".into(), "UA-1".into())]);
        assert!(response.is_success());
        assert_eq!(response.posted_param("tid"), Some("UA-1"));
        assert_eq!(response.posted_param("cid"), None);
    }
}
