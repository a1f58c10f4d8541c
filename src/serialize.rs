//! Default-merge and wire serialization.
//!
//! Turns a per-call hit plus the client-wide default hit into the flattened
//! form-body parameters, applying the derived fields (IP anonymization and
//! auto queue-time) along the way. The caller's hit is never mutated; all
//! work happens on a cloned working copy.

use std::net::IpAddr;

use chrono::{DateTime, Utc};

use crate::config::AnalyticsConfig;
use crate::hit::Hit;
use crate::parameter::Parameter;

/// A hit serialized and ready for the transport, with enough context to
/// recompute the queue time when it leaves a batch later than it arrived.
#[derive(Clone, Debug)]
pub(crate) struct PostPayload {
    pub body: Vec<(String, String)>,
    pub hit_type: String,
    pub occurred_at: DateTime<Utc>,
    /// Explicit `qt` carried by the hit (after defaults), before the elapsed
    /// time since `occurred_at` is added on top.
    pub base_queue_time: Option<i64>,
}

/// Fills every blank parameter of `hit` from `defaults`, returning a working
/// copy. Custom dimensions and metrics merge the same way: defaults first,
/// per-call values win.
pub(crate) fn merge_defaults(hit: &Hit, defaults: &Hit) -> Hit {
    let mut merged = hit.clone();

    for (parameter, default_value) in defaults.parameters() {
        if merged.text(parameter).is_none() && !default_value.trim().is_empty() {
            merged.set_text(parameter, Some(default_value));
        }
    }

    for (index, value) in defaults.custom_dimensions() {
        if merged.custom_dimension(*index).is_none() {
            merged.set_custom_dimension(*index, Some(value.clone()));
        }
    }

    for (index, value) in defaults.custom_metrics() {
        if merged.custom_metric(*index).is_none() {
            merged.set_custom_metric(*index, Some(value.clone()));
        }
    }

    merged
}

/// Serializes a merged hit into the final body parameters.
pub(crate) fn build_post(mut merged: Hit, config: &AnalyticsConfig, now: DateTime<Utc>) -> PostPayload {
    if config.anonymize_ip() {
        if let Some(ip) = merged.text(Parameter::UserIp) {
            match anonymize_ip(ip) {
                Some(anonymized) => {
                    merged.set_text(Parameter::UserIp, Some(anonymized));
                }
                None => {
                    log::warn!("could not parse user ip `{ip}` for anonymization; leaving it unchanged");
                }
            }
        }
    }

    let base_queue_time = merged.integer(Parameter::QueueTime).ok().flatten();
    let occurred_at = merged.occurred_at();

    if config.auto_queue_time() {
        let queue_time = base_queue_time.unwrap_or(0) + elapsed_ms(occurred_at, now);
        merged.set_integer(Parameter::QueueTime, Some(queue_time));
    }

    PostPayload {
        hit_type: merged.hit_type().to_string(),
        body: flatten(&merged),
        occurred_at,
        base_queue_time,
    }
}

/// Milliseconds between `occurred_at` and `now`, clamped at zero so a hit
/// stamped in the future never produces a negative queue time.
pub(crate) fn elapsed_ms(occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - occurred_at).num_milliseconds().max(0)
}

/// Flattens parameters, custom dimensions and custom metrics into wire
/// key/value pairs: catalog order first, then `cd<N>`, then `cm<N>`. Blank
/// values are dropped from the body.
pub(crate) fn flatten(hit: &Hit) -> Vec<(String, String)> {
    let mut body = Vec::new();

    for (parameter, value) in hit.parameters() {
        if value.trim().is_empty() {
            continue;
        }
        body.push((parameter.wire_name().to_string(), value.to_string()));
    }

    for (index, value) in hit.custom_dimensions() {
        body.push((format!("cd{index}"), value.clone()));
    }

    for (index, value) in hit.custom_metrics() {
        body.push((format!("cm{index}"), value.clone()));
    }

    body
}

/// Zeroes the host-identifying low bits of an IP address: the last octet for
/// IPv4, the last 10 bytes for IPv6. Returns `None` when the value does not
/// parse as an IP address.
pub(crate) fn anonymize_ip(value: &str) -> Option<String> {
    match value.trim().parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => {
            let mut octets = v4.octets();
            octets[3] = 0;
            Some(std::net::Ipv4Addr::from(octets).to_string())
        }
        IpAddr::V6(v6) => {
            let mut bytes = v6.octets();
            for byte in bytes[6..].iter_mut() {
                *byte = 0;
            }
            Some(std::net::Ipv6Addr::from(bytes).to_string())
        }
    }
}
