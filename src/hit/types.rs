//! Typed hit variants.
//!
//! Each variant wraps a plain [`Hit`], pre-sets its hit-type discriminator
//! and exposes chainable setters for the parameters that hit type documents.
//! Every wrapper derefs to the underlying [`Hit`], which is the generic
//! "any hit" view: mutations made through the deref are visible through the
//! wrapper and vice versa, because they share the same storage. Use
//! `clone()` when an independent copy is wanted instead.
//!
//! Wrappers produced by the [`GoogleAnalytics`] factory methods are bound to
//! that client, so a fully built hit can be dispatched in the same chain via
//! `send()` or `send_async()`.

use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};

use crate::api::GoogleAnalytics;
use crate::error::{invalid_argument, AnalyticsResult};
use crate::executor::ResponseFuture;
use crate::hit::Hit;
use crate::parameter::{
    Parameter, HIT_APPVIEW, HIT_EVENT, HIT_EXCEPTION, HIT_ITEM, HIT_PAGEVIEW, HIT_SCREENVIEW,
    HIT_SOCIAL, HIT_TIMING, HIT_TRANSACTION,
};
use crate::response::Response;

macro_rules! wrapper_setter {
    ($(#[$meta:meta])* text $method:ident => $param:ident) => {
        $(#[$meta])*
        pub fn $method(mut self, value: impl Into<String>) -> Self {
            self.hit.set_text(Parameter::$param, Some(value.into()));
            self
        }
    };
    ($(#[$meta:meta])* integer $method:ident => $param:ident) => {
        $(#[$meta])*
        pub fn $method(mut self, value: i64) -> Self {
            self.hit.set_integer(Parameter::$param, Some(value));
            self
        }
    };
    ($(#[$meta:meta])* currency $method:ident => $param:ident) => {
        $(#[$meta])*
        pub fn $method(mut self, value: f64) -> Self {
            self.hit.set_double(Parameter::$param, Some(value));
            self
        }
    };
    ($(#[$meta:meta])* boolean $method:ident => $param:ident) => {
        $(#[$meta])*
        pub fn $method(mut self, value: bool) -> Self {
            self.hit.set_boolean(Parameter::$param, Some(value));
            self
        }
    };
}

macro_rules! hit_wrapper {
    (
        $(#[$meta:meta])*
        $name:ident, $hit_type:expr, {
            $( $(#[$fmeta:meta])* $kind:ident $method:ident => $param:ident; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            hit: Hit,
            client: Option<GoogleAnalytics>,
        }

        impl $name {
            /// An unbound hit; dispatch it through
            /// [`GoogleAnalytics::send`].
            pub fn new() -> Self {
                Self {
                    hit: Hit::with_type($hit_type),
                    client: None,
                }
            }

            pub(crate) fn bound(client: GoogleAnalytics) -> Self {
                Self {
                    hit: Hit::with_type($hit_type),
                    client: Some(client),
                }
            }

            $( wrapper_setter!($(#[$fmeta])* $kind $method => $param); )*

            wrapper_setter!(text client_id => ClientId);
            wrapper_setter!(text user_id => UserId);
            wrapper_setter!(text user_ip => UserIp);
            wrapper_setter!(text user_agent => UserAgent);
            wrapper_setter!(text data_source => DataSource);
            wrapper_setter!(text campaign_name => CampaignName);
            wrapper_setter!(text campaign_source => CampaignSource);
            wrapper_setter!(text campaign_medium => CampaignMedium);
            wrapper_setter!(boolean anonymize_ip => AnonymizeIp);
            wrapper_setter!(boolean non_interaction => NonInteractionHit);
            wrapper_setter!(
                /// Explicit queue time in milliseconds. When auto queue-time
                /// is enabled, the elapsed time since `occurred_at` is added
                /// on top of this value at dispatch.
                integer queue_time => QueueTime
            );

            pub fn custom_dimension(mut self, index: u32, value: impl Into<String>) -> Self {
                self.hit.set_custom_dimension(index, Some(value.into()));
                self
            }

            pub fn custom_metric(mut self, index: u32, value: impl Into<String>) -> Self {
                self.hit.set_custom_metric(index, Some(value.into()));
                self
            }

            pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
                self.hit.set_occurred_at(occurred_at);
                self
            }

            /// Synchronously dispatches this hit through the client it was
            /// created from. Fails with `analytics/invalid-argument` when the
            /// hit is not bound to a client.
            pub fn send(&self) -> AnalyticsResult<Response> {
                match &self.client {
                    Some(client) => client.send(&self.hit),
                    None => Err(invalid_argument(concat!(
                        stringify!($name),
                        " is not bound to a client; use GoogleAnalytics::send"
                    ))),
                }
            }

            /// Schedules this hit on the client's worker pool.
            pub fn send_async(self) -> AnalyticsResult<ResponseFuture> {
                match self.client {
                    Some(client) => Ok(client.send_async(self.hit)),
                    None => Err(invalid_argument(concat!(
                        stringify!($name),
                        " is not bound to a client; use GoogleAnalytics::send_async"
                    ))),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Deref for $name {
            type Target = Hit;

            fn deref(&self) -> &Hit {
                &self.hit
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Hit {
                &mut self.hit
            }
        }

        impl From<$name> for Hit {
            fn from(value: $name) -> Hit {
                value.hit
            }
        }

        impl AsRef<Hit> for $name {
            fn as_ref(&self) -> &Hit {
                &self.hit
            }
        }
    };
}

hit_wrapper! {
    /// A `pageview` hit.
    PageViewHit, HIT_PAGEVIEW, {
        text document_url => DocumentUrl;
        text document_host_name => DocumentHostName;
        text document_path => DocumentPath;
        text document_title => DocumentTitle;
        text document_referrer => DocumentReferrer;
    }
}

hit_wrapper! {
    /// A `screenview` hit, for app tracking.
    ScreenViewHit, HIT_SCREENVIEW, {
        text screen_name => ScreenName;
        text application_name => ApplicationName;
        text application_id => ApplicationId;
        text application_version => ApplicationVersion;
        text application_installer_id => ApplicationInstallerId;
    }
}

hit_wrapper! {
    /// A legacy `appview` hit. Prefer [`ScreenViewHit`]; the protocol kept
    /// `appview` only for older properties.
    AppViewHit, HIT_APPVIEW, {
        text screen_name => ScreenName;
        text application_name => ApplicationName;
        text application_version => ApplicationVersion;
    }
}

hit_wrapper! {
    /// An `event` hit.
    EventHit, HIT_EVENT, {
        text event_category => EventCategory;
        text event_action => EventAction;
        text event_label => EventLabel;
        integer event_value => EventValue;
    }
}

hit_wrapper! {
    /// A `transaction` hit.
    TransactionHit, HIT_TRANSACTION, {
        text transaction_id => TransactionId;
        text affiliation => TransactionAffiliation;
        currency revenue => TransactionRevenue;
        currency shipping => TransactionShipping;
        currency tax => TransactionTax;
        text currency_code => CurrencyCode;
    }
}

hit_wrapper! {
    /// An `item` hit, one per line item of a transaction.
    ItemHit, HIT_ITEM, {
        text transaction_id => TransactionId;
        text item_name => ItemName;
        currency item_price => ItemPrice;
        integer item_quantity => ItemQuantity;
        text item_code => ItemCode;
        text item_category => ItemCategory;
        text currency_code => CurrencyCode;
    }
}

hit_wrapper! {
    /// A `social` interaction hit.
    SocialHit, HIT_SOCIAL, {
        text social_network => SocialNetwork;
        text social_action => SocialAction;
        text social_action_target => SocialActionTarget;
    }
}

hit_wrapper! {
    /// A user `timing` hit.
    TimingHit, HIT_TIMING, {
        text user_timing_category => UserTimingCategory;
        text user_timing_variable_name => UserTimingVariableName;
        integer user_timing_time => UserTimingTime;
        text user_timing_label => UserTimingLabel;
        integer page_load_time => PageLoadTime;
        integer dns_time => DnsTime;
        integer page_download_time => PageDownloadTime;
        integer redirect_response_time => RedirectResponseTime;
        integer tcp_connect_time => TcpConnectTime;
        integer server_response_time => ServerResponseTime;
    }
}

hit_wrapper! {
    /// An `exception` hit.
    ExceptionHit, HIT_EXCEPTION, {
        text description => ExceptionDescription;
        boolean fatal => ExceptionFatal;
    }
}

hit_wrapper! {
    /// The generic hit: defaults to `pageview` and exposes untyped access to
    /// any catalog parameter, for fields a narrower wrapper does not cover.
    AnyHit, HIT_PAGEVIEW, {
    }
}

impl AnyHit {
    /// Replaces the hit-type discriminator. Named `with_` so the deref'd
    /// [`Hit::hit_type`] getter stays callable through the wrapper.
    pub fn with_hit_type(mut self, hit_type: impl Into<String>) -> Self {
        self.hit.set_text(Parameter::HitType, Some(hit_type.into()));
        self
    }

    pub fn text(mut self, parameter: Parameter, value: impl Into<String>) -> Self {
        self.hit.set_text(parameter, Some(value.into()));
        self
    }

    pub fn integer(mut self, parameter: Parameter, value: i64) -> Self {
        self.hit.set_integer(parameter, Some(value));
        self
    }

    pub fn double(mut self, parameter: Parameter, value: f64) -> Self {
        self.hit.set_double(parameter, Some(value));
        self
    }

    pub fn boolean(mut self, parameter: Parameter, value: bool) -> Self {
        self.hit.set_boolean(parameter, Some(value));
        self
    }
}
