//! Static catalog of Measurement Protocol parameters.
//!
//! Every protocol key the library knows about is a [`Parameter`] variant
//! carrying its wire name, value type, required flag, the hit types it
//! applies to and its documented maximum length. The catalog is closed and
//! immutable; the rest of the crate refers to parameters by identity.
//!
//! See the protocol parameter reference:
//! <https://developers.google.com/analytics/devguides/collection/protocol/v1/parameters>

use crate::hit::Hit;

pub const HIT_PAGEVIEW: &str = "pageview";
pub const HIT_SCREENVIEW: &str = "screenview";
pub const HIT_APPVIEW: &str = "appview";
pub const HIT_EVENT: &str = "event";
pub const HIT_ITEM: &str = "item";
pub const HIT_TRANSACTION: &str = "transaction";
pub const HIT_SOCIAL: &str = "social";
pub const HIT_TIMING: &str = "timing";
pub const HIT_EXCEPTION: &str = "exception";

/// How a parameter's value is typed on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Integer,
    Boolean,
    Currency,
}

/// A Measurement Protocol parameter key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    // General
    ProtocolVersion,
    TrackingId,
    AnonymizeIp,
    QueueTime,
    CacheBuster,
    DataSource,
    // Visitor
    ClientId,
    UserId,
    // Session
    SessionControl,
    UserIp,
    UserAgent,
    GeoId,
    // Traffic sources
    DocumentReferrer,
    CampaignName,
    CampaignSource,
    CampaignMedium,
    CampaignKeyword,
    CampaignContent,
    CampaignId,
    AdwordsId,
    DisplayAdsId,
    // System info
    ScreenResolution,
    ViewportSize,
    DocumentEncoding,
    ScreenColors,
    UserLanguage,
    JavaEnabled,
    FlashVersion,
    // Hit
    HitType,
    NonInteractionHit,
    // Content information
    DocumentUrl,
    DocumentHostName,
    DocumentPath,
    DocumentTitle,
    LinkId,
    // App tracking
    ApplicationName,
    ApplicationId,
    ApplicationVersion,
    ApplicationInstallerId,
    // Event tracking
    EventCategory,
    EventAction,
    EventLabel,
    EventValue,
    // E-commerce
    TransactionId,
    TransactionAffiliation,
    TransactionRevenue,
    TransactionShipping,
    TransactionTax,
    ItemName,
    ItemPrice,
    ItemQuantity,
    ItemCode,
    ItemCategory,
    CurrencyCode,
    // Social interactions
    SocialNetwork,
    SocialAction,
    SocialActionTarget,
    // Timing
    UserTimingCategory,
    UserTimingVariableName,
    UserTimingTime,
    UserTimingLabel,
    PageLoadTime,
    DnsTime,
    PageDownloadTime,
    RedirectResponseTime,
    TcpConnectTime,
    ServerResponseTime,
    // Exceptions
    ExceptionDescription,
    ExceptionFatal,
    // Experiments
    ExperimentId,
    ExperimentVariant,
    // Screen view
    ScreenName,
}

impl Parameter {
    /// The short protocol key used in the HTTP form body. Wire names are
    /// unique across the catalog.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Parameter::ProtocolVersion => "v",
            Parameter::TrackingId => "tid",
            Parameter::AnonymizeIp => "aip",
            Parameter::QueueTime => "qt",
            Parameter::CacheBuster => "z",
            Parameter::DataSource => "ds",
            Parameter::ClientId => "cid",
            Parameter::UserId => "uid",
            Parameter::SessionControl => "sc",
            Parameter::UserIp => "uip",
            Parameter::UserAgent => "ua",
            Parameter::GeoId => "geoid",
            Parameter::DocumentReferrer => "dr",
            Parameter::CampaignName => "cn",
            Parameter::CampaignSource => "cs",
            Parameter::CampaignMedium => "cm",
            Parameter::CampaignKeyword => "ck",
            Parameter::CampaignContent => "cc",
            Parameter::CampaignId => "ci",
            Parameter::AdwordsId => "gclid",
            Parameter::DisplayAdsId => "dclid",
            Parameter::ScreenResolution => "sr",
            Parameter::ViewportSize => "vp",
            Parameter::DocumentEncoding => "de",
            Parameter::ScreenColors => "sd",
            Parameter::UserLanguage => "ul",
            Parameter::JavaEnabled => "je",
            Parameter::FlashVersion => "fl",
            Parameter::HitType => "t",
            Parameter::NonInteractionHit => "ni",
            Parameter::DocumentUrl => "dl",
            Parameter::DocumentHostName => "dh",
            Parameter::DocumentPath => "dp",
            Parameter::DocumentTitle => "dt",
            Parameter::LinkId => "linkid",
            Parameter::ApplicationName => "an",
            Parameter::ApplicationId => "aid",
            Parameter::ApplicationVersion => "av",
            Parameter::ApplicationInstallerId => "aiid",
            Parameter::EventCategory => "ec",
            Parameter::EventAction => "ea",
            Parameter::EventLabel => "el",
            Parameter::EventValue => "ev",
            Parameter::TransactionId => "ti",
            Parameter::TransactionAffiliation => "ta",
            Parameter::TransactionRevenue => "tr",
            Parameter::TransactionShipping => "ts",
            Parameter::TransactionTax => "tt",
            Parameter::ItemName => "in",
            Parameter::ItemPrice => "ip",
            Parameter::ItemQuantity => "iq",
            Parameter::ItemCode => "ic",
            Parameter::ItemCategory => "iv",
            Parameter::CurrencyCode => "cu",
            Parameter::SocialNetwork => "sn",
            Parameter::SocialAction => "sa",
            Parameter::SocialActionTarget => "st",
            Parameter::UserTimingCategory => "utc",
            Parameter::UserTimingVariableName => "utv",
            Parameter::UserTimingTime => "utt",
            Parameter::UserTimingLabel => "utl",
            Parameter::PageLoadTime => "plt",
            Parameter::DnsTime => "dns",
            Parameter::PageDownloadTime => "pdt",
            Parameter::RedirectResponseTime => "rrt",
            Parameter::TcpConnectTime => "tcp",
            Parameter::ServerResponseTime => "srt",
            Parameter::ExceptionDescription => "exd",
            Parameter::ExceptionFatal => "exf",
            Parameter::ExperimentId => "xid",
            Parameter::ExperimentVariant => "xvar",
            Parameter::ScreenName => "cd",
        }
    }

    pub const fn value_type(self) -> ValueType {
        match self {
            Parameter::AnonymizeIp
            | Parameter::JavaEnabled
            | Parameter::ExceptionFatal => ValueType::Boolean,
            Parameter::QueueTime
            | Parameter::EventValue
            | Parameter::ItemQuantity
            | Parameter::UserTimingTime
            | Parameter::PageLoadTime
            | Parameter::DnsTime
            | Parameter::PageDownloadTime
            | Parameter::RedirectResponseTime
            | Parameter::TcpConnectTime
            | Parameter::ServerResponseTime => ValueType::Integer,
            Parameter::TransactionRevenue
            | Parameter::TransactionShipping
            | Parameter::TransactionTax
            | Parameter::ItemPrice => ValueType::Currency,
            _ => ValueType::Text,
        }
    }

    pub const fn is_required(self) -> bool {
        matches!(
            self,
            Parameter::ProtocolVersion
                | Parameter::TrackingId
                | Parameter::ClientId
                | Parameter::HitType
                | Parameter::ScreenName
        )
    }

    /// Documented maximum value length in bytes; 0 means unbounded.
    pub const fn max_length(self) -> usize {
        match self {
            Parameter::DocumentReferrer
            | Parameter::DocumentUrl
            | Parameter::DocumentPath
            | Parameter::SocialActionTarget
            | Parameter::ScreenName => 2048,
            Parameter::DocumentTitle => 1500,
            Parameter::CampaignKeyword
            | Parameter::CampaignContent
            | Parameter::EventAction
            | Parameter::EventLabel
            | Parameter::TransactionId
            | Parameter::TransactionAffiliation
            | Parameter::ItemName
            | Parameter::ItemCode
            | Parameter::ItemCategory
            | Parameter::UserTimingVariableName
            | Parameter::UserTimingLabel => 500,
            Parameter::CampaignName
            | Parameter::CampaignSource
            | Parameter::CampaignId
            | Parameter::DocumentHostName
            | Parameter::ApplicationName
            | Parameter::ApplicationVersion => 100,
            Parameter::CampaignMedium
            | Parameter::SocialNetwork
            | Parameter::SocialAction => 50,
            Parameter::ApplicationId | Parameter::ApplicationInstallerId => 150,
            Parameter::EventCategory
            | Parameter::UserTimingCategory
            | Parameter::ExceptionDescription => 150,
            Parameter::ScreenResolution
            | Parameter::ViewportSize
            | Parameter::DocumentEncoding
            | Parameter::ScreenColors
            | Parameter::UserLanguage
            | Parameter::FlashVersion => 20,
            Parameter::ExperimentId => 40,
            Parameter::CurrencyCode => 10,
            _ => 0,
        }
    }

    /// Hit types the parameter is documented for; empty means all.
    pub const fn applicable_hit_types(self) -> &'static [&'static str] {
        match self {
            Parameter::EventCategory
            | Parameter::EventAction
            | Parameter::EventLabel
            | Parameter::EventValue => &[HIT_EVENT],
            Parameter::TransactionId => &[HIT_TRANSACTION, HIT_ITEM],
            Parameter::TransactionAffiliation
            | Parameter::TransactionRevenue
            | Parameter::TransactionShipping
            | Parameter::TransactionTax => &[HIT_TRANSACTION],
            Parameter::ItemName
            | Parameter::ItemPrice
            | Parameter::ItemQuantity
            | Parameter::ItemCode
            | Parameter::ItemCategory => &[HIT_ITEM],
            Parameter::CurrencyCode => &[HIT_TRANSACTION, HIT_ITEM],
            Parameter::SocialNetwork
            | Parameter::SocialAction
            | Parameter::SocialActionTarget => &[HIT_SOCIAL],
            Parameter::UserTimingCategory
            | Parameter::UserTimingVariableName
            | Parameter::UserTimingTime
            | Parameter::UserTimingLabel
            | Parameter::PageLoadTime
            | Parameter::DnsTime
            | Parameter::PageDownloadTime
            | Parameter::RedirectResponseTime
            | Parameter::TcpConnectTime
            | Parameter::ServerResponseTime => &[HIT_TIMING],
            Parameter::ExceptionDescription | Parameter::ExceptionFatal => &[HIT_EXCEPTION],
            Parameter::ScreenName => &[HIT_SCREENVIEW],
            _ => &[],
        }
    }
}

/// Advisory validation of a hit against the catalog metadata.
///
/// Reports, but never rejects: parameters carried by a hit type they are not
/// documented for, and values exceeding their documented maximum length.
/// The dispatch path logs these as warnings when `AnalyticsConfig::validate`
/// is enabled.
pub fn validate(hit: &Hit) -> Vec<String> {
    let hit_type = hit.hit_type().to_string();
    let mut issues = Vec::new();

    for (parameter, value) in hit.parameters() {
        let applicable = parameter.applicable_hit_types();
        if !applicable.is_empty() && !applicable.iter().any(|t| t.eq_ignore_ascii_case(&hit_type)) {
            issues.push(format!(
                "parameter `{}` is not applicable to hit type `{hit_type}`",
                parameter.wire_name()
            ));
        }

        let max = parameter.max_length();
        if max > 0 && value.len() > max {
            issues.push(format!(
                "parameter `{}` value is {} bytes, exceeding the documented maximum of {max}",
                parameter.wire_name(),
                value.len()
            ));
        }
    }

    issues
}
