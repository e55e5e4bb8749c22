use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Parameter, Value, ValueType};

/// The closed set of built-in parameters understood by the collection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownParameter {
    ApiVersion,
    AppId,
    AppInstallerId,
    AppName,
    AppVersion,
    CampaignContent,
    CampaignId,
    CampaignKeyword,
    CampaignMedium,
    CampaignName,
    CampaignSource,
    ClientId,
    CurrencyCode,
    Description,
    EventAction,
    EventCategory,
    EventLabel,
    EventValue,
    ExDescription,
    ExFatal,
    ItemCategory,
    ItemCode,
    ItemName,
    ItemPrice,
    ItemQuantity,
    Language,
    NonInteraction,
    SampleRateOverride,
    ScreenColors,
    ScreenResolution,
    SessionControl,
    SocialAction,
    SocialNetwork,
    SocialTarget,
    TimingCategory,
    TimingLabel,
    TimingValue,
    TimingVar,
    TrackingId,
    TransactionAffiliation,
    TransactionId,
    TransactionRevenue,
    TransactionShipping,
    TransactionTax,
    UserId,
    ViewportSize,
}

impl KnownParameter {
    /// Every built-in parameter, in declaration order.
    pub const ALL: [KnownParameter; 46] = [
        KnownParameter::ApiVersion,
        KnownParameter::AppId,
        KnownParameter::AppInstallerId,
        KnownParameter::AppName,
        KnownParameter::AppVersion,
        KnownParameter::CampaignContent,
        KnownParameter::CampaignId,
        KnownParameter::CampaignKeyword,
        KnownParameter::CampaignMedium,
        KnownParameter::CampaignName,
        KnownParameter::CampaignSource,
        KnownParameter::ClientId,
        KnownParameter::CurrencyCode,
        KnownParameter::Description,
        KnownParameter::EventAction,
        KnownParameter::EventCategory,
        KnownParameter::EventLabel,
        KnownParameter::EventValue,
        KnownParameter::ExDescription,
        KnownParameter::ExFatal,
        KnownParameter::ItemCategory,
        KnownParameter::ItemCode,
        KnownParameter::ItemName,
        KnownParameter::ItemPrice,
        KnownParameter::ItemQuantity,
        KnownParameter::Language,
        KnownParameter::NonInteraction,
        KnownParameter::SampleRateOverride,
        KnownParameter::ScreenColors,
        KnownParameter::ScreenResolution,
        KnownParameter::SessionControl,
        KnownParameter::SocialAction,
        KnownParameter::SocialNetwork,
        KnownParameter::SocialTarget,
        KnownParameter::TimingCategory,
        KnownParameter::TimingLabel,
        KnownParameter::TimingValue,
        KnownParameter::TimingVar,
        KnownParameter::TrackingId,
        KnownParameter::TransactionAffiliation,
        KnownParameter::TransactionId,
        KnownParameter::TransactionRevenue,
        KnownParameter::TransactionShipping,
        KnownParameter::TransactionTax,
        KnownParameter::UserId,
        KnownParameter::ViewportSize,
    ];

    /// `(id, wire name, type, max length)`.
    fn attributes(self) -> (&'static str, &'static str, ValueType, Option<usize>) {
        use KnownParameter::*;
        use ValueType::*;
        match self {
            ApiVersion => ("apiVersion", "v", Text, None),
            AppId => ("appId", "aid", Text, Some(150)),
            AppInstallerId => ("appInstallerId", "aiid", Text, Some(150)),
            AppName => ("appName", "an", Text, Some(100)),
            AppVersion => ("appVersion", "av", Text, Some(100)),
            CampaignContent => ("campaignContent", "cc", Text, Some(500)),
            CampaignId => ("campaignId", "ci", Text, Some(100)),
            CampaignKeyword => ("campaignKeyword", "ck", Text, Some(500)),
            CampaignMedium => ("campaignMedium", "cm", Text, Some(50)),
            CampaignName => ("campaignName", "cn", Text, Some(100)),
            CampaignSource => ("campaignSource", "cs", Text, Some(100)),
            ClientId => ("clientId", "cid", Text, None),
            CurrencyCode => ("currencyCode", "cu", Text, Some(10)),
            Description => ("description", "cd", Text, Some(2048)),
            EventAction => ("eventAction", "ea", Text, Some(500)),
            EventCategory => ("eventCategory", "ec", Text, Some(500)),
            EventLabel => ("eventLabel", "el", Text, Some(500)),
            EventValue => ("eventValue", "ev", Integer, None),
            ExDescription => ("exDescription", "exd", Text, Some(150)),
            ExFatal => ("exFatal", "exf", Boolean, None),
            ItemCategory => ("itemCategory", "iv", Text, Some(500)),
            ItemCode => ("itemCode", "ic", Text, Some(500)),
            ItemName => ("itemName", "in", Text, Some(500)),
            ItemPrice => ("itemPrice", "ip", Currency, None),
            ItemQuantity => ("itemQuantity", "iq", Integer, None),
            Language => ("language", "ul", Text, Some(20)),
            NonInteraction => ("nonInteraction", "ni", Boolean, None),
            SampleRateOverride => ("sampleRateOverride", "sf", Integer, None),
            ScreenColors => ("screenColors", "sd", Text, Some(20)),
            ScreenResolution => ("screenResolution", "sr", Text, Some(20)),
            SessionControl => ("sessionControl", "sc", Text, None),
            SocialAction => ("socialAction", "sa", Text, Some(50)),
            SocialNetwork => ("socialNetwork", "sn", Text, Some(50)),
            SocialTarget => ("socialTarget", "st", Text, Some(2048)),
            TimingCategory => ("timingCategory", "utc", Text, Some(150)),
            TimingLabel => ("timingLabel", "utl", Text, Some(500)),
            TimingValue => ("timingValue", "utt", Integer, None),
            TimingVar => ("timingVar", "utv", Text, Some(500)),
            TrackingId => ("trackingId", "tid", Text, None),
            TransactionAffiliation => ("transactionAffiliation", "ta", Text, Some(500)),
            TransactionId => ("transactionId", "ti", Text, Some(500)),
            TransactionRevenue => ("transactionRevenue", "tr", Currency, None),
            TransactionShipping => ("transactionShipping", "ts", Currency, None),
            TransactionTax => ("transactionTax", "tt", Currency, None),
            UserId => ("userId", "uid", Text, None),
            ViewportSize => ("viewportSize", "vp", Text, Some(20)),
        }
    }

    /// Values the endpoint assumes when the parameter is omitted.
    fn default_value(self) -> Option<Value> {
        match self {
            KnownParameter::ExFatal => Some(Value::Boolean(true)),
            KnownParameter::NonInteraction => Some(Value::Boolean(false)),
            KnownParameter::ItemPrice
            | KnownParameter::TransactionRevenue
            | KnownParameter::TransactionShipping
            | KnownParameter::TransactionTax => Some(Value::Currency(0.0)),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        self.attributes().0
    }

    pub fn wire_name(self) -> &'static str {
        self.attributes().1
    }

    pub fn value_type(self) -> ValueType {
        self.attributes().2
    }

    /// Look a built-in parameter up by its id (e.g. `"eventCategory"`).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Build the full descriptor.
    pub fn descriptor(self) -> Parameter {
        let (id, wire_name, value_type, max_length) = self.attributes();
        let mut parameter = Parameter::new(id, wire_name, value_type);
        if let Some(max) = max_length {
            parameter = parameter.with_max_length(max);
        }
        if let Some(default) = self.default_value() {
            parameter = parameter.with_default(default);
        }
        parameter
    }
}

impl From<KnownParameter> for Parameter {
    fn from(p: KnownParameter) -> Self {
        p.descriptor()
    }
}

impl fmt::Display for KnownParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
