use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Stable identifier for a supported identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    Google,
    GitHub,
    QQ,
    WeChat,
    WeChatMiniProgram,
    Facebook,
    DingTalk,
    Weibo,
    Gitee,
    LinkedIn,
    WeCom,
    Lark,
    GitLab,
    Adfs,
    Baidu,
    Alipay,
    Casdoor,
    Infoflow,
    Apple,
    AzureAd,
    Slack,
    Steam,
    Okta,
    Douyin,
    Bilibili,
    Custom,
}

impl ProviderType {
    /// Every supported provider type, in declaration order.
    pub const ALL: [ProviderType; 26] = [
        ProviderType::Google,
        ProviderType::GitHub,
        ProviderType::QQ,
        ProviderType::WeChat,
        ProviderType::WeChatMiniProgram,
        ProviderType::Facebook,
        ProviderType::DingTalk,
        ProviderType::Weibo,
        ProviderType::Gitee,
        ProviderType::LinkedIn,
        ProviderType::WeCom,
        ProviderType::Lark,
        ProviderType::GitLab,
        ProviderType::Adfs,
        ProviderType::Baidu,
        ProviderType::Alipay,
        ProviderType::Casdoor,
        ProviderType::Infoflow,
        ProviderType::Apple,
        ProviderType::AzureAd,
        ProviderType::Slack,
        ProviderType::Steam,
        ProviderType::Okta,
        ProviderType::Douyin,
        ProviderType::Bilibili,
        ProviderType::Custom,
    ];

    /// Returns the canonical wire form of the provider type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Google => "Google",
            ProviderType::GitHub => "GitHub",
            ProviderType::QQ => "QQ",
            ProviderType::WeChat => "WeChat",
            ProviderType::WeChatMiniProgram => "WeChatMiniProgram",
            ProviderType::Facebook => "Facebook",
            ProviderType::DingTalk => "DingTalk",
            ProviderType::Weibo => "Weibo",
            ProviderType::Gitee => "Gitee",
            ProviderType::LinkedIn => "LinkedIn",
            ProviderType::WeCom => "WeCom",
            ProviderType::Lark => "Lark",
            ProviderType::GitLab => "GitLab",
            ProviderType::Adfs => "Adfs",
            ProviderType::Baidu => "Baidu",
            ProviderType::Alipay => "Alipay",
            ProviderType::Casdoor => "Casdoor",
            ProviderType::Infoflow => "Infoflow",
            ProviderType::Apple => "Apple",
            ProviderType::AzureAd => "AzureAD",
            ProviderType::Slack => "Slack",
            ProviderType::Steam => "Steam",
            ProviderType::Okta => "Okta",
            ProviderType::Douyin => "Douyin",
            ProviderType::Bilibili => "Bilibili",
            ProviderType::Custom => "Custom",
        }
    }

    /// Construct a provider type from its canonical wire form.
    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == value)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized provider type slug.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider type `{0}`")]
pub struct ParseProviderTypeError(pub String);

impl FromStr for ProviderType {
    type Err = ParseProviderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slug(s).ok_or_else(|| ParseProviderTypeError(s.to_owned()))
    }
}

impl Serialize for ProviderType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let slug = String::deserialize(deserializer)?;
        Self::from_slug(&slug)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown provider type `{slug}`")))
    }
}

#[cfg(feature = "schemas")]
impl schemars::JsonSchema for ProviderType {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "ProviderType".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "enum": ProviderType::ALL.iter().map(|ty| ty.as_str()).collect::<Vec<_>>(),
        })
    }
}

/// Provider record as configured in the console, camelCase on the wire.
///
/// Most fields are only meaningful for a subset of provider types; the
/// resolver reads the ones its dispatch arm needs and validates them there.
#[cfg_attr(feature = "schemas", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub client_id: String,
    /// Secondary client id used by the WeChat in-app flow.
    #[serde(default)]
    pub client_id2: String,
    /// WeCom agent id.
    #[serde(default)]
    pub app_id: String,
    /// Tenant base URL for domain-based providers (Adfs, Casdoor, Okta).
    #[serde(default)]
    pub domain: String,
    /// WeCom deployment flavor; kept as the raw console value.
    #[serde(default)]
    pub sub_type: String,
    /// WeCom flow method; kept as the raw console value.
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub custom_auth_url: String,
    #[serde(default)]
    pub custom_scope: String,
}

impl ProviderConfig {
    /// Construct a provider record with empty optional fields.
    pub fn new(name: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            name: name.into(),
            provider_type,
            client_id: String::new(),
            client_id2: String::new(),
            app_id: String::new(),
            domain: String::new(),
            sub_type: String::new(),
            method: String::new(),
            custom_auth_url: String::new(),
            custom_scope: String::new(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_client_id2(mut self, client_id2: impl Into<String>) -> Self {
        self.client_id2 = client_id2.into();
        self
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = sub_type.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_custom_auth_url(mut self, url: impl Into<String>) -> Self {
        self.custom_auth_url = url.into();
        self
    }

    pub fn with_custom_scope(mut self, scope: impl Into<String>) -> Self {
        self.custom_scope = scope.into();
        self
    }
}

/// Application record; the resolver only consumes the name.
#[cfg_attr(feature = "schemas", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    pub name: String,
}

impl ApplicationConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// User flow that initiated the authorization request.
#[cfg_attr(feature = "schemas", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMethod {
    Login,
    Signup,
}

impl FlowMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowMethod::Login => "login",
            FlowMethod::Signup => "signup",
        }
    }
}

impl fmt::Display for FlowMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WeCom deployment flavor, parsed from a provider record's `subType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeComSubType {
    Internal,
    ThirdParty,
}

impl WeComSubType {
    /// Parse the console value; unrecognized input is a caller-facing error.
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "Internal" => Some(WeComSubType::Internal),
            "Third-party" => Some(WeComSubType::ThirdParty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeComSubType::Internal => "Internal",
            WeComSubType::ThirdParty => "Third-party",
        }
    }
}

/// WeCom flow method, parsed from a provider record's `method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeComMethod {
    Silent,
    Normal,
}

impl WeComMethod {
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "Silent" => Some(WeComMethod::Silent),
            "Normal" => Some(WeComMethod::Normal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeComMethod::Silent => "Silent",
            WeComMethod::Normal => "Normal",
        }
    }
}

/// User-agent marker of the in-app WeChat browser.
const WECHAT_UA_MARKER: &str = "MicroMessenger";

/// Ambient caller context the resolver must receive explicitly.
///
/// Carries the deployment origin (`https://host[:port]`) and the signal that
/// the request came from the in-app WeChat browser. The resolver never reads
/// process-global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    origin: String,
    wechat_browser: bool,
}

impl RequestContext {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        Self {
            origin: origin.trim_end_matches('/').to_owned(),
            wechat_browser: false,
        }
    }

    /// Derive the in-app browser signal from the caller's user-agent string.
    pub fn from_user_agent(origin: impl Into<String>, user_agent: &str) -> Self {
        Self::new(origin).with_wechat_browser(user_agent.contains(WECHAT_UA_MARKER))
    }

    pub fn with_wechat_browser(mut self, wechat_browser: bool) -> Self {
        self.wechat_browser = wechat_browser;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn is_wechat_browser(&self) -> bool {
        self.wechat_browser
    }

    /// Redirect target registered with every provider: `{origin}/callback`.
    pub fn callback_url(&self) -> String {
        format!("{}/callback", self.origin)
    }
}
