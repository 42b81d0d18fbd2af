use std::collections::HashMap;

use once_cell::sync::Lazy;
use url::Url;

use crate::types::ProviderType;

/// Static authorization metadata for one provider type.
///
/// Scope strings are stored pre-encoded exactly as the identity providers
/// expect them on the wire; the resolver must not re-encode them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub endpoint: &'static str,
    pub scope: Option<&'static str>,
    /// WeChat in-app flow endpoint.
    pub mp_endpoint: Option<&'static str>,
    /// WeChat in-app flow scope.
    pub mp_scope: Option<&'static str>,
    /// WeCom silent-method endpoint.
    pub silent_endpoint: Option<&'static str>,
    /// WeCom internal normal-method endpoint.
    pub internal_endpoint: Option<&'static str>,
}

impl RegistryEntry {
    const fn new(endpoint: &'static str, scope: Option<&'static str>) -> Self {
        Self {
            endpoint,
            scope,
            mp_endpoint: None,
            mp_scope: None,
            silent_endpoint: None,
            internal_endpoint: None,
        }
    }
}

/// Immutable mapping from provider type to its authorization metadata.
///
/// Populated once at startup and injected into the resolver; tests may build
/// partial registries to exercise the unknown-type path.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    entries: HashMap<ProviderType, RegistryEntry>,
}

impl ProviderRegistry {
    /// Empty registry; entries are added with [`insert`](Self::insert).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering every supported provider type.
    ///
    /// Domain-based providers (Adfs, Casdoor, Okta) and Custom carry a
    /// placeholder endpoint; the resolver substitutes the tenant domain or
    /// the configured custom URL.
    pub fn with_builtin_entries() -> Self {
        let entries = HashMap::from([
            (
                ProviderType::Google,
                RegistryEntry::new(
                    "https://accounts.google.com/signin/oauth",
                    Some("profile+email"),
                ),
            ),
            (
                ProviderType::GitHub,
                RegistryEntry::new(
                    "https://github.com/login/oauth/authorize",
                    Some("user:email+read:user"),
                ),
            ),
            (
                ProviderType::QQ,
                RegistryEntry::new(
                    "https://graph.qq.com/oauth2.0/authorize",
                    Some("get_user_info"),
                ),
            ),
            (
                ProviderType::WeChat,
                RegistryEntry {
                    endpoint: "https://open.weixin.qq.com/connect/qrconnect",
                    scope: Some("snsapi_login"),
                    mp_endpoint: Some("https://open.weixin.qq.com/connect/oauth2/authorize"),
                    mp_scope: Some("snsapi_userinfo"),
                    silent_endpoint: None,
                    internal_endpoint: None,
                },
            ),
            (
                ProviderType::WeChatMiniProgram,
                RegistryEntry::new("https://mp.weixin.qq.com/", None),
            ),
            (
                ProviderType::Facebook,
                RegistryEntry::new(
                    "https://www.facebook.com/dialog/oauth",
                    Some("email,public_profile"),
                ),
            ),
            (
                ProviderType::DingTalk,
                RegistryEntry::new("https://login.dingtalk.com/oauth2/auth", Some("openid")),
            ),
            (
                ProviderType::Weibo,
                RegistryEntry::new("https://api.weibo.com/oauth2/authorize", Some("email")),
            ),
            (
                ProviderType::Gitee,
                RegistryEntry::new("https://gitee.com/oauth/authorize", Some("user_info%20emails")),
            ),
            (
                ProviderType::LinkedIn,
                RegistryEntry::new(
                    "https://www.linkedin.com/oauth/v2/authorization",
                    Some("r_liteprofile%20r_emailaddress"),
                ),
            ),
            (
                ProviderType::WeCom,
                RegistryEntry {
                    endpoint: "https://open.work.weixin.qq.com/wwopen/sso/3rd_qrConnect",
                    scope: Some("snsapi_userinfo"),
                    mp_endpoint: None,
                    mp_scope: None,
                    silent_endpoint: Some("https://open.weixin.qq.com/connect/oauth2/authorize"),
                    internal_endpoint: Some("https://open.work.weixin.qq.com/wwopen/sso/qrConnect"),
                },
            ),
            (
                ProviderType::Lark,
                RegistryEntry::new("https://open.feishu.cn/open-apis/authen/v1/index", None),
            ),
            (
                ProviderType::GitLab,
                RegistryEntry::new("https://gitlab.com/oauth/authorize", Some("read_user+profile")),
            ),
            (
                ProviderType::Adfs,
                RegistryEntry::new("http://example.com", Some("openid")),
            ),
            (
                ProviderType::Baidu,
                RegistryEntry::new("http://openapi.baidu.com/oauth/2.0/authorize", Some("basic")),
            ),
            (
                ProviderType::Alipay,
                RegistryEntry::new(
                    "https://openauth.alipay.com/oauth2/publicAppAuthorize.htm",
                    Some("basic"),
                ),
            ),
            (
                ProviderType::Casdoor,
                RegistryEntry::new("http://example.com", Some("openid%20profile%20email")),
            ),
            (
                ProviderType::Infoflow,
                RegistryEntry::new("https://xpc.im.baidu.com/oauth2/authorize", None),
            ),
            (
                ProviderType::Apple,
                RegistryEntry::new("https://appleid.apple.com/auth/authorize", Some("name%20email")),
            ),
            (
                ProviderType::AzureAd,
                RegistryEntry::new(
                    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
                    Some("user.read"),
                ),
            ),
            (
                ProviderType::Slack,
                RegistryEntry::new("https://slack.com/oauth/authorize", Some("users:read")),
            ),
            (
                ProviderType::Steam,
                RegistryEntry::new("https://steamcommunity.com/openid/login", None),
            ),
            (
                ProviderType::Okta,
                RegistryEntry::new("http://example.com", Some("openid%20profile%20email")),
            ),
            (
                ProviderType::Douyin,
                RegistryEntry::new(
                    "https://open.douyin.com/platform/oauth/connect",
                    Some("user_info"),
                ),
            ),
            (
                ProviderType::Bilibili,
                RegistryEntry::new("https://passport.bilibili.com/register/pc_oauth2.html", None),
            ),
            (
                ProviderType::Custom,
                RegistryEntry::new("https://example.com/", None),
            ),
        ]);
        Self { entries }
    }

    /// Add or replace the entry for a provider type.
    pub fn insert(&mut self, ty: ProviderType, entry: RegistryEntry) -> Option<RegistryEntry> {
        self.entries.insert(ty, entry)
    }

    /// Exact-match lookup; `None` means the type is not configured here.
    pub fn lookup(&self, ty: ProviderType) -> Option<&RegistryEntry> {
        self.entries.get(&ty)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Provider home page derived from the authorization endpoint.
    ///
    /// The host is trimmed by one leading label when it has more than two,
    /// so `open.weixin.qq.com` yields `https://weixin.qq.com`.
    pub fn homepage(&self, ty: ProviderType) -> Option<Url> {
        let entry = self.lookup(ty)?;
        let endpoint = Url::parse(entry.endpoint).ok()?;
        let host = endpoint.host_str()?;

        let labels: Vec<&str> = host.split('.').collect();
        let trimmed = if labels.len() > 2 {
            labels[1..].join(".")
        } else {
            labels.join(".")
        };

        Url::parse(&format!("{}://{trimmed}", endpoint.scheme())).ok()
    }
}

static BUILTIN: Lazy<ProviderRegistry> = Lazy::new(ProviderRegistry::with_builtin_entries);

/// Shared instance of the built-in registry.
pub fn builtin() -> &'static ProviderRegistry {
    &BUILTIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_provider_type() {
        let registry = builtin();
        assert_eq!(registry.len(), ProviderType::ALL.len());
        for ty in ProviderType::ALL {
            assert!(registry.lookup(ty).is_some(), "missing entry for {ty}");
        }
    }

    #[test]
    fn lookup_misses_on_partial_registry() {
        let mut registry = ProviderRegistry::new();
        registry.insert(
            ProviderType::GitHub,
            RegistryEntry::new("https://github.com/login/oauth/authorize", None),
        );
        assert!(registry.lookup(ProviderType::GitHub).is_some());
        assert!(registry.lookup(ProviderType::Google).is_none());
    }

    #[test]
    fn wechat_entry_carries_in_app_variant() {
        let entry = builtin().lookup(ProviderType::WeChat).expect("wechat entry");
        assert_eq!(
            entry.mp_endpoint,
            Some("https://open.weixin.qq.com/connect/oauth2/authorize")
        );
        assert_eq!(entry.mp_scope, Some("snsapi_userinfo"));
    }

    #[test]
    fn wecom_entry_carries_flow_endpoints() {
        let entry = builtin().lookup(ProviderType::WeCom).expect("wecom entry");
        assert_eq!(
            entry.silent_endpoint,
            Some("https://open.weixin.qq.com/connect/oauth2/authorize")
        );
        assert_eq!(
            entry.internal_endpoint,
            Some("https://open.work.weixin.qq.com/wwopen/sso/qrConnect")
        );
    }

    #[test]
    fn homepage_keeps_two_label_hosts() {
        let homepage = builtin().homepage(ProviderType::GitHub).expect("homepage");
        assert_eq!(homepage.as_str(), "https://github.com/");
    }

    #[test]
    fn homepage_trims_one_subdomain_label() {
        let homepage = builtin().homepage(ProviderType::WeChat).expect("homepage");
        assert_eq!(homepage.as_str(), "https://weixin.qq.com/");
    }
}
