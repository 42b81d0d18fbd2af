use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
    registry::{self, ProviderRegistry, RegistryEntry},
    state::{StateClaims, StateError},
    types::{
        ApplicationConfig, FlowMethod, ProviderConfig, ProviderType, RequestContext, WeComMethod,
        WeComSubType,
    },
};

/// Failure modes of authorization URL resolution.
///
/// All variants are caller-facing configuration errors: deterministic for a
/// given input and never worth retrying. No partial URL is ever returned.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("provider type `{0}` is not registered")]
    UnknownProviderType(ProviderType),
    #[error("provider `{0}` requires a tenant domain")]
    MissingDomain(String),
    #[error("provider `{0}` requires a custom authorization URL")]
    MissingCustomUrl(String),
    #[error("unsupported provider sub type `{0}`")]
    UnsupportedSubType(String),
    #[error("unsupported provider method `{0}`")]
    UnsupportedMethod(String),
    #[error("assembled authorization URL `{url}` is invalid")]
    InvalidAuthUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error(transparent)]
    State(#[from] StateError),
}

/// Builds provider-specific authorization redirect URLs from configuration
/// records.
///
/// Pure and synchronous: the registry is read-only after construction, so a
/// resolver may be shared across request contexts without coordination.
#[derive(Debug, Clone)]
pub struct AuthUrlResolver {
    registry: ProviderRegistry,
}

impl AuthUrlResolver {
    /// Resolver over an explicit registry; partial registries are useful in
    /// tests to exercise the unknown-type path.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Resolver over the built-in provider table.
    pub fn builtin() -> Self {
        Self::new(registry::builtin().clone())
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Build the authorization redirect URL for one provider and flow.
    ///
    /// The caller supplies its deployment origin and the in-app browser
    /// signal through `ctx`; everything else comes from the configuration
    /// records and the registry.
    pub fn resolve(
        &self,
        application: &ApplicationConfig,
        provider: &ProviderConfig,
        method: FlowMethod,
        ctx: &RequestContext,
    ) -> Result<Url, ResolveError> {
        if application.name.is_empty() {
            return Err(ResolveError::InvalidInput("application name is empty"));
        }
        if provider.name.is_empty() {
            return Err(ResolveError::InvalidInput("provider name is empty"));
        }

        let entry = self
            .registry
            .lookup(provider.provider_type)
            .ok_or(ResolveError::UnknownProviderType(provider.provider_type))?;

        let redirect_uri = ctx.callback_url();
        let state = StateClaims::new(&application.name, &provider.name, method).encode()?;

        debug!(
            provider = %provider.name,
            provider_type = %provider.provider_type,
            "building authorization redirect"
        );

        // Literal template fill per provider: parameter order and the
        // pre-encoded scope strings are part of each provider's contract.
        let raw = match provider.provider_type {
            ProviderType::Google
            | ProviderType::GitHub
            | ProviderType::QQ
            | ProviderType::Facebook
            | ProviderType::Weibo
            | ProviderType::Gitee
            | ProviderType::LinkedIn => scope_first_url(
                entry.endpoint,
                &provider.client_id,
                &redirect_uri,
                entry.scope.unwrap_or_default(),
                &state,
            ),
            ProviderType::DingTalk => {
                let base = scope_first_url(
                    entry.endpoint,
                    &provider.client_id,
                    &redirect_uri,
                    entry.scope.unwrap_or_default(),
                    &state,
                );
                format!("{base}&prompt=consent")
            }
            ProviderType::WeChat => wechat_url(entry, provider, &redirect_uri, &state, ctx),
            // No web authorization flow of its own; the endpoint still
            // carries the state so the callback can be correlated.
            ProviderType::WeChatMiniProgram => format!("{}?state={state}", entry.endpoint),
            ProviderType::WeCom => wecom_url(entry, provider, &redirect_uri, &state)?,
            ProviderType::Lark => format!(
                "{}?app_id={}&redirect_uri={redirect_uri}&state={state}",
                entry.endpoint, provider.client_id
            ),
            ProviderType::GitLab | ProviderType::AzureAd | ProviderType::Slack => state_first_url(
                entry.endpoint,
                &provider.client_id,
                &redirect_uri,
                entry.scope.unwrap_or_default(),
                &state,
            ),
            ProviderType::Adfs => {
                let domain = tenant_base(provider)?;
                format!(
                    "{domain}/adfs/oauth2/authorize?client_id={}&redirect_uri={redirect_uri}&state={state}&response_type=code&nonce=authgate&scope=openid",
                    provider.client_id
                )
            }
            ProviderType::Baidu => {
                let base = state_first_url(
                    entry.endpoint,
                    &provider.client_id,
                    &redirect_uri,
                    entry.scope.unwrap_or_default(),
                    &state,
                );
                format!("{base}&display=popup")
            }
            // The fixed auth_user scope rides alongside the registry scope;
            // the provider expects both occurrences.
            ProviderType::Alipay => format!(
                "{}?app_id={}&scope=auth_user&redirect_uri={redirect_uri}&state={state}&response_type=code&scope={}&display=popup",
                entry.endpoint,
                provider.client_id,
                entry.scope.unwrap_or_default()
            ),
            ProviderType::Casdoor => {
                let domain = tenant_base(provider)?;
                format!(
                    "{domain}/login/oauth/authorize?client_id={}&redirect_uri={redirect_uri}&state={state}&response_type=code&scope={}",
                    provider.client_id,
                    entry.scope.unwrap_or_default()
                )
            }
            // Infoflow reads the state from the redirect value itself, so
            // the `?state=` is embedded after the redirect_uri.
            ProviderType::Infoflow => format!(
                "{}?appid={}&redirect_uri={redirect_uri}?state={state}",
                entry.endpoint, provider.client_id
            ),
            ProviderType::Apple => {
                let base = state_first_url(
                    entry.endpoint,
                    &provider.client_id,
                    &redirect_uri,
                    entry.scope.unwrap_or_default(),
                    &state,
                );
                format!("{base}&response_mode=form_post")
            }
            // OpenID 2.0 parameter set, not OAuth2.
            ProviderType::Steam => format!(
                "{}?openid.claimed_id=http://specs.openid.net/auth/2.0/identifier_select&openid.identity=http://specs.openid.net/auth/2.0/identifier_select&openid.mode=checkid_setup&openid.ns=http://specs.openid.net/auth/2.0&openid.realm={}&openid.return_to={redirect_uri}?state={state}",
                entry.endpoint,
                ctx.origin()
            ),
            ProviderType::Okta => {
                let domain = tenant_base(provider)?;
                format!(
                    "{domain}/v1/authorize?client_id={}&redirect_uri={redirect_uri}&state={state}&response_type=code&scope={}",
                    provider.client_id,
                    entry.scope.unwrap_or_default()
                )
            }
            ProviderType::Douyin => format!(
                "{}?client_key={}&redirect_uri={redirect_uri}&state={state}&response_type=code&scope={}",
                entry.endpoint,
                provider.client_id,
                entry.scope.unwrap_or_default()
            ),
            // Parameters ride the fragment, not the query.
            ProviderType::Bilibili => format!(
                "{}#/?client_id={}&return_url={redirect_uri}&state={state}&response_type=code",
                entry.endpoint, provider.client_id
            ),
            ProviderType::Custom => {
                if provider.custom_auth_url.is_empty() {
                    return Err(ResolveError::MissingCustomUrl(provider.name.clone()));
                }
                format!(
                    "{}?client_id={}&redirect_uri={redirect_uri}&scope={}&response_type=code&state={state}",
                    provider.custom_auth_url, provider.client_id, provider.custom_scope
                )
            }
        };

        Url::parse(&raw).map_err(|source| ResolveError::InvalidAuthUrl { url: raw, source })
    }
}

impl Default for AuthUrlResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

// The two parameter orders used by the plain authorization-code template.

fn scope_first_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> String {
    format!(
        "{endpoint}?client_id={client_id}&redirect_uri={redirect_uri}&scope={scope}&response_type=code&state={state}"
    )
}

fn state_first_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> String {
    format!(
        "{endpoint}?client_id={client_id}&redirect_uri={redirect_uri}&state={state}&response_type=code&scope={scope}"
    )
}

fn wechat_url(
    entry: &RegistryEntry,
    provider: &ProviderConfig,
    redirect_uri: &str,
    state: &str,
    ctx: &RequestContext,
) -> String {
    if ctx.is_wechat_browser() {
        let endpoint = entry.mp_endpoint.unwrap_or(entry.endpoint);
        format!(
            "{endpoint}?appid={}&redirect_uri={redirect_uri}&state={state}&scope={}&response_type=code#wechat_redirect",
            provider.client_id2,
            entry.mp_scope.unwrap_or_default()
        )
    } else {
        format!(
            "{}?appid={}&redirect_uri={redirect_uri}&scope={}&response_type=code&state={state}#wechat_redirect",
            entry.endpoint,
            provider.client_id,
            entry.scope.unwrap_or_default()
        )
    }
}

fn wecom_url(
    entry: &RegistryEntry,
    provider: &ProviderConfig,
    redirect_uri: &str,
    state: &str,
) -> Result<String, ResolveError> {
    let sub_type = WeComSubType::from_config(&provider.sub_type)
        .ok_or_else(|| ResolveError::UnsupportedSubType(provider.sub_type.clone()))?;
    let method = WeComMethod::from_config(&provider.method)
        .ok_or_else(|| ResolveError::UnsupportedMethod(provider.method.clone()))?;

    let url = match (sub_type, method) {
        // The silent flow is identical for both deployment flavors.
        (_, WeComMethod::Silent) => {
            let endpoint = entry.silent_endpoint.unwrap_or(entry.endpoint);
            format!(
                "{endpoint}?appid={}&redirect_uri={redirect_uri}&state={state}&scope={}&response_type=code#wechat_redirect",
                provider.client_id,
                entry.scope.unwrap_or_default()
            )
        }
        (WeComSubType::Internal, WeComMethod::Normal) => {
            let endpoint = entry.internal_endpoint.unwrap_or(entry.endpoint);
            format!(
                "{endpoint}?appid={}&agentid={}&redirect_uri={redirect_uri}&state={state}&usertype=member",
                provider.client_id, provider.app_id
            )
        }
        (WeComSubType::ThirdParty, WeComMethod::Normal) => format!(
            "{}?appid={}&redirect_uri={redirect_uri}&state={state}&usertype=member",
            entry.endpoint, provider.client_id
        ),
    };
    Ok(url)
}

fn tenant_base(provider: &ProviderConfig) -> Result<&str, ResolveError> {
    if provider.domain.is_empty() {
        return Err(ResolveError::MissingDomain(provider.name.clone()));
    }
    Ok(provider.domain.trim_end_matches('/'))
}
