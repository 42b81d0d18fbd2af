use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FlowMethod;

/// Claims packed into the opaque `state` query parameter and round-tripped
/// through the identity provider.
///
/// The token is the base64url encoding (no padding) of the claims serialized
/// as JSON. JSON string escaping means no field can collide with a payload
/// delimiter, so decoding is unambiguous for arbitrary application and
/// provider names. Encoding is deterministic: equal claims always produce
/// the same token.
#[cfg_attr(feature = "schemas", derive(schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateClaims {
    pub application: String,
    pub provider: String,
    pub method: FlowMethod,
}

impl StateClaims {
    pub fn new(
        application: impl Into<String>,
        provider: impl Into<String>,
        method: FlowMethod,
    ) -> Self {
        Self {
            application: application.into(),
            provider: provider.into(),
            method,
        }
    }

    /// Encode the claims into a URL-safe opaque token.
    pub fn encode(&self) -> Result<String, StateError> {
        let payload = serde_json::to_string(self)?;
        Ok(URL_SAFE_NO_PAD.encode(payload.as_bytes()))
    }

    /// Decode a token produced by [`encode`](Self::encode).
    ///
    /// Used on the callback path to correlate the provider redirect with the
    /// application and flow that initiated it.
    pub fn decode(token: &str) -> Result<Self, StateError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.as_bytes())?;
        let payload = String::from_utf8(bytes)?;
        Ok(serde_json::from_str(&payload)?)
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state token is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("state token payload is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("state token payload does not match the expected claims: {0}")]
    Claims(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let claims = StateClaims::new("app1", "github-provider-name", FlowMethod::Login);
        let token = claims.encode().expect("encode");
        let decoded = StateClaims::decode(&token).expect("decode");
        assert_eq!(claims, decoded);
    }

    #[test]
    fn roundtrip_survives_delimiter_like_names() {
        for name in [
            "app.with.dots",
            "app:with:colons",
            "app&with=query chars",
            "应用-unicode",
            "quotes\"and\\slashes",
        ] {
            let claims = StateClaims::new(name, "provider/with?marks", FlowMethod::Signup);
            let token = claims.encode().expect("encode");
            assert_eq!(StateClaims::decode(&token).expect("decode"), claims);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = StateClaims::new("app1", "provider1", FlowMethod::Login);
        let b = StateClaims::new("app1", "provider1", FlowMethod::Login);
        assert_eq!(a.encode().expect("encode"), b.encode().expect("encode"));
    }

    #[test]
    fn distinct_claims_produce_distinct_tokens() {
        let apps = ["app1", "app2", "console"];
        let providers = ["github-1", "wechat-1", "okta-main"];
        let methods = [FlowMethod::Login, FlowMethod::Signup];

        let mut tokens = std::collections::HashSet::new();
        for app in apps {
            for provider in providers {
                for method in methods {
                    let token = StateClaims::new(app, provider, method)
                        .encode()
                        .expect("encode");
                    assert!(tokens.insert(token), "token collision for {app}/{provider}");
                }
            }
        }
        assert_eq!(tokens.len(), apps.len() * providers.len() * methods.len());
    }

    #[test]
    fn token_is_url_safe() {
        let claims = StateClaims::new("app&with=query chars", "提供商", FlowMethod::Login);
        let token = claims.encode().expect("encode");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        );
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            StateClaims::decode("not base64!!"),
            Err(StateError::Encoding(_))
        ));

        let not_claims = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        assert!(matches!(
            StateClaims::decode(&not_claims),
            Err(StateError::Claims(_))
        ));

        let not_utf8 = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(
            StateClaims::decode(&not_utf8),
            Err(StateError::Utf8(_))
        ));
    }
}
