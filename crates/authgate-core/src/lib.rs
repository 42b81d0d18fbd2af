//! Authorization redirect primitives for the Authgate admin console.
//!
//! Given an application record, a provider record and the caller's request
//! context, [`AuthUrlResolver`] assembles the provider-specific authorization
//! redirect URL, or a typed error when the configuration cannot produce one.

pub mod registry;
pub mod resolver;
pub mod state;
pub mod types;

#[cfg(feature = "schemas")]
pub mod schemas;

pub use registry::{ProviderRegistry, RegistryEntry};
pub use resolver::{AuthUrlResolver, ResolveError};
pub use state::{StateClaims, StateError};
pub use types::{
    ApplicationConfig, FlowMethod, ProviderConfig, ProviderType, RequestContext, WeComMethod,
    WeComSubType,
};
