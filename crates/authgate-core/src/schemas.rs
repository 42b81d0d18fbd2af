use schemars::schema_for;
use serde_json::Value;

use crate::{
    state::StateClaims,
    types::{ApplicationConfig, ProviderConfig},
};

/// JSON Schema for provider configuration records.
pub fn provider_config_schema() -> Value {
    serde_json::to_value(schema_for!(ProviderConfig)).expect("serialize schema")
}

/// JSON Schema for application configuration records.
pub fn application_config_schema() -> Value {
    serde_json::to_value(schema_for!(ApplicationConfig)).expect("serialize schema")
}

/// JSON Schema for the state-token claims payload.
pub fn state_claims_schema() -> Value {
    serde_json::to_value(schema_for!(StateClaims)).expect("serialize schema")
}
