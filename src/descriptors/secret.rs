// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secrets pre-created for the Keptn chart.
//!
//! Bodies are written as raw manifests: `data` values are already base64
//! encoded, and going through `k8s_openapi::ByteString` would encode them a
//! second time.

use super::{ResourceDescriptor, ResourceKind};
use crate::constants::{helm, secrets};
use crate::credentials::{PlaintextCredential, ResolvedConfig};
use crate::error::{AddonError, Result};
use kube::api::ObjectMeta;
use serde_json::json;
use std::collections::BTreeMap;

/// Build the secret holding the Keptn API token
pub fn build_api_token_secret(resolved: &ResolvedConfig) -> Result<ResourceDescriptor> {
    let data = BTreeMap::from([(
        secrets::API_TOKEN_KEY,
        resolved.credentials.api_token.as_str(),
    )]);
    secret_descriptor(resolved, secrets::API_TOKEN_NAME, data)
}

/// Build the secret holding the bridge login
pub fn build_bridge_secret(resolved: &ResolvedConfig) -> Result<ResourceDescriptor> {
    let username = PlaintextCredential::new(secrets::BRIDGE_USERNAME).encode();
    let data = BTreeMap::from([
        (secrets::BRIDGE_USERNAME_KEY, username.as_str()),
        (
            secrets::BRIDGE_PASSWORD_KEY,
            resolved.credentials.bridge_password.as_str(),
        ),
    ]);
    secret_descriptor(resolved, secrets::BRIDGE_NAME, data)
}

fn secret_descriptor(
    resolved: &ResolvedConfig,
    name: &str,
    data: BTreeMap<&str, &str>,
) -> Result<ResourceDescriptor> {
    let metadata = serde_json::to_value(helm_owned_metadata(resolved, name))
        .map_err(|e| AddonError::SerializationError(format!("Secret '{}': {}", name, e)))?;

    let body = json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": metadata,
        "type": "Opaque",
        "data": data,
    });

    Ok(ResourceDescriptor::new(
        ResourceKind::Secret,
        name,
        Some(resolved.config.namespace.clone()),
        body,
    ))
}

/// Metadata that makes Helm adopt the secret into the release instead of
/// failing on an object it does not own
fn helm_owned_metadata(resolved: &ResolvedConfig, name: &str) -> ObjectMeta {
    let config = &resolved.config;
    let labels = BTreeMap::from([
        (helm::MANAGED_BY_LABEL.to_string(), helm::MANAGED_BY_VALUE.to_string()),
        (helm::NAME_LABEL.to_string(), config.release_name.clone()),
        (helm::INSTANCE_LABEL.to_string(), config.release_name.clone()),
        (helm::VERSION_LABEL.to_string(), config.version.clone()),
        (
            helm::CHART_LABEL.to_string(),
            format!("{}-{}", config.release_name, config.version),
        ),
    ]);
    let annotations = BTreeMap::from([
        (
            helm::RELEASE_NAME_ANNOTATION.to_string(),
            config.release_name.clone(),
        ),
        (
            helm::RELEASE_NAMESPACE_ANNOTATION.to_string(),
            config.namespace.clone(),
        ),
    ]);

    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(config.namespace.clone()),
        labels: Some(labels),
        annotations: Some(annotations),
        ..Default::default()
    }
}
