// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential resolution from inline values or an external secret store.
//!
//! Plaintext and wire-encoded credentials are distinct types: the only way to
//! obtain an [`EncodedCredential`] is [`PlaintextCredential::encode`], so a
//! value cannot be base64-encoded twice.

use crate::config::{parse_control_plane_url, AddonConfig, Plane};
use crate::constants::secrets;
use crate::error::{AddonError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, instrument};
use url::Url;

/// A credential as the user knows it
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextCredential(String);

impl PlaintextCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Base64-encode for use in a Secret's `data` map
    pub fn encode(&self) -> EncodedCredential {
        EncodedCredential(STANDARD.encode(self.0.as_bytes()))
    }
}

impl fmt::Debug for PlaintextCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextCredential(<redacted>)")
    }
}

/// A base64-encoded credential, ready to be placed on the wire
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCredential(String);

impl EncodedCredential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EncodedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodedCredential(<redacted>)")
    }
}

/// The two secrets the Keptn chart expects, in wire form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub api_token: EncodedCredential,
    pub bridge_password: EncodedCredential,
}

/// Where an execution plane reports to
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteControlPlane {
    pub url: Url,
    pub api_token: PlaintextCredential,
}

impl RemoteControlPlane {
    /// `host[:port][/path]` without the scheme, as the chart expects it
    pub fn hostname(&self) -> String {
        let mut hostname = self.url.host_str().unwrap_or_default().to_string();
        if let Some(port) = self.url.port() {
            hostname.push_str(&format!(":{}", port));
        }
        let path = self.url.path().trim_end_matches('/');
        hostname.push_str(path);
        hostname
    }

    pub fn protocol(&self) -> &str {
        self.url.scheme()
    }
}

/// Configuration with credentials resolved. The descriptor builders read
/// credentials from here, never from the inline fields of `config`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: AddonConfig,
    pub credentials: CredentialSet,
    /// Set for execution planes only
    pub remote: Option<RemoteControlPlane>,
}

/// Lookup of a credential document held outside the addon configuration
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the raw document stored under `reference`. `scope` is the region
    /// or namespace the store should search.
    async fn lookup(&self, reference: &str, scope: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct SecretDocument {
    #[serde(rename = "API_TOKEN")]
    api_token: String,
    #[serde(rename = "BRIDGE_PASSWORD")]
    bridge_password: String,
}

/// Parse a stored credential document into the API token and bridge password
pub fn parse_secret_document(raw: &str) -> Result<(PlaintextCredential, PlaintextCredential)> {
    let document: SecretDocument =
        serde_json::from_str(raw).map_err(|e| AddonError::SecretFormatError(e.to_string()))?;

    for (field, value) in [
        (secrets::DOCUMENT_API_TOKEN, &document.api_token),
        (secrets::DOCUMENT_BRIDGE_PASSWORD, &document.bridge_password),
    ] {
        if value.is_empty() {
            return Err(AddonError::SecretFormatError(format!(
                "field {} is empty",
                field
            )));
        }
    }

    Ok((
        PlaintextCredential::new(document.api_token),
        PlaintextCredential::new(document.bridge_password),
    ))
}

/// Resolve the final credentials for a configuration.
///
/// An external reference always wins: when set, inline credentials are
/// ignored and the store's document is used instead.
#[instrument(skip(config, store), fields(release = %config.release_name))]
pub async fn resolve(config: &AddonConfig, store: &dyn SecretStore) -> Result<ResolvedConfig> {
    let (api_token, bridge_password) = match config.ssm_secret_name.as_deref() {
        Some(reference) => {
            if config.api_token.is_some() || config.bridge_password.is_some() {
                debug!("External secret reference set, ignoring inline credentials");
            }
            let scope = config.secret_scope.as_deref().unwrap_or(&config.namespace);
            info!("Resolving credentials from secret '{}' in '{}'", reference, scope);

            let raw = store
                .lookup(reference, scope)
                .await
                .map_err(|e| match e {
                    AddonError::SecretLookupError { .. } => e,
                    other => AddonError::lookup(reference, other.to_string()),
                })?;
            parse_secret_document(&raw)?
        }
        None => {
            debug!("Using inline credentials");
            let api_token = config.api_token.clone().ok_or_else(|| {
                AddonError::ConfigurationError("apiToken is not set".to_string())
            })?;
            let bridge_password = config.bridge_password.clone().ok_or_else(|| {
                AddonError::ConfigurationError("bridgePassword is not set".to_string())
            })?;
            (api_token, bridge_password)
        }
    };

    let remote = match &config.plane {
        Plane::Control => None,
        Plane::Execution { control_plane_url } => Some(RemoteControlPlane {
            url: parse_control_plane_url(control_plane_url)?,
            api_token: api_token.clone(),
        }),
    };

    Ok(ResolvedConfig {
        config: config.clone(),
        credentials: CredentialSet {
            api_token: api_token.encode(),
            bridge_password: bridge_password.encode(),
        },
        remote,
    })
}
