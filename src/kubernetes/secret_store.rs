// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential documents kept in Kubernetes secrets

use crate::credentials::SecretStore;
use crate::error::{AddonError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// Reads the credential document from a Secret in the scope namespace. Each
/// data entry becomes one field of the document.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    #[instrument(skip(self))]
    async fn lookup(&self, reference: &str, scope: &str) -> Result<String> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), scope);

        info!("Getting credential secret '{}/{}'...", scope, reference);
        let secret = secrets
            .get(reference)
            .await
            .map_err(|e| AddonError::lookup(reference, e.to_string()))?;

        let Some(data) = secret.data.filter(|data| !data.is_empty()) else {
            return Err(AddonError::lookup(reference, "secret has no data"));
        };

        let mut document = Map::with_capacity(data.len());
        for (key, value) in data {
            let text = String::from_utf8(value.0).map_err(|_| {
                AddonError::lookup(reference, format!("key '{}' is not valid UTF-8", key))
            })?;
            document.insert(key, Value::String(text));
        }

        serde_json::to_string(&document).map_err(|e| AddonError::lookup(reference, e.to_string()))
    }
}
