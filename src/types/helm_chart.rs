// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// A Helm release managed by the helm-controller
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "helm.cattle.io", version = "v1", kind = "HelmChart")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartSpec {
    pub chart: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_namespace: Option<bool>,
    /// Chart values as a YAML document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values_content: Option<String>,
}

impl HelmChart {
    /// Parse `valuesContent` back into a structured value
    pub fn values(&self) -> Option<serde_json::Value> {
        self.spec
            .values_content
            .as_deref()
            .and_then(|content| serde_yaml::from_str(content).ok())
    }
}
