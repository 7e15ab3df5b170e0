// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceDescriptor, ResourceKind};
use crate::config::Plane;
use crate::credentials::ResolvedConfig;
use crate::error::{AddonError, Result};
use crate::types::{HelmChart, HelmChartSpec};
use serde_json::{json, Value};

/// Service exposure selected by the load-balancer flag
pub fn service_type(enable_load_balancer: bool) -> &'static str {
    if enable_load_balancer {
        "LoadBalancer"
    } else {
        "ClusterIP"
    }
}

/// Chart values the addon overrides
fn release_values(resolved: &ResolvedConfig) -> Result<Value> {
    let config = &resolved.config;
    let exposure = json!({ "type": service_type(config.enable_load_balancer) });

    match &config.plane {
        Plane::Control => Ok(json!({ "apiGatewayNginx": exposure })),
        Plane::Execution { .. } => {
            let remote = resolved.remote.as_ref().ok_or_else(|| {
                AddonError::ConfigurationError(
                    "execution plane has no resolved control plane endpoint".to_string(),
                )
            })?;
            Ok(json!({
                "service": exposure,
                "remoteControlPlane": {
                    "enabled": true,
                    "api": {
                        "protocol": remote.protocol(),
                        "hostname": remote.hostname(),
                        "token": remote.api_token.expose(),
                    },
                },
            }))
        }
    }
}

/// Build the Helm release of the Keptn chart for the configured plane
pub fn build_release(resolved: &ResolvedConfig) -> Result<ResourceDescriptor> {
    let config = &resolved.config;
    let values = release_values(resolved)?;
    let values_content = serde_yaml::to_string(&values).map_err(|e| {
        AddonError::SerializationError(format!("values of release '{}': {}", config.release_name, e))
    })?;

    let mut chart = HelmChart::new(
        &config.release_name,
        HelmChartSpec {
            chart: config.release_name.clone(),
            repo: Some(config.helm_repository.clone()),
            version: Some(config.version.clone()),
            target_namespace: Some(config.namespace.clone()),
            create_namespace: Some(false),
            values_content: Some(values_content),
        },
    );
    chart.metadata.namespace = Some(config.namespace.clone());

    ResourceDescriptor::from_object(
        ResourceKind::HelmRelease,
        config.release_name.as_str(),
        Some(config.namespace.clone()),
        &chart,
    )
}
