// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceDescriptor, ResourceKind};
use crate::constants::ingress;
use crate::credentials::ResolvedConfig;
use crate::error::{AddonError, Result};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
};
use kube::api::ObjectMeta;

/// Build the ingress exposing the Keptn API gateway under `/`.
///
/// The `tls` list is always emitted; it is empty unless a TLS secret name is
/// configured.
pub fn build_ingress(resolved: &ResolvedConfig) -> Result<ResourceDescriptor> {
    let config = &resolved.config;
    let hostname = config
        .ingress_hostname
        .clone()
        .filter(|h| !h.trim().is_empty())
        .ok_or_else(|| {
        AddonError::ConfigurationError(
            "ingress is enabled but ingressHostname is not set".to_string(),
        )
    })?;

    let tls = match &config.ingress_secret_name {
        Some(secret_name) => vec![IngressTLS {
            hosts: Some(vec![hostname.clone()]),
            secret_name: Some(secret_name.clone()),
        }],
        None => Vec::new(),
    };

    let ing = Ingress {
        metadata: ObjectMeta {
            name: Some(ingress::NAME.to_string()),
            namespace: Some(config.namespace.clone()),
            annotations: Some(config.ingress_annotations.clone()).filter(|a| !a.is_empty()),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                host: Some(hostname),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some(ingress::PATH.to_string()),
                        path_type: ingress::PATH_TYPE.to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: ingress::BACKEND_SERVICE.to_string(),
                                port: Some(ServiceBackendPort {
                                    number: Some(ingress::BACKEND_PORT),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
            }]),
            tls: Some(tls),
            ..Default::default()
        }),
        ..Default::default()
    };

    ResourceDescriptor::from_object(
        ResourceKind::Ingress,
        ingress::NAME,
        Some(config.namespace.clone()),
        &ing,
    )
}
