// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use super::{ResourceDescriptor, ResourceKind};
use crate::credentials::ResolvedConfig;
use crate::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ObjectMeta;

/// Build the namespace every other object of the release lives in
pub fn build_namespace(resolved: &ResolvedConfig) -> Result<ResourceDescriptor> {
    let namespace = &resolved.config.namespace;
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.clone()),
            ..Default::default()
        },
        ..Default::default()
    };

    ResourceDescriptor::from_object(ResourceKind::Namespace, namespace.as_str(), None, &ns)
}
