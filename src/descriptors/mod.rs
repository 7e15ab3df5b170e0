// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource descriptors and the pure builders that produce them.

pub mod ingress;
pub mod namespace;
pub mod release;
pub mod secret;

pub use ingress::build_ingress;
pub use namespace::build_namespace;
pub use release::build_release;
pub use secret::{build_api_token_secret, build_bridge_secret};

use crate::credentials::ResolvedConfig;
use crate::error::{AddonError, Result};
use crate::types::HelmChart;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::api::networking::v1::Ingress;
use kube::core::ApiResource;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Kinds of object the addon creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Namespace,
    Secret,
    Ingress,
    HelmRelease,
}

impl ResourceKind {
    fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::Namespace => "namespace",
            ResourceKind::Secret => "secret",
            ResourceKind::Ingress => "ingress",
            ResourceKind::HelmRelease => "release",
        }
    }

    /// API coordinates used to apply an object of this kind
    pub fn api_resource(&self) -> ApiResource {
        match self {
            ResourceKind::Namespace => ApiResource::erase::<Namespace>(&()),
            ResourceKind::Secret => ApiResource::erase::<Secret>(&()),
            ResourceKind::Ingress => ApiResource::erase::<Ingress>(&()),
            ResourceKind::HelmRelease => ApiResource::erase::<HelmChart>(&()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Namespace => "Namespace",
            ResourceKind::Secret => "Secret",
            ResourceKind::Ingress => "Ingress",
            ResourceKind::HelmRelease => "HelmRelease",
        };
        f.write_str(name)
    }
}

/// Name of a descriptor, unique within one deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(String);

impl DescriptorId {
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        Self(format!("{}-{}", kind.prefix(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One declarative object to realise on the cluster, plus the descriptors
/// that must be applied before it.
#[derive(Clone, PartialEq)]
pub struct ResourceDescriptor {
    id: DescriptorId,
    kind: ResourceKind,
    name: String,
    namespace: Option<String>,
    body: serde_json::Value,
    depends_on: BTreeSet<DescriptorId>,
}

impl ResourceDescriptor {
    /// Create a descriptor with no dependencies. Its id is derived from the
    /// kind and object name.
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: Option<String>,
        body: serde_json::Value,
    ) -> Self {
        let name = name.into();
        Self {
            id: DescriptorId::new(kind, &name),
            kind,
            name,
            namespace,
            body,
            depends_on: BTreeSet::new(),
        }
    }

    /// Serialize a typed object into a descriptor body
    pub fn from_object<T: Serialize>(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: Option<String>,
        object: &T,
    ) -> Result<Self> {
        let name = name.into();
        let body = serde_json::to_value(object).map_err(|e| {
            AddonError::SerializationError(format!("{} '{}': {}", kind, name, e))
        })?;
        Ok(Self::new(kind, name, namespace, body))
    }

    pub fn id(&self) -> &DescriptorId {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Name of the object on the cluster
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace of the object, `None` for cluster-scoped kinds
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    pub fn depends_on(&self) -> &BTreeSet<DescriptorId> {
        &self.depends_on
    }

    /// Declare that `prerequisite` must be applied before this descriptor
    pub fn add_dependency(&mut self, prerequisite: &DescriptorId) {
        self.depends_on.insert(prerequisite.clone());
    }
}

// Secret bodies hold credentials, so the body is left out.
impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("namespace", &self.namespace)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// Every descriptor of one deployment, before ordering edges are attached
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    pub namespace: ResourceDescriptor,
    pub api_token_secret: ResourceDescriptor,
    pub bridge_secret: ResourceDescriptor,
    pub ingress: Option<ResourceDescriptor>,
    pub release: ResourceDescriptor,
}

/// Run every builder that applies to the resolved configuration
pub fn build_descriptors(resolved: &ResolvedConfig) -> Result<DescriptorSet> {
    let ingress = if resolved.config.enable_ingress {
        Some(build_ingress(resolved)?)
    } else {
        None
    };

    Ok(DescriptorSet {
        namespace: build_namespace(resolved)?,
        api_token_secret: build_api_token_secret(resolved)?,
        bridge_secret: build_bridge_secret(resolved)?,
        ingress,
        release: build_release(resolved)?,
    })
}
