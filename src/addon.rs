// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The addon entry point consumed by an orchestrator.

use crate::apply::{ApplyReport, ResourceApplier};
use crate::config::{AddonConfig, AddonOverrides, PlaneKind};
use crate::credentials::{resolve, SecretStore};
use crate::descriptors::{build_descriptors, DescriptorId, ResourceKind};
use crate::error::Result;
use crate::graph::{assemble, DependencyGraph};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Something an orchestrator can install onto a cluster
#[async_trait]
pub trait ClusterAddon: Send + Sync {
    fn name(&self) -> &str;

    /// Build the addon's resources and hand them to `cluster`. Nothing is
    /// handed over if any step before that fails.
    async fn deploy(&self, cluster: &dyn ResourceApplier) -> Result<ReleaseHandle>;
}

/// The installed release. Other addons use [`ReleaseHandle::descriptor`] as a
/// dependency target.
#[derive(Debug, Clone)]
pub struct ReleaseHandle {
    descriptor: DescriptorId,
    release_name: String,
    namespace: String,
    report: ApplyReport,
}

impl ReleaseHandle {
    pub fn descriptor(&self) -> &DescriptorId {
        &self.descriptor
    }

    pub fn release_name(&self) -> &str {
        &self.release_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Per-descriptor results reported by the apply mechanism
    pub fn report(&self) -> &ApplyReport {
        &self.report
    }
}

/// Keptn control or execution plane
pub struct KeptnAddon {
    config: AddonConfig,
    store: Arc<dyn SecretStore>,
}

impl KeptnAddon {
    /// Merge `overrides` over the plane defaults
    pub fn new(
        kind: PlaneKind,
        overrides: AddonOverrides,
        store: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        let config = AddonConfig::merge(kind, overrides)?;
        Ok(Self { config, store })
    }

    pub fn control_plane(overrides: AddonOverrides, store: Arc<dyn SecretStore>) -> Result<Self> {
        Self::new(PlaneKind::Control, overrides, store)
    }

    pub fn execution_plane(
        overrides: AddonOverrides,
        store: Arc<dyn SecretStore>,
    ) -> Result<Self> {
        Self::new(PlaneKind::Execution, overrides, store)
    }

    pub fn config(&self) -> &AddonConfig {
        &self.config
    }

    /// Validate, resolve credentials and assemble the graph without applying it
    #[instrument(skip(self), fields(release = %self.config.release_name))]
    pub async fn plan(&self) -> Result<DependencyGraph> {
        self.config.validate()?;
        let resolved = resolve(&self.config, self.store.as_ref()).await?;
        let descriptors = build_descriptors(&resolved)?;
        assemble(descriptors)
    }
}

#[async_trait]
impl ClusterAddon for KeptnAddon {
    fn name(&self) -> &str {
        &self.config.release_name
    }

    #[instrument(skip(self, cluster), fields(release = %self.config.release_name, namespace = %self.config.namespace))]
    async fn deploy(&self, cluster: &dyn ResourceApplier) -> Result<ReleaseHandle> {
        let graph = self.plan().await?;
        let descriptor = DescriptorId::new(ResourceKind::HelmRelease, &self.config.release_name);

        info!("Handing {} descriptors to the apply mechanism", graph.len());
        let report = cluster.apply(graph).await;

        if report.is_success() {
            info!("Release {} applied", self.config.release_name);
        } else {
            for (id, outcome) in report.failures() {
                warn!("Descriptor {} {}", id, outcome);
            }
        }

        Ok(ReleaseHandle {
            descriptor,
            release_name: self.config.release_name.clone(),
            namespace: self.config.namespace.clone(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ApplyOutcome;
    use crate::credentials::MockSecretStore;
    use crate::error::AddonError;
    use crate::types::HelmChart;
    use std::sync::Mutex;

    /// Records every graph it receives and reports all descriptors applied
    #[derive(Default)]
    struct RecordingApplier {
        graphs: Mutex<Vec<DependencyGraph>>,
    }

    impl RecordingApplier {
        fn received(&self) -> Vec<DependencyGraph> {
            self.graphs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ResourceApplier for RecordingApplier {
        async fn apply(&self, graph: DependencyGraph) -> ApplyReport {
            let mut report = ApplyReport::default();
            for descriptor in graph.topological_order() {
                report.record(descriptor.id().clone(), ApplyOutcome::Applied);
            }
            self.graphs.lock().unwrap().push(graph);
            report
        }
    }

    fn unused_store() -> Arc<dyn SecretStore> {
        let mut store = MockSecretStore::new();
        store.expect_lookup().never();
        Arc::new(store)
    }

    fn secret_data(graph: &DependencyGraph, name: &str, key: &str) -> String {
        let id = DescriptorId::new(ResourceKind::Secret, name);
        graph.get(&id).unwrap().body()["data"][key]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_deploy_inline_credentials_without_ingress() {
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                api_token: Some("tok1".to_string()),
                bridge_password: Some("pw1".to_string()),
                enable_ingress: Some(false),
                ..Default::default()
            },
            unused_store(),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let handle = addon.deploy(&applier).await.unwrap();

        let graphs = applier.received();
        assert_eq!(graphs.len(), 1);
        let graph = &graphs[0];
        assert_eq!(graph.len(), 4);
        assert!(graph
            .descriptors()
            .iter()
            .all(|d| d.kind() != ResourceKind::Ingress));

        let release = graph.get(handle.descriptor()).unwrap();
        assert_eq!(release.depends_on().len(), 2);

        assert_eq!(secret_data(graph, "keptn-api-token", "keptn-api-token"), "dG9rMQ==");
        assert_eq!(
            secret_data(graph, "bridge-credentials", "BASIC_AUTH_PASSWORD"),
            "cHcx"
        );
        assert_eq!(handle.release_name(), "keptn");
        assert_eq!(handle.namespace(), "keptn");
        assert!(handle.report().is_success());
    }

    #[tokio::test]
    async fn test_deploy_external_secret_with_ingress() {
        let mut store = MockSecretStore::new();
        store
            .expect_lookup()
            .withf(|reference: &str, _scope: &str| reference == "ref1")
            .times(1)
            .returning(|_, _| Ok(r#"{"API_TOKEN":"A","BRIDGE_PASSWORD":"B"}"#.to_string()));
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                ssm_secret_name: Some("ref1".to_string()),
                enable_ingress: Some(true),
                ingress_hostname: Some("host.example.com".to_string()),
                ..Default::default()
            },
            Arc::new(store),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let handle = addon.deploy(&applier).await.unwrap();

        let graphs = applier.received();
        let graph = &graphs[0];
        assert_eq!(graph.len(), 5);
        // base64("A") and base64("B")
        assert_eq!(secret_data(graph, "keptn-api-token", "keptn-api-token"), "QQ==");
        assert_eq!(secret_data(graph, "bridge-credentials", "BASIC_AUTH_PASSWORD"), "Qg==");

        let ingress_id = DescriptorId::new(ResourceKind::Ingress, "api-keptn-ingress");
        let ingress = graph.get(&ingress_id).unwrap();
        assert_eq!(ingress.body()["spec"]["rules"][0]["host"], "host.example.com");

        let release = graph.get(handle.descriptor()).unwrap();
        assert!(release.depends_on().contains(&ingress_id));
    }

    #[tokio::test]
    async fn test_deploy_tls_secret_without_ingress_builds_no_ingress() {
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                api_token: Some("tok1".to_string()),
                bridge_password: Some("pw1".to_string()),
                ingress_secret_name: Some("tls".to_string()),
                ..Default::default()
            },
            unused_store(),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let handle = addon.deploy(&applier).await.unwrap();

        let graphs = applier.received();
        let graph = &graphs[0];
        assert_eq!(graph.len(), 4);
        assert!(graph
            .descriptors()
            .iter()
            .all(|d| d.kind() != ResourceKind::Ingress));
        assert_eq!(graph.get(handle.descriptor()).unwrap().depends_on().len(), 2);
    }

    #[tokio::test]
    async fn test_deploy_lookup_failure_hands_off_nothing() {
        let mut store = MockSecretStore::new();
        store
            .expect_lookup()
            .returning(|reference, _| Err(AddonError::lookup(reference, "access denied")));
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                ssm_secret_name: Some("ref1".to_string()),
                ..Default::default()
            },
            Arc::new(store),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let err = addon.deploy(&applier).await.unwrap_err();

        assert!(matches!(err, AddonError::SecretLookupError { .. }));
        assert!(applier.received().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_invalid_config_skips_lookup() {
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                ssm_secret_name: Some("ref1".to_string()),
                enable_ingress: Some(true),
                ..Default::default()
            },
            unused_store(),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let err = addon.deploy(&applier).await.unwrap_err();

        assert!(matches!(err, AddonError::ConfigurationError(_)));
        assert!(applier.received().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_execution_plane() {
        let addon = KeptnAddon::execution_plane(
            AddonOverrides {
                api_token: Some("tok1".to_string()),
                bridge_password: Some("pw1".to_string()),
                control_plane_url: Some("http://keptn.example.com".to_string()),
                enable_load_balancer: Some(true),
                ..Default::default()
            },
            unused_store(),
        )
        .unwrap();
        let applier = RecordingApplier::default();

        let handle = addon.deploy(&applier).await.unwrap();

        assert_eq!(addon.name(), "helm-service");
        assert_eq!(handle.descriptor().as_str(), "release-helm-service");
        let graphs = applier.received();
        let graph = &graphs[0];
        let chart: HelmChart =
            serde_json::from_value(graph.get(handle.descriptor()).unwrap().body().clone())
                .unwrap();
        let values = chart.values().unwrap();
        assert_eq!(values["service"]["type"], "LoadBalancer");
        assert_eq!(values["remoteControlPlane"]["api"]["protocol"], "http");
        assert_eq!(values["remoteControlPlane"]["api"]["token"], "tok1");
    }

    #[tokio::test]
    async fn test_plan_is_repeatable() {
        let addon = KeptnAddon::control_plane(
            AddonOverrides {
                api_token: Some("tok1".to_string()),
                bridge_password: Some("pw1".to_string()),
                ..Default::default()
            },
            unused_store(),
        )
        .unwrap();

        let first = addon.plan().await.unwrap();
        let second = addon.plan().await.unwrap();

        assert_eq!(first.descriptors(), second.descriptors());
        // the configuration is never rewritten by credential resolution
        assert_eq!(addon.config().api_token.as_ref().unwrap().expose(), "tok1");
    }
}
