// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Server-side apply of a dependency graph, one wave at a time.

use crate::apply::{ApplyOutcome, ApplyReport, ResourceApplier};
use crate::constants::FIELD_MANAGER;
use crate::descriptors::ResourceDescriptor;
use crate::graph::DependencyGraph;
use async_trait::async_trait;
use futures::future::join_all;
use kube::{
    api::{DynamicObject, Patch, PatchParams},
    Api, Client,
};
use tracing::{debug, info, instrument, warn};

/// Applies descriptors to the cluster behind `client`.
///
/// Every descriptor of a wave whose prerequisites were all applied is
/// submitted concurrently. The rest are skipped and never reach the API.
#[derive(Clone)]
pub struct KubeApplier {
    client: Client,
}

impl KubeApplier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api_for(&self, descriptor: &ResourceDescriptor) -> Api<DynamicObject> {
        let resource = descriptor.kind().api_resource();
        match descriptor.namespace() {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }

    #[instrument(skip(self, descriptor), fields(descriptor = %descriptor.id()))]
    async fn apply_descriptor(&self, descriptor: &ResourceDescriptor) -> ApplyOutcome {
        let pp = PatchParams::apply(FIELD_MANAGER).force();
        match self
            .api_for(descriptor)
            .patch(descriptor.name(), &pp, &Patch::Apply(descriptor.body()))
            .await
        {
            Ok(_) => {
                info!("Applied {} '{}'", descriptor.kind(), descriptor.name());
                ApplyOutcome::Applied
            }
            Err(e) => {
                warn!(
                    "Failed to apply {} '{}': {}",
                    descriptor.kind(),
                    descriptor.name(),
                    e
                );
                ApplyOutcome::Failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ResourceApplier for KubeApplier {
    async fn apply(&self, graph: DependencyGraph) -> ApplyReport {
        let mut report = ApplyReport::default();

        for (position, wave) in graph.waves().enumerate() {
            let mut ready = Vec::with_capacity(wave.len());
            for descriptor in wave {
                match report.blocking_dependency(descriptor) {
                    Some(blocked_by) => {
                        warn!("Skipping {}: {} was not applied", descriptor.id(), blocked_by);
                        report.record(descriptor.id().clone(), ApplyOutcome::Skipped { blocked_by });
                    }
                    None => ready.push(descriptor),
                }
            }

            debug!("Applying wave {} with {} descriptors", position, ready.len());
            let outcomes = join_all(ready.iter().map(|d| self.apply_descriptor(d))).await;
            for (descriptor, outcome) in ready.into_iter().zip(outcomes) {
                report.record(descriptor.id().clone(), outcome);
            }
        }

        report
    }
}
