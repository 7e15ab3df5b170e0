// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ordering edges between descriptors and the finished dependency graph.

use crate::descriptors::{DescriptorId, DescriptorSet, ResourceDescriptor};
use crate::error::{AddonError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Attach the fixed ordering rules to a descriptor set:
///
/// - both secrets wait for the namespace
/// - the ingress, when present, waits for the namespace
/// - the release waits for both secrets and the ingress
pub fn assemble(set: DescriptorSet) -> Result<DependencyGraph> {
    let DescriptorSet {
        namespace,
        mut api_token_secret,
        mut bridge_secret,
        mut ingress,
        mut release,
    } = set;

    api_token_secret.add_dependency(namespace.id());
    bridge_secret.add_dependency(namespace.id());
    release.add_dependency(api_token_secret.id());
    release.add_dependency(bridge_secret.id());

    if let Some(ingress) = ingress.as_mut() {
        ingress.add_dependency(namespace.id());
        release.add_dependency(ingress.id());
    }

    let mut descriptors = vec![namespace, api_token_secret, bridge_secret];
    descriptors.extend(ingress);
    descriptors.push(release);

    DependencyGraph::new(descriptors)
}

/// All descriptors of one deployment with their edges, checked to be acyclic.
///
/// Descriptors are grouped into waves: every prerequisite of a descriptor
/// sits in an earlier wave.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    descriptors: Vec<ResourceDescriptor>,
    index: HashMap<DescriptorId, usize>,
    waves: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Validate descriptors and compute their apply waves. Fails on duplicate
    /// names, edges to unknown descriptors, and cycles.
    pub fn new(descriptors: Vec<ResourceDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.id().clone(), position).is_some() {
                return Err(AddonError::DuplicateDescriptor(descriptor.id().to_string()));
            }
        }

        for descriptor in &descriptors {
            if let Some(missing) = descriptor
                .depends_on()
                .iter()
                .find(|dependency| !index.contains_key(*dependency))
            {
                return Err(AddonError::DanglingDependency {
                    descriptor: descriptor.id().to_string(),
                    dependency: missing.to_string(),
                });
            }
        }

        let waves = layer(&descriptors, &index)?;
        debug!(
            "Assembled {} descriptors into {} waves",
            descriptors.len(),
            waves.len()
        );

        Ok(Self {
            descriptors,
            index,
            waves,
        })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, id: &DescriptorId) -> Option<&ResourceDescriptor> {
        self.index.get(id).map(|&position| &self.descriptors[position])
    }

    /// Descriptors in construction order
    pub fn descriptors(&self) -> &[ResourceDescriptor] {
        &self.descriptors
    }

    /// Descriptors without prerequisites
    pub fn roots(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.depends_on().is_empty())
    }

    /// Groups of descriptors that may be applied together, in apply order
    pub fn waves(&self) -> impl Iterator<Item = Vec<&ResourceDescriptor>> + '_ {
        self.waves.iter().map(move |wave| {
            wave.iter()
                .map(|&position| &self.descriptors[position])
                .collect()
        })
    }

    /// A full apply order respecting every edge
    pub fn topological_order(&self) -> Vec<&ResourceDescriptor> {
        self.waves().flatten().collect()
    }
}

/// Kahn's algorithm, keeping each wave in construction order
fn layer(
    descriptors: &[ResourceDescriptor],
    index: &HashMap<DescriptorId, usize>,
) -> Result<Vec<Vec<usize>>> {
    let mut remaining: Vec<usize> = descriptors
        .iter()
        .map(|descriptor| descriptor.depends_on().len())
        .collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); descriptors.len()];
    for (position, descriptor) in descriptors.iter().enumerate() {
        for dependency in descriptor.depends_on() {
            dependents[index[dependency]].push(position);
        }
    }

    let mut waves = Vec::new();
    let mut current: Vec<usize> = (0..descriptors.len())
        .filter(|&position| remaining[position] == 0)
        .collect();
    let mut placed = 0;

    while !current.is_empty() {
        placed += current.len();
        let mut next = Vec::new();
        for &position in &current {
            for &dependent in &dependents[position] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort_unstable();
        waves.push(current);
        current = next;
    }

    if placed != descriptors.len() {
        let mut stuck: Vec<&str> = descriptors
            .iter()
            .enumerate()
            .filter(|(position, _)| remaining[*position] > 0)
            .map(|(_, descriptor)| descriptor.id().as_str())
            .collect();
        stuck.sort_unstable();
        return Err(AddonError::GraphCycleError(stuck.join(", ")));
    }

    Ok(waves)
}
