// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Contract for the mechanism that realises a dependency graph on a cluster.

use crate::descriptors::{DescriptorId, ResourceDescriptor};
use crate::graph::DependencyGraph;
use async_trait::async_trait;
use std::fmt;

/// Applies a finished graph. Implementations must not apply a descriptor
/// before every descriptor it depends on was applied successfully.
#[async_trait]
pub trait ResourceApplier: Send + Sync {
    async fn apply(&self, graph: DependencyGraph) -> ApplyReport;
}

/// What happened to one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed(String),
    /// Not submitted because a prerequisite did not apply
    Skipped { blocked_by: DescriptorId },
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOutcome::Applied => write!(f, "applied"),
            ApplyOutcome::Failed(message) => write!(f, "failed: {}", message),
            ApplyOutcome::Skipped { blocked_by } => write!(f, "skipped, blocked by {}", blocked_by),
        }
    }
}

/// Per-descriptor outcomes in the order they were decided
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    outcomes: Vec<(DescriptorId, ApplyOutcome)>,
}

impl ApplyReport {
    pub fn record(&mut self, id: DescriptorId, outcome: ApplyOutcome) {
        self.outcomes.push((id, outcome));
    }

    pub fn outcome(&self, id: &DescriptorId) -> Option<&ApplyOutcome> {
        self.outcomes
            .iter()
            .find(|(recorded, _)| recorded == id)
            .map(|(_, outcome)| outcome)
    }

    /// First prerequisite of `descriptor` that is not known to be applied
    pub fn blocking_dependency(&self, descriptor: &ResourceDescriptor) -> Option<DescriptorId> {
        descriptor
            .depends_on()
            .iter()
            .find(|dependency| self.outcome(dependency) != Some(&ApplyOutcome::Applied))
            .cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DescriptorId, &ApplyOutcome)> {
        self.outcomes.iter().map(|(id, outcome)| (id, outcome))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every recorded descriptor was applied
    pub fn is_success(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, outcome)| *outcome == ApplyOutcome::Applied)
    }

    /// Descriptors that failed or were skipped
    pub fn failures(&self) -> impl Iterator<Item = (&DescriptorId, &ApplyOutcome)> {
        self.iter()
            .filter(|(_, outcome)| **outcome != ApplyOutcome::Applied)
    }
}
