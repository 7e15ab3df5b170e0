// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery, server-side apply, and secret lookup.

pub mod applier;
pub mod crd;
pub mod secret_store;

pub use applier::KubeApplier;
pub use crd::wait_for_helm_chart_crd;
pub use secret_store::KubeSecretStore;
