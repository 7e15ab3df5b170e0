// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod addon;
pub mod apply;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod descriptors;
pub mod error;
pub mod graph;
pub mod kubernetes;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use addon::{ClusterAddon, KeptnAddon, ReleaseHandle};
pub use error::{AddonError, Result};
