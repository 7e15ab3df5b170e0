// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types the addon writes.

pub mod helm_chart;

pub use helm_chart::{HelmChart, HelmChartSpec};
