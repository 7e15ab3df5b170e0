// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Addon configuration: per-plane defaults, caller overrides and validation.

use crate::constants::defaults;
use crate::credentials::PlaintextCredential;
use crate::error::{AddonError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Which half of Keptn an addon installs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneKind {
    Control,
    Execution,
}

impl FromStr for PlaneKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "control" | "control-plane" => Ok(PlaneKind::Control),
            "execution" | "execution-plane" => Ok(PlaneKind::Execution),
            other => anyhow::bail!("unknown plane '{}', expected 'control' or 'execution'", other),
        }
    }
}

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub plane: PlaneKind,
    /// Block until the HelmChart CRD is served before deploying
    pub wait_for_crd: bool,
    /// Give up waiting for the CRD after this long; wait forever when unset
    pub crd_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let plane = match string_var(&lookup, "KEPTN_PLANE") {
            Some(value) => value.parse().context("KEPTN_PLANE is invalid")?,
            None => PlaneKind::Control,
        };
        let wait_for_crd = flag_var(&lookup, "WAIT_FOR_CRD")?.unwrap_or(true);
        let crd_timeout = string_var(&lookup, "CRD_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .with_context(|| format!("CRD_TIMEOUT_SECS must be a number of seconds, got '{}'", v))
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Config {
            plane,
            wait_for_crd,
            crd_timeout,
        })
    }
}

/// Caller-supplied settings. Every field is optional; unset fields fall back
/// to the plane's defaults when merged into an [`AddonConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddonOverrides {
    pub ssm_secret_name: Option<String>,
    pub secret_scope: Option<String>,
    pub api_token: Option<String>,
    pub bridge_password: Option<String>,
    pub namespace: Option<String>,
    #[serde(alias = "helmrepo")]
    pub helm_repository: Option<String>,
    pub version: Option<String>,
    pub enable_load_balancer: Option<bool>,
    pub enable_ingress: Option<bool>,
    pub ingress_hostname: Option<String>,
    pub ingress_annotations: Option<BTreeMap<String, String>>,
    pub ingress_secret_name: Option<String>,
    pub control_plane_url: Option<String>,
}

impl AddonOverrides {
    /// Load overrides from `KEPTN_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |name: &str| string_var(&lookup, name);
        let ingress_annotations = match var("KEPTN_INGRESS_ANNOTATIONS") {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .context("KEPTN_INGRESS_ANNOTATIONS must be a JSON object of strings")?,
            ),
            None => None,
        };

        Ok(AddonOverrides {
            ssm_secret_name: var("KEPTN_SSM_SECRET_NAME"),
            secret_scope: var("KEPTN_SECRET_SCOPE"),
            api_token: var("KEPTN_API_TOKEN"),
            bridge_password: var("KEPTN_BRIDGE_PASSWORD"),
            namespace: var("KEPTN_NAMESPACE"),
            helm_repository: var("KEPTN_HELM_REPOSITORY"),
            version: var("KEPTN_VERSION"),
            enable_load_balancer: flag_var(&lookup, "KEPTN_ENABLE_LOAD_BALANCER")?,
            enable_ingress: flag_var(&lookup, "KEPTN_ENABLE_INGRESS")?,
            ingress_hostname: var("KEPTN_INGRESS_HOSTNAME"),
            ingress_annotations,
            ingress_secret_name: var("KEPTN_INGRESS_SECRET_NAME"),
            control_plane_url: var("KEPTN_CONTROL_PLANE_URL"),
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn string_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    non_empty(lookup(name))
}

fn flag_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<bool>> {
    string_var(lookup, name)
        .map(|v| {
            v.parse::<bool>()
                .with_context(|| format!("{} must be 'true' or 'false', got '{}'", name, v))
        })
        .transpose()
}

/// The plane-specific part of the configuration
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    Control,
    Execution { control_plane_url: String },
}

impl Plane {
    pub fn kind(&self) -> PlaneKind {
        match self {
            Plane::Control => PlaneKind::Control,
            Plane::Execution { .. } => PlaneKind::Execution,
        }
    }
}

/// Fully merged addon configuration.
///
/// Built once per addon through [`AddonConfig::merge`] and never mutated
/// afterwards; credential resolution produces a separate value.
#[derive(Debug, Clone, PartialEq)]
pub struct AddonConfig {
    pub plane: Plane,
    /// Helm release name, also the chart name
    pub release_name: String,
    pub ssm_secret_name: Option<String>,
    pub secret_scope: Option<String>,
    pub api_token: Option<PlaintextCredential>,
    pub bridge_password: Option<PlaintextCredential>,
    pub namespace: String,
    pub helm_repository: String,
    pub version: String,
    pub enable_load_balancer: bool,
    pub enable_ingress: bool,
    pub ingress_hostname: Option<String>,
    pub ingress_annotations: BTreeMap<String, String>,
    pub ingress_secret_name: Option<String>,
}

impl AddonConfig {
    /// Documented defaults for a plane
    pub fn defaults(kind: PlaneKind) -> Self {
        let (plane, release_name, version) = match kind {
            PlaneKind::Control => (
                Plane::Control,
                defaults::CONTROL_PLANE_CHART,
                defaults::CONTROL_PLANE_VERSION,
            ),
            PlaneKind::Execution => (
                Plane::Execution {
                    control_plane_url: String::new(),
                },
                defaults::EXECUTION_PLANE_CHART,
                defaults::EXECUTION_PLANE_VERSION,
            ),
        };

        AddonConfig {
            plane,
            release_name: release_name.to_string(),
            ssm_secret_name: None,
            secret_scope: None,
            api_token: None,
            bridge_password: None,
            namespace: defaults::NAMESPACE.to_string(),
            helm_repository: defaults::HELM_REPOSITORY.to_string(),
            version: version.to_string(),
            enable_load_balancer: false,
            enable_ingress: false,
            ingress_hostname: None,
            ingress_annotations: BTreeMap::new(),
            ingress_secret_name: None,
        }
    }

    /// Merge caller overrides over the plane defaults. Any field the caller
    /// set wins; empty strings count as unset.
    pub fn merge(kind: PlaneKind, overrides: AddonOverrides) -> Result<Self> {
        let mut config = Self::defaults(kind);

        let control_plane_url = non_empty(overrides.control_plane_url);
        match (&mut config.plane, control_plane_url) {
            (Plane::Execution { control_plane_url }, Some(url)) => *control_plane_url = url,
            (Plane::Control, Some(_)) => {
                return Err(AddonError::ConfigurationError(
                    "controlPlaneUrl only applies to execution planes".to_string(),
                ))
            }
            (_, None) => {}
        }

        if let Some(v) = non_empty(overrides.namespace) {
            config.namespace = v;
        }
        if let Some(v) = non_empty(overrides.helm_repository) {
            config.helm_repository = v;
        }
        if let Some(v) = non_empty(overrides.version) {
            config.version = v;
        }
        if let Some(v) = overrides.enable_load_balancer {
            config.enable_load_balancer = v;
        }
        if let Some(v) = overrides.enable_ingress {
            config.enable_ingress = v;
        }
        if let Some(v) = overrides.ingress_annotations {
            config.ingress_annotations = v;
        }
        config.ssm_secret_name = non_empty(overrides.ssm_secret_name);
        config.secret_scope = non_empty(overrides.secret_scope);
        config.api_token = non_empty(overrides.api_token).map(PlaintextCredential::new);
        config.bridge_password = non_empty(overrides.bridge_password).map(PlaintextCredential::new);
        config.ingress_hostname = non_empty(overrides.ingress_hostname);
        config.ingress_secret_name = non_empty(overrides.ingress_secret_name);

        Ok(config)
    }

    /// Reject missing or contradictory settings before anything is looked up
    /// or built.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("namespace", &self.namespace),
            ("version", &self.version),
            ("helmRepository", &self.helm_repository),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{} must not be empty", field)));
            }
        }

        Url::parse(&self.helm_repository).map_err(|e| {
            invalid(format!(
                "helmRepository '{}' is not a valid URL: {}",
                self.helm_repository, e
            ))
        })?;

        let hostname_missing = self
            .ingress_hostname
            .as_deref()
            .map_or(true, |h| h.trim().is_empty());
        if self.enable_ingress && hostname_missing {
            return Err(invalid("ingress is enabled but ingressHostname is not set"));
        }
        if !self.enable_ingress && self.ingress_secret_name.is_some() {
            debug!("ingressSecretName is set but ingress is disabled, ignoring it");
        }

        if self.ssm_secret_name.is_none() {
            if self.api_token.is_none() {
                return Err(invalid("apiToken is required when ssmSecretName is not set"));
            }
            if self.bridge_password.is_none() {
                return Err(invalid(
                    "bridgePassword is required when ssmSecretName is not set",
                ));
            }
        }

        if let Plane::Execution { control_plane_url } = &self.plane {
            parse_control_plane_url(control_plane_url)?;
        }

        Ok(())
    }
}

/// Parse and check the control-plane endpoint of an execution plane.
/// The chart only takes a protocol and `host[:port][/path]`, so a query or
/// fragment is rejected.
pub fn parse_control_plane_url(raw: &str) -> Result<Url> {
    if raw.is_empty() {
        return Err(invalid("controlPlaneUrl is required for execution planes"));
    }
    let url = Url::parse(raw)
        .map_err(|e| invalid(format!("controlPlaneUrl '{}' is not a valid URL: {}", raw, e)))?;
    if url.host_str().is_none() {
        return Err(invalid(format!("controlPlaneUrl '{}' has no host", raw)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(format!(
            "controlPlaneUrl '{}' must not carry a query or fragment",
            raw
        )));
    }
    Ok(url)
}

/// Blank or whitespace-only values count as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn invalid(message: impl Into<String>) -> AddonError {
    AddonError::ConfigurationError(message.into())
}
