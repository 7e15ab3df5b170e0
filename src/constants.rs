// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager used for server-side apply
pub const FIELD_MANAGER: &str = "keptn-addon";

/// Defaults applied to fields the caller leaves unset
pub mod defaults {
    pub const NAMESPACE: &str = "keptn";
    pub const HELM_REPOSITORY: &str = "https://storage.googleapis.com/keptn-installer";
    pub const CONTROL_PLANE_CHART: &str = "keptn";
    pub const CONTROL_PLANE_VERSION: &str = "0.11.3";
    pub const EXECUTION_PLANE_CHART: &str = "helm-service";
    pub const EXECUTION_PLANE_VERSION: &str = "0.11.4";
}

/// Secret names and keys the Keptn chart looks up at install time.
/// These must match the chart exactly or it will generate its own.
pub mod secrets {
    pub const API_TOKEN_NAME: &str = "keptn-api-token";
    pub const API_TOKEN_KEY: &str = "keptn-api-token";
    pub const BRIDGE_NAME: &str = "bridge-credentials";
    pub const BRIDGE_USERNAME_KEY: &str = "BASIC_AUTH_USERNAME";
    pub const BRIDGE_PASSWORD_KEY: &str = "BASIC_AUTH_PASSWORD";
    /// Fixed bridge login; only the password is configurable
    pub const BRIDGE_USERNAME: &str = "keptn";

    /// Field names expected in an externally stored credential document
    pub const DOCUMENT_API_TOKEN: &str = "API_TOKEN";
    pub const DOCUMENT_BRIDGE_PASSWORD: &str = "BRIDGE_PASSWORD";
}

/// Labels and annotations that let Helm adopt pre-created objects
pub mod helm {
    pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "Helm";
    pub const NAME_LABEL: &str = "app.kubernetes.io/name";
    pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";
    pub const VERSION_LABEL: &str = "app.kubernetes.io/version";
    pub const CHART_LABEL: &str = "helm.sh/chart";
    pub const RELEASE_NAME_ANNOTATION: &str = "meta.helm.sh/release-name";
    pub const RELEASE_NAMESPACE_ANNOTATION: &str = "meta.helm.sh/release-namespace";
}

/// Ingress routing to the Keptn API gateway
pub mod ingress {
    pub const NAME: &str = "api-keptn-ingress";
    pub const BACKEND_SERVICE: &str = "api-gateway-nginx";
    pub const BACKEND_PORT: i32 = 80;
    pub const PATH: &str = "/";
    pub const PATH_TYPE: &str = "Prefix";
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
