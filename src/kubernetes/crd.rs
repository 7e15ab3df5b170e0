// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for the helm-controller to serve the HelmChart resource.

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::{AddonError, Result};
use crate::types::HelmChart;
use kube::{Client, Resource};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// Poll until `helmcharts` is served under `helm.cattle.io/v1`, backing off
/// from POLL_INTERVAL_SECS to POLL_MAX_INTERVAL_SECS between attempts.
///
/// With a `timeout`, fails with [`AddonError::CrdUnavailable`] once the next
/// attempt would start past it.
#[instrument(skip(client))]
pub async fn wait_for_helm_chart_crd(client: &Client, timeout: Option<Duration>) -> Result<()> {
    let started = Instant::now();
    let mut interval = Duration::from_secs(POLL_INTERVAL_SECS);
    let max_interval = Duration::from_secs(POLL_MAX_INTERVAL_SECS);

    loop {
        match helm_chart_served(client).await {
            Ok(true) => {
                info!("{} is served", api_version());
                return Ok(());
            }
            Ok(false) => debug!("{} not served yet", api_version()),
            Err(e) => warn!("Checking for {} failed: {}", api_version(), e),
        }

        if let Some(timeout) = timeout {
            if started.elapsed() + interval > timeout {
                return Err(AddonError::CrdUnavailable(format!(
                    "{} not served after {}s",
                    api_version(),
                    started.elapsed().as_secs()
                )));
            }
        }

        info!("Waiting {}s for the HelmChart CRD", interval.as_secs());
        sleep(interval).await;
        interval = (interval * 2).min(max_interval);
    }
}

fn api_version() -> String {
    format!("{}/{}", HelmChart::group(&()), HelmChart::version(&()))
}

/// Whether the group version lists the HelmChart resource. A missing group
/// version is reported as not served rather than as an error.
async fn helm_chart_served(client: &Client) -> Result<bool> {
    let resources = match client.list_api_group_resources(&api_version()).await {
        Ok(resources) => resources,
        Err(kube::Error::Api(response)) if response.code == 404 => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    let plural = HelmChart::plural(&());
    let kind = HelmChart::kind(&());
    Ok(resources
        .resources
        .iter()
        .any(|r| r.name == plural && r.kind == kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{forbidden_json, MockService};
    use serde_json::json;

    const GROUP_PATH: &str = "/apis/helm.cattle.io/v1";

    fn resource_list(resources: serde_json::Value) -> String {
        json!({
            "kind": "APIResourceList",
            "apiVersion": "v1",
            "groupVersion": "helm.cattle.io/v1",
            "resources": resources,
        })
        .to_string()
    }

    fn helm_chart_resource(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "singularName": "",
            "namespaced": true,
            "kind": "HelmChart",
            "verbs": ["get", "list", "patch"],
        })
    }

    #[tokio::test]
    async fn test_served_when_listed() {
        let body = resource_list(json!([
            helm_chart_resource("helmcharts"),
            helm_chart_resource("helmcharts/status"),
        ]));
        let mock = MockService::new().on_get(GROUP_PATH, 200, &body);
        let client = mock.clone().into_client();

        assert!(helm_chart_served(&client).await.unwrap());
        assert_eq!(
            mock.requests(),
            vec![("GET".to_string(), GROUP_PATH.to_string())]
        );
    }

    #[tokio::test]
    async fn test_not_served_when_only_subresource_listed() {
        let body = resource_list(json!([helm_chart_resource("helmcharts/status")]));
        let client = MockService::new().on_get(GROUP_PATH, 200, &body).into_client();

        assert!(!helm_chart_served(&client).await.unwrap());
    }

    #[tokio::test]
    async fn test_not_served_when_group_missing() {
        let client = MockService::new().into_client();

        assert!(!helm_chart_served(&client).await.unwrap());
    }

    #[tokio::test]
    async fn test_api_failure_is_an_error() {
        let client = MockService::new()
            .on_get(GROUP_PATH, 403, &forbidden_json("forbidden"))
            .into_client();

        assert!(matches!(
            helm_chart_served(&client).await,
            Err(AddonError::KubeError(_))
        ));
    }

    #[tokio::test]
    async fn test_wait_returns_once_served() {
        let body = resource_list(json!([helm_chart_resource("helmcharts")]));
        let client = MockService::new().on_get(GROUP_PATH, 200, &body).into_client();

        assert!(wait_for_helm_chart_crd(&client, Some(Duration::ZERO))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_wait_gives_up_after_timeout() {
        let mock = MockService::new();
        let client = mock.clone().into_client();

        let err = wait_for_helm_chart_crd(&client, Some(Duration::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(err, AddonError::CrdUnavailable(_)));
        assert_eq!(mock.requests().len(), 1);
    }
}
