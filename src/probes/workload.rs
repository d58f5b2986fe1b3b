// Kubernetes workload probe: Deployments and StatefulSets in one namespace.

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use kube::api::ListParams;
use kube::{Api, Client};
use tracing::warn;

use super::{DEPLOYMENT_HEALTH_CHECK, STATEFULSET_HEALTH_CHECK};
use crate::models::MetricPoint;

pub struct WorkloadProbe {
    client: Client,
    namespace: String,
}

/// 1.0 when at least one pod backs the workload, 0.0 otherwise.
pub fn replica_health(replicas: i32) -> f64 {
    if replicas > 0 { 1.0 } else { 0.0 }
}

fn gauge(resource: &str, metric: &str, value: i32) -> MetricPoint {
    MetricPoint {
        resource: resource.to_string(),
        metric: metric.to_string(),
        value: f64::from(value),
    }
}

impl WorkloadProbe {
    pub fn new(client: Client, namespace: String) -> Self {
        Self { client, namespace }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Replica-count gauges plus one binary health point per workload found
    /// in the namespace. A deployment is up when it has an available pod; a
    /// stateful set when it has a current pod. A failed listing logs and
    /// records nothing for that kind this tick.
    pub async fn run(&self) -> Vec<MetricPoint> {
        let mut points = Vec::new();

        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
        match deployments.list(&ListParams::default()).await {
            Ok(list) => {
                for deployment in list {
                    let Some(name) = deployment.metadata.name else {
                        continue;
                    };
                    // The API reports counts that have never been set as
                    // absent (e.g. available_replicas on a fresh rollout);
                    // those record as 0.
                    let desired = deployment.spec.and_then(|s| s.replicas).unwrap_or(0);
                    let status = deployment.status.unwrap_or_default();
                    let current = status.replicas.unwrap_or(0);
                    let updated = status.updated_replicas.unwrap_or(0);
                    let available = status.available_replicas.unwrap_or(0);

                    points.push(gauge(&name, "deployment_desired", desired));
                    points.push(gauge(&name, "deployment_current", current));
                    points.push(gauge(&name, "deployment_updated", updated));
                    points.push(gauge(&name, "deployment_available", available));
                    points.push(MetricPoint {
                        resource: name,
                        metric: DEPLOYMENT_HEALTH_CHECK.to_string(),
                        value: replica_health(available),
                    });
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    namespace = %self.namespace,
                    operation = "list_deployments",
                    "deployment listing failed"
                );
            }
        }

        let stateful_sets: Api<StatefulSet> = Api::namespaced(self.client.clone(), &self.namespace);
        match stateful_sets.list(&ListParams::default()).await {
            Ok(list) => {
                for stateful_set in list {
                    let Some(name) = stateful_set.metadata.name else {
                        continue;
                    };
                    let desired = stateful_set.spec.and_then(|s| s.replicas).unwrap_or(0);
                    let current = stateful_set
                        .status
                        .and_then(|s| s.current_replicas)
                        .unwrap_or(0);

                    points.push(gauge(&name, "statefulset_desired", desired));
                    points.push(gauge(&name, "statefulset_current", current));
                    points.push(MetricPoint {
                        resource: name,
                        metric: STATEFULSET_HEALTH_CHECK.to_string(),
                        value: replica_health(current),
                    });
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    namespace = %self.namespace,
                    operation = "list_stateful_sets",
                    "stateful set listing failed"
                );
            }
        }

        points
    }
}
