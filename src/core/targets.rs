//! Target host resolution.
//!
//! Turns explicit host names, cluster names and the local-cluster flag into
//! a deduplicated host list. Resolution problems are logged and skipped so
//! one bad cluster name never blocks the others.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::core::domain::Host;
use crate::core::types::ClusterName;
use crate::error::ResolutionError;

/// Source of cluster membership.
pub trait ClusterSource {
    /// Member nodes of a cluster, or `None` if no such cluster exists.
    fn members(&self, cluster: &str) -> Option<Vec<Host>>;

    /// Name of the cluster a host belongs to.
    fn cluster_of(&self, host: &Host) -> Option<ClusterName>;
}

/// Cluster membership declared in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clusters(BTreeMap<ClusterName, Vec<Host>>);

impl Clusters {
    pub fn new(clusters: BTreeMap<ClusterName, Vec<Host>>) -> Self {
        Self(clusters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl ClusterSource for Clusters {
    fn members(&self, cluster: &str) -> Option<Vec<Host>> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(cluster))
            .map(|(_, hosts)| hosts.clone())
    }

    fn cluster_of(&self, host: &Host) -> Option<ClusterName> {
        self.0
            .iter()
            .find(|(_, hosts)| hosts.contains(host))
            .map(|(name, _)| name.clone())
    }
}

/// What the caller asked to target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSpec {
    pub hosts: Vec<Host>,
    pub clusters: Vec<ClusterName>,
    pub local_cluster: bool,
}

impl TargetSpec {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.clusters.is_empty() && !self.local_cluster
    }
}

/// Resolve a target spec to hosts, first-seen order, no duplicates.
///
/// An empty result means the local host only.
pub fn resolve(source: &dyn ClusterSource, local: &Host, spec: &TargetSpec) -> Vec<Host> {
    let mut resolved: Vec<Host> = Vec::new();
    let mut push = |host: Host| {
        if !resolved.contains(&host) {
            resolved.push(host);
        }
    };

    for host in &spec.hosts {
        push(host.clone());
    }

    if spec.local_cluster {
        match source.cluster_of(local) {
            Some(cluster) => {
                debug!(cluster = %cluster, "local cluster");
                for host in source.members(&cluster).unwrap_or_default() {
                    push(host);
                }
            }
            None => warn!("{}", ResolutionError::NotClustered(local.to_string())),
        }
    }

    for cluster in &spec.clusters {
        match source.members(cluster) {
            Some(hosts) => {
                debug!(cluster = %cluster, nodes = hosts.len(), "cluster resolved");
                for host in hosts {
                    push(host);
                }
            }
            None => error!("{}", ResolutionError::UnknownCluster(cluster.clone())),
        }
    }

    debug!(hosts = resolved.len(), "targets resolved");
    resolved
}

/// Whether a resolved target list means "run here only".
pub fn is_local_only(targets: &[Host], local: &Host) -> bool {
    targets.is_empty() || (targets.len() == 1 && &targets[0] == local)
}
