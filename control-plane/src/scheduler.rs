use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::ControlPlaneError;
use crate::inventory::model::Node;

/// The six selectable bin-packing policies. Kept as variants of one enum
/// rather than a string switch so adding a policy never touches the
/// request-handling hot path (the string is parsed once, at the HTTP
/// boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    FirstFit,
    BestFit,
    WorstFit,
    RoundRobin,
    MostPods,
    LeastPods,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::FirstFit
    }
}

impl FromStr for Algorithm {
    type Err = ControlPlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first-fit" => Ok(Algorithm::FirstFit),
            "best-fit" => Ok(Algorithm::BestFit),
            "worst-fit" => Ok(Algorithm::WorstFit),
            "round-robin" => Ok(Algorithm::RoundRobin),
            "most-pods" => Ok(Algorithm::MostPods),
            "least-pods" => Ok(Algorithm::LeastPods),
            other => Err(ControlPlaneError::Validation(format!(
                "unknown scheduling algorithm '{other}'"
            ))),
        }
    }
}

/// Holds the currently selected algorithm plus the running pod counter
/// that round-robin needs. Policy switches are a single atomic store:
/// in-flight `choose` calls observe either the old or the new value,
/// never a torn read.
pub struct Scheduler {
    algorithm: std::sync::atomic::AtomicU8,
    total_placements: AtomicUsize,
}

impl Scheduler {
    pub fn new(initial: Algorithm) -> Self {
        Self {
            algorithm: std::sync::atomic::AtomicU8::new(initial as u8),
            total_placements: AtomicUsize::new(0),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.algorithm.load(Ordering::SeqCst) {
            0 => Algorithm::FirstFit,
            1 => Algorithm::BestFit,
            2 => Algorithm::WorstFit,
            3 => Algorithm::RoundRobin,
            4 => Algorithm::MostPods,
            _ => Algorithm::LeastPods,
        }
    }

    pub fn set_algorithm(&self, algorithm: Algorithm) {
        self.algorithm.store(algorithm as u8, Ordering::SeqCst);
    }

    /// Pure placement decision over a snapshot of nodes. Never mutates
    /// anything; the caller commits the decision (and increments
    /// `total_placements` via `record_placement`) inside the inventory's
    /// write section.
    pub fn choose<'a>(&self, demand: u32, nodes: impl Iterator<Item = &'a Node>) -> Result<String, ControlPlaneError> {
        let eligible: Vec<&Node> = nodes.filter(|n| n.is_eligible(demand)).collect();
        if eligible.is_empty() {
            return Err(ControlPlaneError::InsufficientCapacity(demand));
        }

        // `Iterator::max_by_key` returns the *last* of equal maxima, but the
        // spec's tie-break for worst-fit/most-pods is "first seen" — the
        // same rule best-fit/least-pods get for free from `min_by_key`.
        // Reversing before `max_by_key` restores "first seen wins" for ties.
        let chosen = match self.algorithm() {
            Algorithm::FirstFit => eligible[0],
            Algorithm::BestFit => eligible
                .iter()
                .copied()
                .min_by_key(|n| n.residual_cpu)
                .unwrap(),
            Algorithm::WorstFit => eligible
                .iter()
                .copied()
                .rev()
                .max_by_key(|n| n.residual_cpu)
                .unwrap(),
            Algorithm::RoundRobin => {
                let total = self.total_placements.load(Ordering::SeqCst);
                eligible[total % eligible.len()]
            }
            Algorithm::MostPods => eligible
                .iter()
                .copied()
                .rev()
                .max_by_key(|n| n.pods.len())
                .unwrap(),
            Algorithm::LeastPods => eligible
                .iter()
                .copied()
                .min_by_key(|n| n.pods.len())
                .unwrap(),
        };

        Ok(chosen.id.clone())
    }

    /// Must be called exactly once per successful placement, under the
    /// same write section that commits the assignment, so round-robin's
    /// index tracks the true number of placements made so far.
    pub fn record_placement(&self) {
        self.total_placements.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::model::NodeStatus;
    use chrono::Utc;

    fn node(id: &str, total: u32, residual: u32, pod_count: usize) -> Node {
        let mut n = Node::new(id.to_string(), total, Utc::now());
        n.residual_cpu = residual;
        for i in 0..pod_count {
            n.pods.insert(format!("{id}-pod-{i}"));
        }
        n
    }

    #[test]
    fn first_fit_picks_first_eligible() {
        let s = Scheduler::new(Algorithm::FirstFit);
        let nodes = vec![node("a", 4, 4, 0), node("b", 4, 4, 0)];
        let chosen = s.choose(3, nodes.iter()).unwrap();
        assert_eq!(chosen, "a");
    }

    #[test]
    fn best_fit_picks_minimum_residual() {
        let s = Scheduler::new(Algorithm::BestFit);
        let nodes = vec![node("a", 8, 8, 0), node("b", 4, 4, 0), node("c", 6, 6, 0)];
        let chosen = s.choose(3, nodes.iter()).unwrap();
        assert_eq!(chosen, "b");
    }

    #[test]
    fn worst_fit_picks_maximum_residual() {
        let s = Scheduler::new(Algorithm::WorstFit);
        let nodes = vec![node("a", 8, 8, 0), node("b", 4, 4, 0), node("c", 6, 6, 0)];
        let chosen = s.choose(3, nodes.iter()).unwrap();
        assert_eq!(chosen, "a");
    }

    #[test]
    fn worst_fit_tie_prefers_first_seen() {
        let s = Scheduler::new(Algorithm::WorstFit);
        let nodes = vec![node("a", 4, 4, 0), node("b", 4, 4, 0), node("c", 4, 4, 0)];
        let chosen = s.choose(3, nodes.iter()).unwrap();
        assert_eq!(chosen, "a");
    }

    #[test]
    fn most_pods_tie_prefers_first_seen() {
        let s = Scheduler::new(Algorithm::MostPods);
        let nodes = vec![node("a", 4, 4, 2), node("b", 4, 4, 2), node("c", 4, 4, 2)];
        let chosen = s.choose(1, nodes.iter()).unwrap();
        assert_eq!(chosen, "a");
    }

    #[test]
    fn ineligible_unhealthy_node_excluded() {
        let s = Scheduler::new(Algorithm::FirstFit);
        let mut unhealthy = node("a", 8, 8, 0);
        unhealthy.status = NodeStatus::Failed;
        let nodes = vec![unhealthy];
        assert!(matches!(
            s.choose(1, nodes.iter()),
            Err(ControlPlaneError::InsufficientCapacity(1))
        ));
    }

    #[test]
    fn round_robin_uses_total_placement_count() {
        let s = Scheduler::new(Algorithm::RoundRobin);
        let nodes = vec![node("a", 4, 4, 0), node("b", 4, 4, 0), node("c", 4, 4, 0)];
        let mut picks = Vec::new();
        for _ in 0..6 {
            picks.push(s.choose(1, nodes.iter()).unwrap());
            s.record_placement();
        }
        assert_eq!(picks, vec!["a", "b", "c", "a", "b", "c"]);
    }

    #[test]
    fn unknown_algorithm_name_rejected() {
        assert!("bogus".parse::<Algorithm>().is_err());
        assert_eq!("first-fit".parse::<Algorithm>().unwrap(), Algorithm::FirstFit);
    }
}
