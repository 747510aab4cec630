use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::kind::{ENTITY_ORDER, EntityKind};

/// Report for entity dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    pub nodes: usize,
    pub edges: usize,
    pub topo_order: Option<Vec<EntityKind>>,
    pub cycle: Option<Vec<EntityKind>>,
}

/// Build a deterministic dependency report for the entity graph.
pub fn build_dependency_report() -> DependencyReport {
    let graph = build_adjacency();
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();

    match toposort(&graph) {
        Ok(order) => DependencyReport {
            nodes,
            edges,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => DependencyReport {
            nodes,
            edges,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

/// Check that `order` lists every entity exactly once and never places an
/// entity ahead of something it reads.
pub fn validate_order(order: &[EntityKind]) -> Result<()> {
    let mut seen = BTreeSet::new();

    for kind in order {
        if !seen.insert(*kind) {
            return Err(CoreError::InvalidOrder(format!("{kind} listed twice")));
        }
        for dependency in kind.dependencies() {
            if !seen.contains(dependency) {
                return Err(CoreError::InvalidOrder(format!(
                    "{kind} is generated before its dependency {dependency}"
                )));
            }
        }
    }

    if let Some(missing) = ENTITY_ORDER.iter().find(|kind| !seen.contains(kind)) {
        return Err(CoreError::InvalidOrder(format!("{missing} is never generated")));
    }

    let report = build_dependency_report();
    if let Some(cycle) = report.cycle {
        return Err(CoreError::Cycle(
            cycle.iter().map(|kind| kind.to_string()).collect(),
        ));
    }

    Ok(())
}

/// Edges point from a dependency to the entities that read it.
fn build_adjacency() -> BTreeMap<EntityKind, BTreeSet<EntityKind>> {
    let mut graph: BTreeMap<EntityKind, BTreeSet<EntityKind>> = BTreeMap::new();

    for kind in ENTITY_ORDER {
        graph.entry(kind).or_default();
        for dependency in kind.dependencies() {
            graph.entry(*dependency).or_default().insert(kind);
        }
    }

    graph
}

fn toposort(
    graph: &BTreeMap<EntityKind, BTreeSet<EntityKind>>,
) -> std::result::Result<Vec<EntityKind>, Vec<EntityKind>> {
    let mut indegree: BTreeMap<EntityKind, usize> =
        graph.keys().map(|node| (*node, 0)).collect();

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(*target).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<EntityKind> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then_some(*node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*target);
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        Err(indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_order_respects_dependencies() {
        assert!(validate_order(&ENTITY_ORDER).is_ok());
    }

    #[test]
    fn graph_is_acyclic() {
        let report = build_dependency_report();
        assert!(report.cycle.is_none());
        let order = report.topo_order.unwrap_or_default();
        assert_eq!(order.len(), ENTITY_ORDER.len());
        assert_eq!(report.nodes, ENTITY_ORDER.len());
    }

    #[test]
    fn sales_before_skus_is_rejected() {
        let mut order = ENTITY_ORDER.to_vec();
        let sales = order.iter().position(|k| *k == EntityKind::Sales).unwrap_or(0);
        let skus = order.iter().position(|k| *k == EntityKind::Skus).unwrap_or(0);
        order.swap(sales, skus);

        let err = validate_order(&order).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOrder(_)));
    }

    #[test]
    fn missing_entity_is_rejected() {
        let order: Vec<EntityKind> = ENTITY_ORDER
            .iter()
            .copied()
            .filter(|kind| *kind != EntityKind::Times)
            .collect();
        assert!(validate_order(&order).is_err());
    }
}
