//! Chain extraction from the editable graph.
//!
//! A pipeline graph must be a single directed chain: exactly one source
//! (in-degree 0), exactly one sink (out-degree 0), every other node with
//! one edge in and one edge out. The UI may transiently hold anything, so
//! this is re-proved on every compile.

use std::collections::HashSet;

use stagecraft_core::{NodeId, StageGraph, StructuralError};

/// Order the graph's nodes from source to sink.
///
/// Returns the node ids in execution order, or the structural reason the
/// graph is not a chain. An empty graph yields an empty order (identity
/// pipeline); a single unconnected node yields a one-element order.
pub fn linearize(graph: &StageGraph) -> Result<Vec<NodeId>, StructuralError> {
    if graph.is_empty() {
        return Ok(Vec::new());
    }

    // Degree check first: a branch is reported as such even when it also
    // breaks the source/sink count.
    for node in graph.nodes() {
        if graph.out_degree(&node.id) >= 2 || graph.in_degree(&node.id) >= 2 {
            return Err(StructuralError::Branch {
                node: node.id.clone(),
            });
        }
    }

    let sources: Vec<&NodeId> = graph
        .nodes()
        .iter()
        .map(|n| &n.id)
        .filter(|id| graph.in_degree(id) == 0)
        .collect();
    let sinks = graph
        .nodes()
        .iter()
        .filter(|n| graph.out_degree(&n.id) == 0)
        .count();

    // With every degree <= 1, no source at all means the edges close a loop.
    if sources.is_empty() || sinks == 0 {
        return Err(StructuralError::Cycle);
    }
    if sources.len() > 1 || sinks > 1 {
        return Err(StructuralError::Disconnected);
    }

    // Walk single outgoing edges from the source.
    let mut order = Vec::with_capacity(graph.node_count());
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut current = sources[0];
    loop {
        if !visited.insert(current) {
            return Err(StructuralError::Cycle);
        }
        order.push(current.clone());
        match graph.successor(current) {
            Some(next) => current = next,
            None => break,
        }
    }

    // A short walk means part of the graph never hangs off the chain.
    if order.len() != graph.node_count() {
        return Err(StructuralError::Disconnected);
    }

    Ok(order)
}
