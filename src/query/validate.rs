// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Full-graph structural validation, run on demand before publish.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FlowGraph, NodeId, NodeKind};
use crate::rules;

/// Outcome of [`validate_flow`]: a publish gate, never an editing gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeDegree {
    incoming: u64,
    outgoing: u64,
}

/// Validates the graph's degree rules and acyclicity.
///
/// Error order is deterministic: degree violations in node-id order (incoming
/// before outgoing per node), then at most one cycle message. Edges whose
/// endpoints no longer exist contribute nothing and are never themselves an
/// error; the function never panics on malformed input.
pub fn validate_flow(graph: &FlowGraph) -> FlowValidation {
    let mut degrees: BTreeMap<NodeId, NodeDegree> = BTreeMap::new();
    let mut outgoing: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();

    for node_id in graph.nodes().keys() {
        degrees.entry(*node_id).or_default();
        outgoing.entry(*node_id).or_default();
    }

    for edge in graph.edges().values() {
        let source = edge.source_node_id();
        let target = edge.target_node_id();
        if !graph.nodes().contains_key(&source) || !graph.nodes().contains_key(&target) {
            continue;
        }
        degrees.entry(source).or_default().outgoing += 1;
        degrees.entry(target).or_default().incoming += 1;
        outgoing.entry(source).or_default().push(target);
    }

    let mut errors = Vec::new();

    for (node_id, node) in graph.nodes() {
        let degree = degrees.get(node_id).copied().unwrap_or_default();
        let required = rules::required_connections(node.kind());

        if required.incoming().is_empty() && degree.incoming > 0 {
            if let Some(message) = forbidden_incoming_message(node.kind(), node.label()) {
                errors.push(message);
            }
        }
        if required.requires_incoming() && degree.incoming == 0 {
            errors.push(missing_incoming_message(node.kind(), node.label()));
        }
        if required.outgoing().is_empty() && degree.outgoing > 0 {
            if let Some(message) = forbidden_outgoing_message(node.kind(), node.label()) {
                errors.push(message);
            }
        }
        if required.requires_outgoing() && degree.outgoing == 0 {
            errors.push(missing_outgoing_message(node.kind(), node.label()));
        }
    }

    if has_cycle(&outgoing) {
        errors.push("Flow contains circular connections, which are not allowed.".to_owned());
    }

    FlowValidation {
        valid: errors.is_empty(),
        errors,
    }
}

fn forbidden_incoming_message(kind: NodeKind, label: &str) -> Option<String> {
    match kind {
        NodeKind::Query => Some(format!(
            "Query node \"{label}\" must not have incoming connections."
        )),
        _ => None,
    }
}

fn missing_incoming_message(kind: NodeKind, label: &str) -> String {
    match kind {
        NodeKind::Llm => {
            format!("LLM node \"{label}\" has no incoming connections, connect a Query node to it.")
        }
        NodeKind::Tool => {
            format!("Tool node \"{label}\" has no incoming connections, connect an LLM node to it.")
        }
        NodeKind::Response => format!(
            "Response node \"{label}\" has no incoming connections, connect an LLM or Tool node to it."
        ),
        other => format!(
            "{} node \"{label}\" has no incoming connections.",
            other.display_name()
        ),
    }
}

fn forbidden_outgoing_message(kind: NodeKind, label: &str) -> Option<String> {
    match kind {
        NodeKind::Response => Some(format!(
            "Response node \"{label}\" must not have outgoing connections."
        )),
        _ => None,
    }
}

fn missing_outgoing_message(kind: NodeKind, label: &str) -> String {
    match kind {
        NodeKind::Query => {
            format!("Query node \"{label}\" has no outgoing connections, connect it to an LLM node.")
        }
        NodeKind::Llm => format!(
            "LLM node \"{label}\" has no outgoing connections, connect it to a Tool or Response node."
        ),
        NodeKind::Tool => format!(
            "Tool node \"{label}\" has no outgoing connections, connect it to a Response node."
        ),
        other => format!(
            "{} node \"{label}\" has no outgoing connections.",
            other.display_name()
        ),
    }
}

/// Depth-first search with a recursion stack; stops at the first back edge.
/// One cycle is enough to fail validation, so cycles are not enumerated.
fn has_cycle(outgoing: &BTreeMap<NodeId, Vec<NodeId>>) -> bool {
    fn visit(
        node_id: NodeId,
        outgoing: &BTreeMap<NodeId, Vec<NodeId>>,
        visited: &mut BTreeSet<NodeId>,
        in_progress: &mut BTreeSet<NodeId>,
    ) -> bool {
        if in_progress.contains(&node_id) {
            return true;
        }
        if !visited.insert(node_id) {
            return false;
        }
        in_progress.insert(node_id);
        for next_id in outgoing.get(&node_id).into_iter().flatten() {
            if visit(*next_id, outgoing, visited, in_progress) {
                return true;
            }
        }
        in_progress.remove(&node_id);
        false
    }

    let mut visited = BTreeSet::new();
    let mut in_progress = BTreeSet::new();
    outgoing
        .keys()
        .any(|node_id| visit(*node_id, outgoing, &mut visited, &mut in_progress))
}
