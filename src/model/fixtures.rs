// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic test fixtures (no RNG).

use super::graph::{FlowEdge, FlowGraph};
use super::ids::{EdgeId, NodeId};
use super::node::{FlowNode, NodeData, NodeKind};

fn add_node(graph: &mut FlowGraph, id: u64, label: &str, kind: NodeKind) -> NodeId {
    let node_id = NodeId::new(id);
    graph
        .nodes_mut()
        .insert(node_id, FlowNode::new(label, NodeData::empty(kind)));
    node_id
}

fn add_edge(graph: &mut FlowGraph, id: u64, source: NodeId, target: NodeId) {
    graph
        .edges_mut()
        .insert(EdgeId::new(id), FlowEdge::new(source, target));
}

/// query -> llm -> tool -> response, with a second llm -> response shortcut.
pub(crate) fn valid_flow_graph() -> FlowGraph {
    let mut graph = FlowGraph::default();
    let query = add_node(&mut graph, 1, "User Query", NodeKind::Query);
    let llm = add_node(&mut graph, 2, "Router", NodeKind::Llm);
    let tool = add_node(&mut graph, 3, "Weather API", NodeKind::Tool);
    let response = add_node(&mut graph, 4, "Answer", NodeKind::Response);

    add_edge(&mut graph, 10, query, llm);
    add_edge(&mut graph, 11, llm, tool);
    add_edge(&mut graph, 12, llm, response);
    add_edge(&mut graph, 13, tool, response);
    graph
}

/// A query node with no outgoing edge next to an otherwise complete flow.
pub(crate) fn stranded_query_graph() -> FlowGraph {
    let mut graph = valid_flow_graph();
    add_node(&mut graph, 5, "Stranded", NodeKind::Query);
    graph
}

/// Two distinct cycles among tool nodes plus a self-loop.
pub(crate) fn cyclic_graph() -> FlowGraph {
    let mut graph = FlowGraph::default();
    let a = add_node(&mut graph, 1, "A", NodeKind::Tool);
    let b = add_node(&mut graph, 2, "B", NodeKind::Tool);
    let c = add_node(&mut graph, 3, "C", NodeKind::Tool);
    let d = add_node(&mut graph, 4, "D", NodeKind::Tool);

    add_edge(&mut graph, 10, a, b);
    add_edge(&mut graph, 11, b, a);
    add_edge(&mut graph, 12, c, d);
    add_edge(&mut graph, 13, d, c);
    add_edge(&mut graph, 14, a, a);
    graph
}

/// An edge whose endpoints were deleted out from under it.
pub(crate) fn dangling_edge_graph() -> FlowGraph {
    let mut graph = FlowGraph::default();
    let query = add_node(&mut graph, 1, "User Query", NodeKind::Query);
    let llm = add_node(&mut graph, 2, "Router", NodeKind::Llm);
    let response = add_node(&mut graph, 3, "Answer", NodeKind::Response);

    add_edge(&mut graph, 10, query, llm);
    add_edge(&mut graph, 11, llm, response);
    add_edge(&mut graph, 12, NodeId::new(98), NodeId::new(99));
    add_edge(&mut graph, 13, llm, NodeId::new(99));
    graph
}
