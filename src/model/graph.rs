// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::ids::{EdgeId, NodeId};
use super::node::FlowNode;

/// A directed connection between two nodes.
///
/// Edges reference nodes by id. An edge whose endpoint no longer exists is
/// tolerated everywhere as a no-op; readers skip it rather than fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    source_node_id: NodeId,
    target_node_id: NodeId,
    label: Option<String>,
}

impl FlowEdge {
    pub fn new(source_node_id: NodeId, target_node_id: NodeId) -> Self {
        Self {
            source_node_id,
            target_node_id,
            label: None,
        }
    }

    pub fn new_with(source_node_id: NodeId, target_node_id: NodeId, label: Option<String>) -> Self {
        Self {
            source_node_id,
            target_node_id,
            label,
        }
    }

    pub fn source_node_id(&self) -> NodeId {
        self.source_node_id
    }

    pub fn target_node_id(&self) -> NodeId {
        self.target_node_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
    }

    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source_node_id == node_id || self.target_node_id == node_id
    }
}

/// The free-form typed graph representation of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowGraph {
    nodes: BTreeMap<NodeId, FlowNode>,
    edges: BTreeMap<EdgeId, FlowEdge>,
}

impl FlowGraph {
    pub fn nodes(&self) -> &BTreeMap<NodeId, FlowNode> {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut BTreeMap<NodeId, FlowNode> {
        &mut self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, FlowEdge> {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut BTreeMap<EdgeId, FlowEdge> {
        &mut self.edges
    }

    pub fn node(&self, node_id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(&node_id)
    }

    pub fn edge(&self, edge_id: EdgeId) -> Option<&FlowEdge> {
        self.edges.get(&edge_id)
    }

    /// Ids of all edges with `node_id` as either endpoint, in id order.
    pub fn incident_edge_ids(&self, node_id: NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| edge.touches(node_id))
            .map(|(edge_id, _)| *edge_id)
            .collect()
    }
}
