// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::graph::{FlowEdge, FlowGraph};
use super::ids::{
    EdgeId, IdAllocator, McpConfigId, NodeId, PromptId, ResponseConfigId, StepId, ToolId,
};
use super::item_ref::ItemRef;
use super::node::{FlowNode, NodeData};
use super::registry::Registry;
use super::step::{StepBody, StepKind, StepSequence, WorkflowStep};
use crate::rules;

/// The top-level container one editing session runs against.
///
/// A session exclusively owns the graph, the step sequence, the registry and
/// the selection pointer; every mutation below is a synchronous, atomic
/// transition. Illegal mutations are sentinel-return no-ops, and deletes
/// carry their reference cascade inside the same call, so after any completed
/// mutation no step, saved config or graph node references a record that no
/// longer exists and the selection never points at a deleted item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    graph: FlowGraph,
    steps: StepSequence,
    registry: Registry,
    selection: Option<ItemRef>,
    ids: IdAllocator,
    rev: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut FlowGraph {
        &mut self.graph
    }

    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut StepSequence {
        &mut self.steps
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub(crate) fn set_rev(&mut self, rev: u64) {
        self.rev = rev;
    }

    pub(crate) fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    pub(crate) fn next_object_id_value(&self) -> u64 {
        self.ids.next_value()
    }

    pub(crate) fn restore_allocator(&mut self, next: u64) {
        self.ids = IdAllocator::resume_at(next);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> Option<ItemRef> {
        self.selection
    }

    /// Points the selection at `item`. Returns false (selection unchanged)
    /// when the item does not exist.
    pub fn set_selection(&mut self, item: ItemRef) -> bool {
        if !self.contains_item(item) {
            return false;
        }
        self.selection = Some(item);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn clear_selection_if(&mut self, item: ItemRef) {
        if self.selection == Some(item) {
            self.selection = None;
        }
    }

    pub fn contains_item(&self, item: ItemRef) -> bool {
        match item {
            ItemRef::Node(id) => self.graph.nodes().contains_key(&id),
            ItemRef::Edge(id) => self.graph.edges().contains_key(&id),
            ItemRef::Step(id) => self.steps.get(id).is_some(),
            ItemRef::Tool(id) => self.registry.tool(id).is_some(),
            ItemRef::McpConfig(id) => self.registry.mcp_config(id).is_some(),
            ItemRef::ResponseConfig(id) => self.registry.response_config(id).is_some(),
            ItemRef::Prompt(id) => self.registry.prompt(id).is_some(),
        }
    }

    // ------------------------------------------------------------------
    // Graph mutations
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, label: impl Into<String>, data: NodeData) -> NodeId {
        let node_id = self.ids.allocate();
        self.graph
            .nodes_mut()
            .insert(node_id, FlowNode::new(label, data));
        node_id
    }

    /// Whether an edge from `source` to `target` would be legal right now.
    pub fn can_connect_nodes(&self, source: NodeId, target: NodeId) -> bool {
        let (Some(source_node), Some(target_node)) =
            (self.graph.node(source), self.graph.node(target))
        else {
            return false;
        };
        rules::can_connect(source_node.kind(), target_node.kind())
    }

    /// Connects `source` to `target`. Returns the new edge id, or None (and
    /// an unchanged edge list) when either endpoint is missing or the type
    /// pair is not in the legal connection table.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.add_edge_with(source, target, None)
    }

    pub fn add_edge_with(
        &mut self,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
    ) -> Option<EdgeId> {
        if !self.can_connect_nodes(source, target) {
            return None;
        }
        let edge_id = self.ids.allocate();
        self.graph
            .edges_mut()
            .insert(edge_id, FlowEdge::new_with(source, target, label));
        Some(edge_id)
    }

    /// Removes the node and every incident edge; the selection is cleared in
    /// the same call when it pointed at the node or at a removed edge.
    pub fn remove_node(&mut self, node_id: NodeId) -> bool {
        if self.graph.nodes_mut().remove(&node_id).is_none() {
            return false;
        }
        for edge_id in self.graph.incident_edge_ids(node_id) {
            self.graph.edges_mut().remove(&edge_id);
            self.clear_selection_if(ItemRef::Edge(edge_id));
        }
        self.clear_selection_if(ItemRef::Node(node_id));
        true
    }

    pub fn remove_edge(&mut self, edge_id: EdgeId) -> bool {
        if self.graph.edges_mut().remove(&edge_id).is_none() {
            return false;
        }
        self.clear_selection_if(ItemRef::Edge(edge_id));
        true
    }

    // ------------------------------------------------------------------
    // Step mutations
    // ------------------------------------------------------------------

    pub fn can_add_step(&self, kind: StepKind, after: Option<StepId>) -> bool {
        self.steps.can_insert(kind, after)
    }

    /// Inserts a fresh step with the kind's defaults at the head (no `after`)
    /// or immediately after the referenced step. Returns None and leaves the
    /// list unchanged on an illegal insertion.
    pub fn add_workflow_step(&mut self, kind: StepKind, after: Option<StepId>) -> Option<StepId> {
        if !self.steps.can_insert(kind, after) {
            return None;
        }
        let step_id = self.ids.allocate();
        let step = WorkflowStep::new(step_id, StepBody::with_defaults(kind));
        if !self.steps.insert(step, after) {
            return None;
        }
        Some(step_id)
    }

    pub fn workflow_step(&self, step_id: StepId) -> Option<&WorkflowStep> {
        self.steps.get(step_id)
    }

    pub fn delete_workflow_step(&mut self, step_id: StepId) -> bool {
        if self.steps.remove(step_id).is_none() {
            return false;
        }
        self.clear_selection_if(ItemRef::Step(step_id));
        true
    }

    /// Relocates a step; a reorder that would break the alternation invariant
    /// is rolled back and reported as false.
    pub fn move_workflow_step(&mut self, step_id: StepId, new_index: usize) -> bool {
        self.steps.move_to(step_id, new_index)
    }

    // ------------------------------------------------------------------
    // Registry deletes (cascading)
    // ------------------------------------------------------------------

    /// Deletes the tool and, in the same operation, strips its id from every
    /// MCP step's tool selection, every saved MCP config's tool selection and
    /// every tool node's reference, then clears a selection pointing at it.
    pub fn remove_tool(&mut self, tool_id: ToolId) -> bool {
        if self.registry.remove_tool_record(tool_id).is_none() {
            return false;
        }
        for step in self.steps.steps_mut() {
            if let Some(mcp) = step.as_mcp_mut() {
                mcp.selected_tool_ids_mut().retain(|id| *id != tool_id);
            }
        }
        for config in self.registry.mcp_configs_mut().values_mut() {
            config.selected_tool_ids_mut().retain(|id| *id != tool_id);
        }
        for node in self.graph.nodes_mut().values_mut() {
            if let NodeData::Tool { tool_ref } = node.data_mut() {
                if *tool_ref == Some(tool_id) {
                    *tool_ref = None;
                }
            }
        }
        self.clear_selection_if(ItemRef::Tool(tool_id));
        true
    }

    pub fn remove_mcp_config(&mut self, config_id: McpConfigId) -> bool {
        if self.registry.remove_mcp_config_record(config_id).is_none() {
            return false;
        }
        for step in self.steps.steps_mut() {
            if let Some(mcp) = step.as_mcp_mut() {
                if mcp.config_ref() == Some(config_id) {
                    mcp.set_config_ref(None);
                }
            }
        }
        for node in self.graph.nodes_mut().values_mut() {
            if let NodeData::Llm { config_ref } = node.data_mut() {
                if *config_ref == Some(config_id) {
                    *config_ref = None;
                }
            }
        }
        self.clear_selection_if(ItemRef::McpConfig(config_id));
        true
    }

    pub fn remove_response_config(&mut self, config_id: ResponseConfigId) -> bool {
        if self
            .registry
            .remove_response_config_record(config_id)
            .is_none()
        {
            return false;
        }
        for step in self.steps.steps_mut() {
            if let Some(response) = step.as_response_mut() {
                if response.config_ref() == Some(config_id) {
                    response.set_config_ref(None);
                }
            }
        }
        for node in self.graph.nodes_mut().values_mut() {
            if let NodeData::Response { config_ref } = node.data_mut() {
                if *config_ref == Some(config_id) {
                    *config_ref = None;
                }
            }
        }
        self.clear_selection_if(ItemRef::ResponseConfig(config_id));
        true
    }

    pub fn remove_prompt(&mut self, prompt_id: PromptId) -> bool {
        if self.registry.remove_prompt_record(prompt_id).is_none() {
            return false;
        }
        for step in self.steps.steps_mut() {
            if let Some(mcp) = step.as_mcp_mut() {
                if mcp.prompt_ref() == Some(prompt_id) {
                    mcp.set_prompt_ref(None);
                }
            }
        }
        self.clear_selection_if(ItemRef::Prompt(prompt_id));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::model::{ItemRef, NodeData, NodeKind, StepKind};
    use crate::model::records::HttpMethod;

    fn session_with_linear_flow() -> Session {
        let mut session = Session::new();
        let query = session.add_node("User Query", NodeData::empty(NodeKind::Query));
        let llm = session.add_node("Router", NodeData::empty(NodeKind::Llm));
        let tool = session.add_node("Weather API", NodeData::empty(NodeKind::Tool));
        let response = session.add_node("Answer", NodeData::empty(NodeKind::Response));
        session.add_edge(query, llm).expect("query -> llm");
        session.add_edge(llm, tool).expect("llm -> tool");
        session.add_edge(tool, response).expect("tool -> response");
        session
    }

    #[test]
    fn add_edge_rejects_illegal_pairs_and_missing_endpoints() {
        let mut session = Session::new();
        let query = session.add_node("Q", NodeData::empty(NodeKind::Query));
        let tool = session.add_node("T", NodeData::empty(NodeKind::Tool));

        assert_eq!(session.add_edge(query, tool), None);
        assert_eq!(session.add_edge(tool, query), None);
        assert_eq!(
            session.add_edge(query, crate::model::NodeId::new(99)),
            None
        );
        assert!(session.graph().edges().is_empty());
    }

    #[test]
    fn removing_a_node_removes_incident_edges_and_clears_edge_selection() {
        let mut session = session_with_linear_flow();
        let llm_id = *session
            .graph()
            .nodes()
            .iter()
            .find(|(_, node)| node.kind() == NodeKind::Llm)
            .map(|(id, _)| id)
            .expect("llm node");
        let incident = session.graph().incident_edge_ids(llm_id);
        assert_eq!(incident.len(), 2);

        assert!(session.set_selection(ItemRef::Edge(incident[0])));
        assert!(session.remove_node(llm_id));

        assert_eq!(session.selection(), None);
        assert!(session.graph().node(llm_id).is_none());
        for edge_id in incident {
            assert!(session.graph().edge(edge_id).is_none());
        }
        // Unrelated edges survive.
        assert_eq!(session.graph().edges().len(), 1);
    }

    #[test]
    fn first_step_must_be_mcp() {
        let mut session = Session::new();
        assert_eq!(session.add_workflow_step(StepKind::Response, None), None);
        assert!(session.steps().is_empty());

        let step_id = session
            .add_workflow_step(StepKind::Mcp, None)
            .expect("first mcp step");
        assert_eq!(session.steps().len(), 1);
        assert_eq!(
            session.workflow_step(step_id).map(|s| s.kind()),
            Some(StepKind::Mcp)
        );
    }

    #[test]
    fn step_insertion_follows_the_alternation_machine() {
        let mut session = Session::new();
        let a = session
            .add_workflow_step(StepKind::Mcp, None)
            .expect("mcp A");

        assert_eq!(session.add_workflow_step(StepKind::Mcp, Some(a)), None);
        let b = session
            .add_workflow_step(StepKind::Response, Some(a))
            .expect("response B");

        let kinds = session
            .steps()
            .steps()
            .iter()
            .map(|step| step.kind())
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![StepKind::Mcp, StepKind::Response]);
        assert_eq!(session.steps().position(b), Some(1));
    }

    #[test]
    fn deleting_the_selected_step_clears_the_selection() {
        let mut session = Session::new();
        let a = session.add_workflow_step(StepKind::Mcp, None).expect("A");
        let b = session
            .add_workflow_step(StepKind::Response, Some(a))
            .expect("B");

        assert!(session.set_selection(ItemRef::Step(a)));
        assert!(session.delete_workflow_step(b));
        assert_eq!(session.selection(), Some(ItemRef::Step(a)));

        assert!(session.delete_workflow_step(a));
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn deleting_a_tool_cascades_into_steps_configs_and_nodes() {
        let mut session = Session::new();
        let tool_id =
            session
                .registry_mut()
                .add_tool("get_quote", HttpMethod::Get, "https://api.example.com");
        let other_tool =
            session
                .registry_mut()
                .add_tool("get_news", HttpMethod::Get, "https://api.example.com");

        // Three steps referencing the tool.
        let mut after = None;
        for _ in 0..3 {
            let mcp = session
                .add_workflow_step(StepKind::Mcp, after)
                .expect("mcp step");
            let response = session
                .add_workflow_step(StepKind::Response, Some(mcp))
                .expect("response step");
            after = Some(response);
            session
                .steps_mut()
                .get_mut(mcp)
                .and_then(|step| step.as_mcp_mut())
                .expect("mcp body")
                .selected_tool_ids_mut()
                .extend([tool_id, other_tool]);
        }

        // Two saved configs referencing the tool.
        let config_a = session.registry_mut().add_mcp_config("A");
        let config_b = session.registry_mut().add_mcp_config("B");
        for config_id in [config_a, config_b] {
            session
                .registry_mut()
                .mcp_config_mut(config_id)
                .expect("config")
                .selected_tool_ids_mut()
                .push(tool_id);
        }

        // A tool node referencing the tool.
        let node_id = session.add_node(
            "Quotes",
            NodeData::Tool {
                tool_ref: Some(tool_id),
            },
        );

        assert!(session.set_selection(ItemRef::Tool(tool_id)));
        assert!(session.remove_tool(tool_id));

        assert!(session.registry().tool(tool_id).is_none());
        for step in session.steps().steps() {
            if let Some(mcp) = step.as_mcp() {
                assert!(!mcp.selected_tool_ids().contains(&tool_id));
                assert!(mcp.selected_tool_ids().contains(&other_tool));
            }
        }
        for config_id in [config_a, config_b] {
            let config = session.registry().mcp_config(config_id).expect("config");
            assert!(config.selected_tool_ids().is_empty());
        }
        let node = session.graph().node(node_id).expect("node");
        assert_eq!(node.data(), &NodeData::Tool { tool_ref: None });
        assert_eq!(session.selection(), None);

        // Deleting again is a no-op.
        assert!(!session.remove_tool(tool_id));
    }

    #[test]
    fn deleting_configs_and_prompts_clears_references() {
        let mut session = Session::new();
        let mcp_config = session.registry_mut().add_mcp_config("Saved");
        let response_config = session.registry_mut().add_response_config("Raw");
        let prompt = session.registry_mut().add_prompt("P", "content");

        let a = session.add_workflow_step(StepKind::Mcp, None).expect("A");
        let b = session
            .add_workflow_step(StepKind::Response, Some(a))
            .expect("B");
        {
            let mcp = session
                .steps_mut()
                .get_mut(a)
                .and_then(|step| step.as_mcp_mut())
                .expect("mcp body");
            mcp.set_config_ref(Some(mcp_config));
            mcp.set_prompt_ref(Some(prompt));
        }
        session
            .steps_mut()
            .get_mut(b)
            .and_then(|step| step.as_response_mut())
            .expect("response body")
            .set_config_ref(Some(response_config));

        let llm_node = session.add_node(
            "Router",
            NodeData::Llm {
                config_ref: Some(mcp_config),
            },
        );
        let response_node = session.add_node(
            "Answer",
            NodeData::Response {
                config_ref: Some(response_config),
            },
        );

        assert!(session.remove_mcp_config(mcp_config));
        assert!(session.remove_response_config(response_config));
        assert!(session.remove_prompt(prompt));

        let mcp = session
            .workflow_step(a)
            .and_then(|step| step.as_mcp())
            .expect("mcp body");
        assert_eq!(mcp.config_ref(), None);
        assert_eq!(mcp.prompt_ref(), None);
        let response = session
            .workflow_step(b)
            .and_then(|step| step.as_response())
            .expect("response body");
        assert_eq!(response.config_ref(), None);
        assert_eq!(
            session.graph().node(llm_node).map(|n| n.data().clone()),
            Some(NodeData::Llm { config_ref: None })
        );
        assert_eq!(
            session.graph().node(response_node).map(|n| n.data().clone()),
            Some(NodeData::Response { config_ref: None })
        );
    }

    #[test]
    fn selection_cannot_point_at_a_missing_item() {
        let mut session = Session::new();
        assert!(!session.set_selection(ItemRef::Node(crate::model::NodeId::new(1))));
        assert_eq!(session.selection(), None);
    }
}
