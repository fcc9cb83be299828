// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation operations for pipeline sessions.
//!
//! Operations are applied with optimistic concurrency (revision checks) and
//! produce a minimal delta the UI can use to refresh derived state. A batch
//! is atomic: it runs against a scratch clone and the session is only
//! replaced when every op succeeds.

use std::collections::HashSet;
use std::fmt;

use crate::model::{
    DeploymentStatus, EdgeId, ErrorHandling, HeaderEntry, HttpMethod, ItemRef, McpConfigId,
    NodeData, NodeId, NodeKind, PromptId, QueryParam, ResponseConfigId, ResponseMode, Session,
    StepId, StepKind, ToolId,
};
use crate::rules;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Graph(GraphOp),
    Step(StepOp),
    Registry(RegistryOp),
    Select(SelectOp),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphOp {
    AddNode {
        label: String,
        data: NodeData,
    },
    UpdateNode {
        node_id: NodeId,
        patch: FlowNodePatch,
    },
    RemoveNode {
        node_id: NodeId,
    },
    AddEdge {
        source_node_id: NodeId,
        target_node_id: NodeId,
        label: Option<String>,
    },
    UpdateEdge {
        edge_id: EdgeId,
        patch: FlowEdgePatch,
    },
    RemoveEdge {
        edge_id: EdgeId,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowNodePatch {
    pub label: Option<String>,
    /// Whole-payload replacement; must keep the node's kind.
    pub data: Option<NodeData>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowEdgePatch {
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOp {
    AddStep {
        kind: StepKind,
        after: Option<StepId>,
    },
    UpdateMcpStep {
        step_id: StepId,
        patch: McpStepPatch,
    },
    UpdateResponseStep {
        step_id: StepId,
        patch: ResponseStepPatch,
    },
    SetMcpStepConfigRef {
        step_id: StepId,
        config_ref: Option<McpConfigId>,
    },
    SetMcpStepPromptRef {
        step_id: StepId,
        prompt_ref: Option<PromptId>,
    },
    SetResponseStepConfigRef {
        step_id: StepId,
        config_ref: Option<ResponseConfigId>,
    },
    SetResponseStepReprocessInstructions {
        step_id: StepId,
        instructions: Option<String>,
    },
    RemoveStep {
        step_id: StepId,
    },
    MoveStep {
        step_id: StepId,
        new_index: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpStepPatch {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    pub instruction: Option<String>,
    pub selected_tool_ids: Option<Vec<ToolId>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseStepPatch {
    pub mode: Option<ResponseMode>,
    pub error_handling: Option<ErrorHandling>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryOp {
    AddTool {
        name: String,
        method: HttpMethod,
        url: String,
    },
    UpdateTool {
        tool_id: ToolId,
        patch: ToolPatch,
    },
    RemoveTool {
        tool_id: ToolId,
    },
    AddMcpConfig {
        name: String,
    },
    UpdateMcpConfig {
        config_id: McpConfigId,
        patch: McpConfigPatch,
    },
    RemoveMcpConfig {
        config_id: McpConfigId,
    },
    AddResponseConfig {
        name: String,
    },
    UpdateResponseConfig {
        config_id: ResponseConfigId,
        patch: ResponseConfigPatch,
    },
    RemoveResponseConfig {
        config_id: ResponseConfigId,
    },
    AddPrompt {
        name: String,
        content: String,
    },
    UpdatePrompt {
        prompt_id: PromptId,
        patch: PromptPatch,
    },
    RemovePrompt {
        prompt_id: PromptId,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<Vec<HeaderEntry>>,
    pub query_params: Option<Vec<QueryParam>>,
    pub body_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct McpConfigPatch {
    pub name: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
    pub instruction: Option<String>,
    pub selected_tool_ids: Option<Vec<ToolId>>,
    pub deployment: Option<DeploymentStatus>,
    pub deployment_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseConfigPatch {
    pub name: Option<String>,
    pub mode: Option<ResponseMode>,
    pub reprocess_instructions: Option<String>,
    pub error_handling: Option<ErrorHandling>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOp {
    Set { item: ItemRef },
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

/// Minimal delta describing which items changed as the result of applying
/// ops, including cascade fallout (edges removed with a node, steps and
/// configs stripped of a deleted record's id).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ItemRef>,
    pub removed: Vec<ItemRef>,
    pub updated: Vec<ItemRef>,
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: HashSet<ItemRef>,
    removed: HashSet<ItemRef>,
    updated: HashSet<ItemRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, item: ItemRef) {
        self.removed.remove(&item);
        self.updated.remove(&item);
        self.added.insert(item);
    }

    fn record_removed(&mut self, item: ItemRef) {
        self.added.remove(&item);
        self.updated.remove(&item);
        self.removed.insert(item);
    }

    fn record_updated(&mut self, item: ItemRef) {
        if self.added.contains(&item) || self.removed.contains(&item) {
            return;
        }
        self.updated.insert(item);
    }

    fn finish(self) -> Delta {
        let mut added = self.added.into_iter().collect::<Vec<_>>();
        let mut removed = self.removed.into_iter().collect::<Vec<_>>();
        let mut updated = self.updated.into_iter().collect::<Vec<_>>();

        added.sort();
        removed.sort();
        updated.sort();

        Delta {
            added,
            removed,
            updated,
        }
    }
}

pub fn apply_ops(
    session: &mut Session,
    base_rev: u64,
    ops: &[Op],
) -> Result<ApplyResult, ApplyError> {
    let current_rev = session.rev();
    if base_rev != current_rev {
        return Err(ApplyError::Conflict {
            base_rev,
            current_rev,
        });
    }

    if ops.is_empty() {
        return Ok(ApplyResult {
            new_rev: current_rev,
            applied: 0,
            delta: Delta::default(),
        });
    }

    let mut scratch = session.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        match op {
            Op::Graph(graph_op) => apply_graph_op(&mut scratch, graph_op, &mut delta)?,
            Op::Step(step_op) => apply_step_op(&mut scratch, step_op, &mut delta)?,
            Op::Registry(registry_op) => apply_registry_op(&mut scratch, registry_op, &mut delta)?,
            Op::Select(select_op) => apply_select_op(&mut scratch, select_op)?,
        }
    }

    scratch.bump_rev();
    let new_rev = scratch.rev();
    *session = scratch;

    Ok(ApplyResult {
        new_rev,
        applied: ops.len(),
        delta: delta.finish(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyError {
    Conflict {
        base_rev: u64,
        current_rev: u64,
    },
    /// The op's target does not exist.
    NotFound {
        item: ItemRef,
    },
    /// A patch addressed a step or node of the wrong kind.
    PatchKindMismatch {
        item: ItemRef,
    },
    /// A field referenced a registry record that does not exist.
    MissingRecord {
        item: ItemRef,
    },
    /// The edge's type pair is not in the legal connection table; carries
    /// the user-facing explanation from the rule table.
    IllegalConnection {
        source: NodeKind,
        target: NodeKind,
        message: String,
    },
    IllegalStepInsertion {
        kind: StepKind,
        after: Option<StepId>,
    },
    IllegalStepMove {
        step_id: StepId,
        new_index: usize,
    },
    SelectionTargetMissing {
        item: ItemRef,
    },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict {
                base_rev,
                current_rev,
            } => {
                write!(
                    f,
                    "stale base_rev (base_rev={base_rev}, current_rev={current_rev})"
                )
            }
            Self::NotFound { item } => write!(f, "item not found ({item})"),
            Self::PatchKindMismatch { item } => {
                write!(f, "patch does not match the item's kind ({item})")
            }
            Self::MissingRecord { item } => {
                write!(f, "referenced record does not exist ({item})")
            }
            Self::IllegalConnection {
                source,
                target,
                message,
            } => {
                write!(
                    f,
                    "illegal connection {} -> {}: {message}",
                    source.as_str(),
                    target.as_str()
                )
            }
            Self::IllegalStepInsertion { kind, after } => match after {
                Some(after) => write!(
                    f,
                    "cannot insert a {} step after step {after}",
                    kind.as_str()
                ),
                None => write!(f, "cannot insert a {} step at the head", kind.as_str()),
            },
            Self::IllegalStepMove { step_id, new_index } => {
                write!(
                    f,
                    "moving step {step_id} to index {new_index} would break alternation"
                )
            }
            Self::SelectionTargetMissing { item } => {
                write!(f, "selection target does not exist ({item})")
            }
        }
    }
}

impl std::error::Error for ApplyError {}

// Extracted op-application implementation for graph/step/registry mutations.
include!("ops_impl.rs");
