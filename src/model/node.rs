// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{McpConfigId, ResponseConfigId, ToolId};

/// The type of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Query,
    Llm,
    Tool,
    Response,
    Condition,
}

impl NodeKind {
    /// Stable lower-case wire name used by snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Llm => "llm",
            Self::Tool => "tool",
            Self::Response => "response",
            Self::Condition => "condition",
        }
    }

    /// Capitalized name used in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Llm => "LLM",
            Self::Tool => "Tool",
            Self::Response => "Response",
            Self::Condition => "Condition",
        }
    }
}

/// Per-kind node payload.
///
/// Each variant carries exactly the fields valid for that node kind; a tool
/// node holding an LLM config reference is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Query { placeholder: Option<String> },
    Llm { config_ref: Option<McpConfigId> },
    Tool { tool_ref: Option<ToolId> },
    Response { config_ref: Option<ResponseConfigId> },
    Condition { expression: Option<String> },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Query { .. } => NodeKind::Query,
            Self::Llm { .. } => NodeKind::Llm,
            Self::Tool { .. } => NodeKind::Tool,
            Self::Response { .. } => NodeKind::Response,
            Self::Condition { .. } => NodeKind::Condition,
        }
    }

    /// Empty payload for `kind`, used when a node is first dropped onto the
    /// canvas.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Query => Self::Query { placeholder: None },
            NodeKind::Llm => Self::Llm { config_ref: None },
            NodeKind::Tool => Self::Tool { tool_ref: None },
            NodeKind::Response => Self::Response { config_ref: None },
            NodeKind::Condition => Self::Condition { expression: None },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    label: String,
    data: NodeData,
}

impl FlowNode {
    pub fn new(label: impl Into<String>, data: NodeData) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    /// Replaces the payload; the new payload must keep the node's kind.
    /// Returns false and leaves the node untouched on a kind change.
    pub fn set_data(&mut self, data: NodeData) -> bool {
        if data.kind() != self.data.kind() {
            return false;
        }
        self.data = data;
        true
    }
}
