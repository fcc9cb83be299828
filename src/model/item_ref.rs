// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::ids::{EdgeId, McpConfigId, NodeId, PromptId, ResponseConfigId, StepId, ToolId};

/// A typed pointer to any addressable item in a session.
///
/// Shared by the ops layer (delta vocabulary) and the UI-facing selection
/// pointer. The derived ordering (variant order, then id) gives deltas a
/// stable sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemRef {
    Node(NodeId),
    Edge(EdgeId),
    Step(StepId),
    Tool(ToolId),
    McpConfig(McpConfigId),
    ResponseConfig(ResponseConfigId),
    Prompt(PromptId),
}

impl ItemRef {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::Edge(_) => "edge",
            Self::Step(_) => "step",
            Self::Tool(_) => "tool",
            Self::McpConfig(_) => "mcp-config",
            Self::ResponseConfig(_) => "response-config",
            Self::Prompt(_) => "prompt",
        }
    }

    fn id_value(&self) -> u64 {
        match self {
            Self::Node(id) => id.value(),
            Self::Edge(id) => id.value(),
            Self::Step(id) => id.value(),
            Self::Tool(id) => id.value(),
            Self::McpConfig(id) => id.value(),
            Self::ResponseConfig(id) => id.value(),
            Self::Prompt(id) => id.value(),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind_str(), self.id_value())
    }
}
