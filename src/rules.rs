// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The static connection rule table.
//!
//! A pipeline flows query -> llm -> (tool ->)? response; these pure lookups
//! are the single source of truth for which edges are legal and which
//! connections each node kind must have. The message strings are shown to
//! the user verbatim and are pinned by tests.

use crate::model::NodeKind;

/// Which neighbor kinds a node kind accepts, and whether at least one
/// connection on that side is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredConnections {
    incoming: &'static [NodeKind],
    outgoing: &'static [NodeKind],
    requires_incoming: bool,
    requires_outgoing: bool,
}

impl RequiredConnections {
    pub fn incoming(&self) -> &'static [NodeKind] {
        self.incoming
    }

    pub fn outgoing(&self) -> &'static [NodeKind] {
        self.outgoing
    }

    pub fn requires_incoming(&self) -> bool {
        self.requires_incoming
    }

    pub fn requires_outgoing(&self) -> bool {
        self.requires_outgoing
    }
}

/// True exactly for the four legal source/target pairs.
pub fn can_connect(source: NodeKind, target: NodeKind) -> bool {
    matches!(
        (source, target),
        (NodeKind::Query, NodeKind::Llm)
            | (NodeKind::Llm, NodeKind::Response)
            | (NodeKind::Llm, NodeKind::Tool)
            | (NodeKind::Tool, NodeKind::Response)
    )
}

/// The per-kind degree requirements evaluated by the flow validator.
pub fn required_connections(kind: NodeKind) -> RequiredConnections {
    match kind {
        NodeKind::Query => RequiredConnections {
            incoming: &[],
            outgoing: &[NodeKind::Llm],
            requires_incoming: false,
            requires_outgoing: true,
        },
        NodeKind::Llm => RequiredConnections {
            incoming: &[NodeKind::Query],
            outgoing: &[NodeKind::Tool, NodeKind::Response],
            requires_incoming: true,
            requires_outgoing: true,
        },
        NodeKind::Tool => RequiredConnections {
            incoming: &[NodeKind::Llm],
            outgoing: &[NodeKind::Response],
            requires_incoming: true,
            requires_outgoing: true,
        },
        NodeKind::Response => RequiredConnections {
            incoming: &[NodeKind::Llm, NodeKind::Tool],
            outgoing: &[],
            requires_incoming: true,
            requires_outgoing: false,
        },
        NodeKind::Condition => RequiredConnections {
            incoming: &[],
            outgoing: &[],
            requires_incoming: false,
            requires_outgoing: false,
        },
    }
}

/// Human-readable explanation for a source/target pair rejected by
/// [`can_connect`], one distinct message per rule category.
pub fn connection_error_message(source: NodeKind, target: NodeKind) -> String {
    match source {
        NodeKind::Response => "Response nodes cannot have outgoing connections.".to_owned(),
        NodeKind::Query if target != NodeKind::Llm => {
            "Query nodes can only connect to LLM nodes.".to_owned()
        }
        NodeKind::Llm if !matches!(target, NodeKind::Tool | NodeKind::Response) => {
            "LLM nodes can only connect to Tool or Response nodes.".to_owned()
        }
        NodeKind::Tool if target != NodeKind::Response => {
            "Tool nodes can only connect to Response nodes.".to_owned()
        }
        _ => "These node types cannot be connected.".to_owned(),
    }
}
