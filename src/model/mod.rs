// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sessions own the two parallel pipeline representations (free-form flow
//! graph and linear step sequence) plus the registry of reusable records and
//! the selection pointer.

pub(crate) mod fixtures;
pub mod graph;
pub mod ids;
pub mod item_ref;
pub mod node;
pub mod records;
pub mod registry;
pub mod session;
pub mod step;

pub use graph::{FlowEdge, FlowGraph};
pub use ids::{
    EdgeId, Id, IdAllocator, McpConfigId, NodeId, PromptId, ResponseConfigId, StepId, ToolId,
};
pub use item_ref::ItemRef;
pub use node::{FlowNode, NodeData, NodeKind};
pub use records::{
    DeploymentStatus, ErrorHandling, HeaderEntry, HttpMethod, McpConfig, ParseRecordFieldError,
    Prompt, QueryParam, ResponseConfig, ResponseMode, Tool,
};
pub use registry::Registry;
pub use session::Session;
pub use step::{
    McpStep, ResponseStep, StepBody, StepKind, StepSequence, WorkflowStep, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
