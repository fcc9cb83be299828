// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use proteus::model::{NodeData, NodeKind, Session, StepKind};
use proteus::model::records::HttpMethod;

/// Layered fan-out parameters for synthetic flows.
#[derive(Debug, Clone, Copy)]
pub struct FlowParams {
    /// Number of llm/tool fan-out stages.
    pub stages: usize,
    /// Tool nodes per stage.
    pub tools_per_stage: usize,
}

impl FlowParams {
    pub fn new(stages: usize, tools_per_stage: usize) -> Self {
        Self {
            stages,
            tools_per_stage,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn params(self) -> FlowParams {
        match self {
            Self::Small => FlowParams::new(1, 3),
            Self::Medium => FlowParams::new(4, 8),
            Self::Large => FlowParams::new(16, 16),
        }
    }
}

/// A structurally valid session: one query, `stages` router/answer pairs and
/// `tools_per_stage` tools fanned out per stage.
pub fn flow_session(params: FlowParams) -> Session {
    let mut session = Session::new();
    let query = session.add_node("User Query", NodeData::empty(NodeKind::Query));

    for stage in 0..params.stages {
        let llm = session.add_node(format!("Router {stage}"), NodeData::empty(NodeKind::Llm));
        let response =
            session.add_node(format!("Answer {stage}"), NodeData::empty(NodeKind::Response));
        session.add_edge(query, llm).expect("query -> llm");
        session.add_edge(llm, response).expect("llm -> response");

        for tool in 0..params.tools_per_stage {
            let tool_node = session.add_node(
                format!("Tool {stage}:{tool}"),
                NodeData::empty(NodeKind::Tool),
            );
            session.add_edge(llm, tool_node).expect("llm -> tool");
            session
                .add_edge(tool_node, response)
                .expect("tool -> response");
        }
    }

    session
}

pub fn case_session(case: Case) -> Session {
    flow_session(case.params())
}

/// A session with a populated registry and an alternating step chain, for
/// op-application benchmarks.
pub fn step_session(pairs: usize) -> Session {
    let mut session = Session::new();
    for index in 0..8 {
        session.registry_mut().add_tool(
            format!("tool_{index}"),
            HttpMethod::Get,
            format!("https://api.example.com/t/{index}"),
        );
    }

    let mut after = None;
    for _ in 0..pairs {
        let mcp = session
            .add_workflow_step(StepKind::Mcp, after)
            .expect("mcp step");
        let response = session
            .add_workflow_step(StepKind::Response, Some(mcp))
            .expect("response step");
        after = Some(response);
    }
    session
}
