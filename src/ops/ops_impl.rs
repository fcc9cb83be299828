// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Graph/step/registry op-application helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn check_node_data_refs(session: &Session, data: &NodeData) -> Result<(), ApplyError> {
    match data {
        NodeData::Llm {
            config_ref: Some(config_id),
        } if session.registry().mcp_config(*config_id).is_none() => Err(ApplyError::MissingRecord {
            item: ItemRef::McpConfig(*config_id),
        }),
        NodeData::Tool {
            tool_ref: Some(tool_id),
        } if session.registry().tool(*tool_id).is_none() => Err(ApplyError::MissingRecord {
            item: ItemRef::Tool(*tool_id),
        }),
        NodeData::Response {
            config_ref: Some(config_id),
        } if session.registry().response_config(*config_id).is_none() => {
            Err(ApplyError::MissingRecord {
                item: ItemRef::ResponseConfig(*config_id),
            })
        }
        _ => Ok(()),
    }
}

fn check_tool_ids_exist(session: &Session, tool_ids: &[ToolId]) -> Result<(), ApplyError> {
    for tool_id in tool_ids {
        if session.registry().tool(*tool_id).is_none() {
            return Err(ApplyError::MissingRecord {
                item: ItemRef::Tool(*tool_id),
            });
        }
    }
    Ok(())
}

fn apply_graph_op(
    session: &mut Session,
    op: &GraphOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        GraphOp::AddNode { label, data } => {
            check_node_data_refs(session, data)?;
            let node_id = session.add_node(label.clone(), data.clone());
            delta.record_added(ItemRef::Node(node_id));
            Ok(())
        }
        GraphOp::UpdateNode { node_id, patch } => {
            if session.graph().node(*node_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Node(*node_id),
                });
            }
            if let Some(data) = &patch.data {
                check_node_data_refs(session, data)?;
            }

            let node = session
                .graph_mut()
                .nodes_mut()
                .get_mut(node_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::Node(*node_id),
                })?;
            if let Some(data) = &patch.data {
                if !node.set_data(data.clone()) {
                    return Err(ApplyError::PatchKindMismatch {
                        item: ItemRef::Node(*node_id),
                    });
                }
            }
            if let Some(label) = &patch.label {
                node.set_label(label.clone());
            }
            delta.record_updated(ItemRef::Node(*node_id));
            Ok(())
        }
        GraphOp::RemoveNode { node_id } => {
            if session.graph().node(*node_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Node(*node_id),
                });
            }
            let incident = session.graph().incident_edge_ids(*node_id);
            session.remove_node(*node_id);
            for edge_id in incident {
                delta.record_removed(ItemRef::Edge(edge_id));
            }
            delta.record_removed(ItemRef::Node(*node_id));
            Ok(())
        }
        GraphOp::AddEdge {
            source_node_id,
            target_node_id,
            label,
        } => {
            let source = session.graph().node(*source_node_id).ok_or(ApplyError::NotFound {
                item: ItemRef::Node(*source_node_id),
            })?;
            let target = session.graph().node(*target_node_id).ok_or(ApplyError::NotFound {
                item: ItemRef::Node(*target_node_id),
            })?;
            let (source_kind, target_kind) = (source.kind(), target.kind());
            if !rules::can_connect(source_kind, target_kind) {
                return Err(ApplyError::IllegalConnection {
                    source: source_kind,
                    target: target_kind,
                    message: rules::connection_error_message(source_kind, target_kind),
                });
            }

            let edge_id = session
                .add_edge_with(*source_node_id, *target_node_id, label.clone())
                .ok_or(ApplyError::IllegalConnection {
                    source: source_kind,
                    target: target_kind,
                    message: rules::connection_error_message(source_kind, target_kind),
                })?;
            delta.record_added(ItemRef::Edge(edge_id));
            Ok(())
        }
        GraphOp::UpdateEdge { edge_id, patch } => {
            let edge = session
                .graph_mut()
                .edges_mut()
                .get_mut(edge_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::Edge(*edge_id),
                })?;
            if let Some(label) = &patch.label {
                edge.set_label(Some(label.clone()));
            }
            delta.record_updated(ItemRef::Edge(*edge_id));
            Ok(())
        }
        GraphOp::RemoveEdge { edge_id } => {
            if !session.remove_edge(*edge_id) {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Edge(*edge_id),
                });
            }
            delta.record_removed(ItemRef::Edge(*edge_id));
            Ok(())
        }
    }
}

fn require_step(session: &Session, step_id: StepId) -> Result<(), ApplyError> {
    if session.steps().get(step_id).is_none() {
        return Err(ApplyError::NotFound {
            item: ItemRef::Step(step_id),
        });
    }
    Ok(())
}

fn mcp_step_mut<'a>(
    session: &'a mut Session,
    step_id: StepId,
) -> Result<&'a mut crate::model::McpStep, ApplyError> {
    require_step(session, step_id)?;
    session
        .steps_mut()
        .get_mut(step_id)
        .and_then(|step| step.as_mcp_mut())
        .ok_or(ApplyError::PatchKindMismatch {
            item: ItemRef::Step(step_id),
        })
}

fn response_step_mut<'a>(
    session: &'a mut Session,
    step_id: StepId,
) -> Result<&'a mut crate::model::ResponseStep, ApplyError> {
    require_step(session, step_id)?;
    session
        .steps_mut()
        .get_mut(step_id)
        .and_then(|step| step.as_response_mut())
        .ok_or(ApplyError::PatchKindMismatch {
            item: ItemRef::Step(step_id),
        })
}

fn apply_step_op(
    session: &mut Session,
    op: &StepOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        StepOp::AddStep { kind, after } => {
            let step_id = session.add_workflow_step(*kind, *after).ok_or(
                ApplyError::IllegalStepInsertion {
                    kind: *kind,
                    after: *after,
                },
            )?;
            delta.record_added(ItemRef::Step(step_id));
            Ok(())
        }
        StepOp::UpdateMcpStep { step_id, patch } => {
            if let Some(tool_ids) = &patch.selected_tool_ids {
                check_tool_ids_exist(session, tool_ids)?;
            }
            let mcp = mcp_step_mut(session, *step_id)?;
            if let Some(model) = &patch.model {
                mcp.set_model(model.clone());
            }
            if let Some(temperature) = patch.temperature {
                mcp.set_temperature(temperature);
            }
            if let Some(max_tokens) = patch.max_tokens {
                mcp.set_max_tokens(max_tokens);
            }
            if let Some(system_prompt) = &patch.system_prompt {
                mcp.set_system_prompt(system_prompt.clone());
            }
            if let Some(instruction) = &patch.instruction {
                mcp.set_instruction(instruction.clone());
            }
            if let Some(tool_ids) = &patch.selected_tool_ids {
                *mcp.selected_tool_ids_mut() = tool_ids.clone();
            }
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::UpdateResponseStep { step_id, patch } => {
            let response = response_step_mut(session, *step_id)?;
            if let Some(mode) = patch.mode {
                response.set_mode(mode);
            }
            if let Some(error_handling) = patch.error_handling {
                response.set_error_handling(error_handling);
            }
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::SetMcpStepConfigRef { step_id, config_ref } => {
            if let Some(config_id) = config_ref {
                if session.registry().mcp_config(*config_id).is_none() {
                    return Err(ApplyError::MissingRecord {
                        item: ItemRef::McpConfig(*config_id),
                    });
                }
            }
            mcp_step_mut(session, *step_id)?.set_config_ref(*config_ref);
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::SetMcpStepPromptRef { step_id, prompt_ref } => {
            if let Some(prompt_id) = prompt_ref {
                if session.registry().prompt(*prompt_id).is_none() {
                    return Err(ApplyError::MissingRecord {
                        item: ItemRef::Prompt(*prompt_id),
                    });
                }
            }
            mcp_step_mut(session, *step_id)?.set_prompt_ref(*prompt_ref);
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::SetResponseStepConfigRef { step_id, config_ref } => {
            if let Some(config_id) = config_ref {
                if session.registry().response_config(*config_id).is_none() {
                    return Err(ApplyError::MissingRecord {
                        item: ItemRef::ResponseConfig(*config_id),
                    });
                }
            }
            response_step_mut(session, *step_id)?.set_config_ref(*config_ref);
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::SetResponseStepReprocessInstructions {
            step_id,
            instructions,
        } => {
            response_step_mut(session, *step_id)?
                .set_reprocess_instructions(instructions.clone());
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::RemoveStep { step_id } => {
            if !session.delete_workflow_step(*step_id) {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Step(*step_id),
                });
            }
            delta.record_removed(ItemRef::Step(*step_id));
            Ok(())
        }
        StepOp::MoveStep { step_id, new_index } => {
            require_step(session, *step_id)?;
            if !session.move_workflow_step(*step_id, *new_index) {
                return Err(ApplyError::IllegalStepMove {
                    step_id: *step_id,
                    new_index: *new_index,
                });
            }
            delta.record_updated(ItemRef::Step(*step_id));
            Ok(())
        }
    }
}

fn record_tool_reference_fallout(session: &Session, tool_id: ToolId, delta: &mut DeltaBuilder) {
    for step in session.steps().steps() {
        if let Some(mcp) = step.as_mcp() {
            if mcp.selected_tool_ids().contains(&tool_id) {
                delta.record_updated(ItemRef::Step(step.step_id()));
            }
        }
    }
    for (config_id, config) in session.registry().mcp_configs() {
        if config.selected_tool_ids().contains(&tool_id) {
            delta.record_updated(ItemRef::McpConfig(*config_id));
        }
    }
    for (node_id, node) in session.graph().nodes() {
        if node.data() == (&NodeData::Tool { tool_ref: Some(tool_id) }) {
            delta.record_updated(ItemRef::Node(*node_id));
        }
    }
}

fn apply_registry_op(
    session: &mut Session,
    op: &RegistryOp,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        RegistryOp::AddTool { name, method, url } => {
            let tool_id = session
                .registry_mut()
                .add_tool(name.clone(), *method, url.clone());
            delta.record_added(ItemRef::Tool(tool_id));
            Ok(())
        }
        RegistryOp::UpdateTool { tool_id, patch } => {
            let tool = session
                .registry_mut()
                .tool_mut(*tool_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::Tool(*tool_id),
                })?;
            if let Some(name) = &patch.name {
                tool.set_name(name.clone());
            }
            if let Some(description) = &patch.description {
                tool.set_description(Some(description.clone()));
            }
            if let Some(method) = patch.method {
                tool.set_method(method);
            }
            if let Some(url) = &patch.url {
                tool.set_url(url.clone());
            }
            if let Some(headers) = &patch.headers {
                *tool.headers_mut() = headers.clone();
            }
            if let Some(query_params) = &patch.query_params {
                *tool.query_params_mut() = query_params.clone();
            }
            if let Some(body_config) = &patch.body_config {
                tool.set_body_config(Some(body_config.clone()));
            }
            delta.record_updated(ItemRef::Tool(*tool_id));
            Ok(())
        }
        RegistryOp::RemoveTool { tool_id } => {
            if session.registry().tool(*tool_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Tool(*tool_id),
                });
            }
            record_tool_reference_fallout(session, *tool_id, delta);
            session.remove_tool(*tool_id);
            delta.record_removed(ItemRef::Tool(*tool_id));
            Ok(())
        }
        RegistryOp::AddMcpConfig { name } => {
            let config_id = session.registry_mut().add_mcp_config(name.clone());
            delta.record_added(ItemRef::McpConfig(config_id));
            Ok(())
        }
        RegistryOp::UpdateMcpConfig { config_id, patch } => {
            if let Some(tool_ids) = &patch.selected_tool_ids {
                check_tool_ids_exist(session, tool_ids)?;
            }
            let config = session
                .registry_mut()
                .mcp_config_mut(*config_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::McpConfig(*config_id),
                })?;
            if let Some(name) = &patch.name {
                config.set_name(name.clone());
            }
            if let Some(model) = &patch.model {
                config.set_model(model.clone());
            }
            if let Some(temperature) = patch.temperature {
                config.set_temperature(temperature);
            }
            if let Some(max_tokens) = patch.max_tokens {
                config.set_max_tokens(max_tokens);
            }
            if let Some(system_prompt) = &patch.system_prompt {
                config.set_system_prompt(Some(system_prompt.clone()));
            }
            if let Some(instruction) = &patch.instruction {
                config.set_instruction(Some(instruction.clone()));
            }
            if let Some(tool_ids) = &patch.selected_tool_ids {
                *config.selected_tool_ids_mut() = tool_ids.clone();
            }
            if let Some(deployment) = patch.deployment {
                config.set_deployment(deployment);
            }
            if let Some(deployment_url) = &patch.deployment_url {
                config.set_deployment_url(Some(deployment_url.clone()));
            }
            delta.record_updated(ItemRef::McpConfig(*config_id));
            Ok(())
        }
        RegistryOp::RemoveMcpConfig { config_id } => {
            if session.registry().mcp_config(*config_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::McpConfig(*config_id),
                });
            }
            for step in session.steps().steps() {
                if step.as_mcp().map(|mcp| mcp.config_ref()) == Some(Some(*config_id)) {
                    delta.record_updated(ItemRef::Step(step.step_id()));
                }
            }
            for (node_id, node) in session.graph().nodes() {
                if node.data() == (&NodeData::Llm { config_ref: Some(*config_id) }) {
                    delta.record_updated(ItemRef::Node(*node_id));
                }
            }
            session.remove_mcp_config(*config_id);
            delta.record_removed(ItemRef::McpConfig(*config_id));
            Ok(())
        }
        RegistryOp::AddResponseConfig { name } => {
            let config_id = session.registry_mut().add_response_config(name.clone());
            delta.record_added(ItemRef::ResponseConfig(config_id));
            Ok(())
        }
        RegistryOp::UpdateResponseConfig { config_id, patch } => {
            let config = session
                .registry_mut()
                .response_config_mut(*config_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::ResponseConfig(*config_id),
                })?;
            if let Some(name) = &patch.name {
                config.set_name(name.clone());
            }
            if let Some(mode) = patch.mode {
                config.set_mode(mode);
            }
            if let Some(instructions) = &patch.reprocess_instructions {
                config.set_reprocess_instructions(Some(instructions.clone()));
            }
            if let Some(error_handling) = patch.error_handling {
                config.set_error_handling(error_handling);
            }
            delta.record_updated(ItemRef::ResponseConfig(*config_id));
            Ok(())
        }
        RegistryOp::RemoveResponseConfig { config_id } => {
            if session.registry().response_config(*config_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::ResponseConfig(*config_id),
                });
            }
            for step in session.steps().steps() {
                if step.as_response().map(|r| r.config_ref()) == Some(Some(*config_id)) {
                    delta.record_updated(ItemRef::Step(step.step_id()));
                }
            }
            for (node_id, node) in session.graph().nodes() {
                if node.data() == (&NodeData::Response { config_ref: Some(*config_id) }) {
                    delta.record_updated(ItemRef::Node(*node_id));
                }
            }
            session.remove_response_config(*config_id);
            delta.record_removed(ItemRef::ResponseConfig(*config_id));
            Ok(())
        }
        RegistryOp::AddPrompt { name, content } => {
            let prompt_id = session
                .registry_mut()
                .add_prompt(name.clone(), content.clone());
            delta.record_added(ItemRef::Prompt(prompt_id));
            Ok(())
        }
        RegistryOp::UpdatePrompt { prompt_id, patch } => {
            let prompt = session
                .registry_mut()
                .prompt_mut(*prompt_id)
                .ok_or(ApplyError::NotFound {
                    item: ItemRef::Prompt(*prompt_id),
                })?;
            if let Some(name) = &patch.name {
                prompt.set_name(name.clone());
            }
            if let Some(content) = &patch.content {
                prompt.set_content(content.clone());
            }
            if let Some(variables) = &patch.variables {
                *prompt.variables_mut() = variables.clone();
            }
            delta.record_updated(ItemRef::Prompt(*prompt_id));
            Ok(())
        }
        RegistryOp::RemovePrompt { prompt_id } => {
            if session.registry().prompt(*prompt_id).is_none() {
                return Err(ApplyError::NotFound {
                    item: ItemRef::Prompt(*prompt_id),
                });
            }
            for step in session.steps().steps() {
                if step.as_mcp().map(|mcp| mcp.prompt_ref()) == Some(Some(*prompt_id)) {
                    delta.record_updated(ItemRef::Step(step.step_id()));
                }
            }
            session.remove_prompt(*prompt_id);
            delta.record_removed(ItemRef::Prompt(*prompt_id));
            Ok(())
        }
    }
}

fn apply_select_op(session: &mut Session, op: &SelectOp) -> Result<(), ApplyError> {
    match op {
        SelectOp::Set { item } => {
            if !session.set_selection(*item) {
                return Err(ApplyError::SelectionTargetMissing { item: *item });
            }
            Ok(())
        }
        SelectOp::Clear => {
            session.clear_selection();
            Ok(())
        }
    }
}
