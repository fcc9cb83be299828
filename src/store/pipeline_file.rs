// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{
    EdgeId, FlowEdge, FlowNode, HeaderEntry, ItemRef, McpConfig, McpConfigId, NodeData, NodeId,
    Prompt, PromptId, QueryParam, ResponseConfig, ResponseConfigId, Session, StepBody, StepId,
    Tool, ToolId, WorkflowStep,
};
use crate::model::records::{DeploymentStatus, ErrorHandling, HttpMethod, ResponseMode};
use crate::model::step::{McpStep, ResponseStep};

const SNAPSHOT_VERSION: u32 = 1;

/// One JSON document per pipeline under a root directory, keyed by an
/// external string id.
///
/// The snapshot is opaque to collaborators; the only contract is that every
/// session reachable through the public mutation surface round-trips
/// losslessly, including the id-allocator cursors, the revision and the
/// selection.
#[derive(Debug, Clone)]
pub struct PipelineStore {
    dir: PathBuf,
}

impl PipelineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves the document path for `pipeline_id`, rejecting ids that are
    /// not a clean path segment.
    pub fn pipeline_path(&self, pipeline_id: &str) -> Result<PathBuf, StoreError> {
        validate_pipeline_id(pipeline_id)?;
        Ok(self.dir.join(format!("{pipeline_id}.json")))
    }

    pub fn save(&self, pipeline_id: &str, session: &Session) -> Result<(), StoreError> {
        let path = self.pipeline_path(pipeline_id)?;
        let snapshot = snapshot_from_session(session);
        let json = serde_json::to_string_pretty(&snapshot).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic(&self.dir, &path, format!("{json}\n").as_bytes())
    }

    pub fn load(&self, pipeline_id: &str) -> Result<Session, StoreError> {
        let path = self.pipeline_path(pipeline_id)?;
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let snapshot: PipelineSnapshot =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        session_from_snapshot(&path, snapshot)
    }

    /// Ids of every stored pipeline, sorted. A missing root directory is an
    /// empty store, not an error.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_pipeline_id(stem).is_ok() {
                    ids.push(stem.to_owned());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Removes the stored pipeline; false when it did not exist.
    pub fn remove(&self, pipeline_id: &str) -> Result<bool, StoreError> {
        let path = self.pipeline_path(pipeline_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidPipelineId {
        pipeline_id: String,
    },
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
    },
    /// The document decoded but describes an impossible session (duplicate
    /// ids, references to undefined records, a counter behind a live id).
    Snapshot {
        path: PathBuf,
        message: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "json error at {}: {source}", path.display())
            }
            Self::InvalidPipelineId { pipeline_id } => {
                write!(f, "invalid pipeline id '{pipeline_id}'")
            }
            Self::UnsupportedVersion { path, found } => {
                write!(
                    f,
                    "unsupported snapshot version {found} at {} (expected {SNAPSHOT_VERSION})",
                    path.display()
                )
            }
            Self::Snapshot { path, message } => {
                write!(f, "malformed snapshot at {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn validate_pipeline_id(pipeline_id: &str) -> Result<(), StoreError> {
    let invalid = pipeline_id.is_empty()
        || pipeline_id == "."
        || pipeline_id == ".."
        || pipeline_id.contains(['/', '\\'])
        || pipeline_id.contains(char::is_control);
    if invalid {
        return Err(StoreError::InvalidPipelineId {
            pipeline_id: pipeline_id.to_owned(),
        });
    }
    Ok(())
}

fn write_atomic(dir: &Path, path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(
        ".proteus.tmp.{file_name}.{}.{nanos}",
        std::process::id()
    ));

    fs::write(&tmp_path, contents).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Snapshot document
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PipelineSnapshot {
    version: u32,
    rev: u64,
    next_object_id: u64,
    next_record_id: u64,
    nodes: Vec<NodeSnapshot>,
    edges: Vec<EdgeSnapshot>,
    steps: Vec<StepSnapshot>,
    tools: Vec<ToolSnapshot>,
    mcp_configs: Vec<McpConfigSnapshot>,
    response_configs: Vec<ResponseConfigSnapshot>,
    prompts: Vec<PromptSnapshot>,
    selection: Option<SelectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NodeSnapshot {
    id: u64,
    label: String,
    #[serde(flatten)]
    data: NodeDataSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum NodeDataSnapshot {
    Query { placeholder: Option<String> },
    Llm { config_ref: Option<u64> },
    Tool { tool_ref: Option<u64> },
    Response { config_ref: Option<u64> },
    Condition { expression: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct EdgeSnapshot {
    id: u64,
    source: u64,
    target: u64,
    label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StepSnapshot {
    Mcp {
        id: u64,
        config_ref: Option<u64>,
        prompt_ref: Option<u64>,
        model: String,
        temperature: f64,
        max_tokens: u32,
        system_prompt: String,
        instruction: String,
        selected_tool_ids: Vec<u64>,
    },
    Response {
        id: u64,
        config_ref: Option<u64>,
        mode: String,
        reprocess_instructions: Option<String>,
        error_handling: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ToolSnapshot {
    id: u64,
    name: String,
    description: Option<String>,
    method: String,
    url: String,
    headers: Vec<KeyValueSnapshot>,
    query_params: Vec<KeyValueSnapshot>,
    body_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KeyValueSnapshot {
    name: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct McpConfigSnapshot {
    id: u64,
    name: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    system_prompt: Option<String>,
    instruction: Option<String>,
    selected_tool_ids: Vec<u64>,
    deployment: String,
    deployment_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ResponseConfigSnapshot {
    id: u64,
    name: String,
    mode: String,
    reprocess_instructions: Option<String>,
    error_handling: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PromptSnapshot {
    id: u64,
    name: String,
    content: String,
    variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SelectionSnapshot {
    kind: String,
    id: u64,
}

fn snapshot_from_session(session: &Session) -> PipelineSnapshot {
    let nodes = session
        .graph()
        .nodes()
        .iter()
        .map(|(node_id, node)| NodeSnapshot {
            id: node_id.value(),
            label: node.label().to_owned(),
            data: match node.data() {
                NodeData::Query { placeholder } => NodeDataSnapshot::Query {
                    placeholder: placeholder.clone(),
                },
                NodeData::Llm { config_ref } => NodeDataSnapshot::Llm {
                    config_ref: config_ref.map(|id| id.value()),
                },
                NodeData::Tool { tool_ref } => NodeDataSnapshot::Tool {
                    tool_ref: tool_ref.map(|id| id.value()),
                },
                NodeData::Response { config_ref } => NodeDataSnapshot::Response {
                    config_ref: config_ref.map(|id| id.value()),
                },
                NodeData::Condition { expression } => NodeDataSnapshot::Condition {
                    expression: expression.clone(),
                },
            },
        })
        .collect();

    let edges = session
        .graph()
        .edges()
        .iter()
        .map(|(edge_id, edge)| EdgeSnapshot {
            id: edge_id.value(),
            source: edge.source_node_id().value(),
            target: edge.target_node_id().value(),
            label: edge.label().map(ToOwned::to_owned),
        })
        .collect();

    let steps = session
        .steps()
        .steps()
        .iter()
        .map(|step| match step.body() {
            StepBody::Mcp(mcp) => StepSnapshot::Mcp {
                id: step.step_id().value(),
                config_ref: mcp.config_ref().map(|id| id.value()),
                prompt_ref: mcp.prompt_ref().map(|id| id.value()),
                model: mcp.model().to_owned(),
                temperature: mcp.temperature(),
                max_tokens: mcp.max_tokens(),
                system_prompt: mcp.system_prompt().to_owned(),
                instruction: mcp.instruction().to_owned(),
                selected_tool_ids: mcp.selected_tool_ids().iter().map(|id| id.value()).collect(),
            },
            StepBody::Response(response) => StepSnapshot::Response {
                id: step.step_id().value(),
                config_ref: response.config_ref().map(|id| id.value()),
                mode: response.mode().as_str().to_owned(),
                reprocess_instructions: response.reprocess_instructions().map(ToOwned::to_owned),
                error_handling: response.error_handling().as_str().to_owned(),
            },
        })
        .collect();

    let tools = session
        .registry()
        .tools()
        .values()
        .map(|tool| ToolSnapshot {
            id: tool.tool_id().value(),
            name: tool.name().to_owned(),
            description: tool.description().map(ToOwned::to_owned),
            method: tool.method().as_str().to_owned(),
            url: tool.url().to_owned(),
            headers: tool
                .headers()
                .iter()
                .map(|header| KeyValueSnapshot {
                    name: header.name().to_owned(),
                    value: header.value().to_owned(),
                })
                .collect(),
            query_params: tool
                .query_params()
                .iter()
                .map(|param| KeyValueSnapshot {
                    name: param.name().to_owned(),
                    value: param.value().to_owned(),
                })
                .collect(),
            body_config: tool.body_config().cloned(),
        })
        .collect();

    let mcp_configs = session
        .registry()
        .mcp_configs()
        .values()
        .map(|config| McpConfigSnapshot {
            id: config.config_id().value(),
            name: config.name().to_owned(),
            model: config.model().to_owned(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
            system_prompt: config.system_prompt().map(ToOwned::to_owned),
            instruction: config.instruction().map(ToOwned::to_owned),
            selected_tool_ids: config
                .selected_tool_ids()
                .iter()
                .map(|id| id.value())
                .collect(),
            deployment: config.deployment().as_str().to_owned(),
            deployment_url: config.deployment_url().map(ToOwned::to_owned),
        })
        .collect();

    let response_configs = session
        .registry()
        .response_configs()
        .values()
        .map(|config| ResponseConfigSnapshot {
            id: config.config_id().value(),
            name: config.name().to_owned(),
            mode: config.mode().as_str().to_owned(),
            reprocess_instructions: config.reprocess_instructions().map(ToOwned::to_owned),
            error_handling: config.error_handling().as_str().to_owned(),
        })
        .collect();

    let prompts = session
        .registry()
        .prompts()
        .values()
        .map(|prompt| PromptSnapshot {
            id: prompt.prompt_id().value(),
            name: prompt.name().to_owned(),
            content: prompt.content().to_owned(),
            variables: prompt.variables().to_vec(),
        })
        .collect();

    let selection = session.selection().map(|item| {
        let (kind, id) = match item {
            ItemRef::Node(id) => ("node", id.value()),
            ItemRef::Edge(id) => ("edge", id.value()),
            ItemRef::Step(id) => ("step", id.value()),
            ItemRef::Tool(id) => ("tool", id.value()),
            ItemRef::McpConfig(id) => ("mcp-config", id.value()),
            ItemRef::ResponseConfig(id) => ("response-config", id.value()),
            ItemRef::Prompt(id) => ("prompt", id.value()),
        };
        SelectionSnapshot {
            kind: kind.to_owned(),
            id,
        }
    });

    PipelineSnapshot {
        version: SNAPSHOT_VERSION,
        rev: session.rev(),
        next_object_id: session.next_object_id_value(),
        next_record_id: session.registry().next_record_id_value(),
        nodes,
        edges,
        steps,
        tools,
        mcp_configs,
        response_configs,
        prompts,
        selection,
    }
}

fn snapshot_error(path: &Path, message: impl Into<String>) -> StoreError {
    StoreError::Snapshot {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    raw: &str,
) -> Result<T, StoreError>
where
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|err| snapshot_error(path, err.to_string()))
}

fn session_from_snapshot(path: &Path, snapshot: PipelineSnapshot) -> Result<Session, StoreError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: snapshot.version,
        });
    }

    let mut session = Session::new();
    let mut max_record_id = 0u64;
    let mut max_object_id = 0u64;

    // Registry first so node/step references can be validated against it.
    for tool in &snapshot.tools {
        let tool_id = ToolId::new(tool.id);
        if session.registry().tool(tool_id).is_some() {
            return Err(snapshot_error(path, format!("duplicate tool id {}", tool.id)));
        }
        let mut record = Tool::new(
            tool_id,
            tool.name.clone(),
            parse_field::<HttpMethod>(path, &tool.method)?,
            tool.url.clone(),
        );
        record.set_description(tool.description.clone());
        *record.headers_mut() = tool
            .headers
            .iter()
            .map(|header| HeaderEntry::new(header.name.clone(), header.value.clone()))
            .collect();
        *record.query_params_mut() = tool
            .query_params
            .iter()
            .map(|param| QueryParam::new(param.name.clone(), param.value.clone()))
            .collect();
        record.set_body_config(tool.body_config.clone());
        session.registry_mut().insert_tool_with_id(record);
        max_record_id = max_record_id.max(tool.id);
    }

    for config in &snapshot.mcp_configs {
        let config_id = McpConfigId::new(config.id);
        if session.registry().mcp_config(config_id).is_some() {
            return Err(snapshot_error(
                path,
                format!("duplicate mcp config id {}", config.id),
            ));
        }
        let mut record = McpConfig::new(config_id, config.name.clone());
        record.set_model(config.model.clone());
        record.set_temperature(config.temperature);
        record.set_max_tokens(config.max_tokens);
        record.set_system_prompt(config.system_prompt.clone());
        record.set_instruction(config.instruction.clone());
        for tool_id in &config.selected_tool_ids {
            let tool_id = ToolId::new(*tool_id);
            if session.registry().tool(tool_id).is_none() {
                return Err(snapshot_error(
                    path,
                    format!("mcp config {} references missing tool {tool_id}", config.id),
                ));
            }
            record.selected_tool_ids_mut().push(tool_id);
        }
        record.set_deployment(parse_field::<DeploymentStatus>(path, &config.deployment)?);
        record.set_deployment_url(config.deployment_url.clone());
        session.registry_mut().insert_mcp_config_with_id(record);
        max_record_id = max_record_id.max(config.id);
    }

    for config in &snapshot.response_configs {
        let config_id = ResponseConfigId::new(config.id);
        if session.registry().response_config(config_id).is_some() {
            return Err(snapshot_error(
                path,
                format!("duplicate response config id {}", config.id),
            ));
        }
        let mut record = ResponseConfig::new(config_id, config.name.clone());
        record.set_mode(parse_field::<ResponseMode>(path, &config.mode)?);
        record.set_reprocess_instructions(config.reprocess_instructions.clone());
        record.set_error_handling(parse_field::<ErrorHandling>(path, &config.error_handling)?);
        session.registry_mut().insert_response_config_with_id(record);
        max_record_id = max_record_id.max(config.id);
    }

    for prompt in &snapshot.prompts {
        let prompt_id = PromptId::new(prompt.id);
        if session.registry().prompt(prompt_id).is_some() {
            return Err(snapshot_error(
                path,
                format!("duplicate prompt id {}", prompt.id),
            ));
        }
        let mut record = Prompt::new(prompt_id, prompt.name.clone(), prompt.content.clone());
        *record.variables_mut() = prompt.variables.clone();
        session.registry_mut().insert_prompt_with_id(record);
        max_record_id = max_record_id.max(prompt.id);
    }

    for node in &snapshot.nodes {
        let node_id = NodeId::new(node.id);
        if session.graph().node(node_id).is_some() {
            return Err(snapshot_error(path, format!("duplicate node id {}", node.id)));
        }
        let data = match &node.data {
            NodeDataSnapshot::Query { placeholder } => NodeData::Query {
                placeholder: placeholder.clone(),
            },
            NodeDataSnapshot::Llm { config_ref } => {
                let config_ref = config_ref.map(McpConfigId::new);
                if let Some(config_id) = config_ref {
                    if session.registry().mcp_config(config_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("node {} references missing mcp config {config_id}", node.id),
                        ));
                    }
                }
                NodeData::Llm { config_ref }
            }
            NodeDataSnapshot::Tool { tool_ref } => {
                let tool_ref = tool_ref.map(ToolId::new);
                if let Some(tool_id) = tool_ref {
                    if session.registry().tool(tool_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("node {} references missing tool {tool_id}", node.id),
                        ));
                    }
                }
                NodeData::Tool { tool_ref }
            }
            NodeDataSnapshot::Response { config_ref } => {
                let config_ref = config_ref.map(ResponseConfigId::new);
                if let Some(config_id) = config_ref {
                    if session.registry().response_config(config_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!(
                                "node {} references missing response config {config_id}",
                                node.id
                            ),
                        ));
                    }
                }
                NodeData::Response { config_ref }
            }
            NodeDataSnapshot::Condition { expression } => NodeData::Condition {
                expression: expression.clone(),
            },
        };
        session
            .graph_mut()
            .nodes_mut()
            .insert(node_id, FlowNode::new(node.label.clone(), data));
        max_object_id = max_object_id.max(node.id);
    }

    // Edges may dangle (tolerated everywhere as no-ops), so endpoints are
    // not validated here.
    for edge in &snapshot.edges {
        let edge_id = EdgeId::new(edge.id);
        if session.graph().edge(edge_id).is_some() {
            return Err(snapshot_error(path, format!("duplicate edge id {}", edge.id)));
        }
        session.graph_mut().edges_mut().insert(
            edge_id,
            FlowEdge::new_with(
                NodeId::new(edge.source),
                NodeId::new(edge.target),
                edge.label.clone(),
            ),
        );
        max_object_id = max_object_id.max(edge.id);
    }

    for step in &snapshot.steps {
        let (step_id, body) = match step {
            StepSnapshot::Mcp {
                id,
                config_ref,
                prompt_ref,
                model,
                temperature,
                max_tokens,
                system_prompt,
                instruction,
                selected_tool_ids,
            } => {
                let mut mcp = McpStep::default();
                if let Some(config_id) = config_ref.map(McpConfigId::new) {
                    if session.registry().mcp_config(config_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("step {id} references missing mcp config {config_id}"),
                        ));
                    }
                    mcp.set_config_ref(Some(config_id));
                }
                if let Some(prompt_id) = prompt_ref.map(PromptId::new) {
                    if session.registry().prompt(prompt_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("step {id} references missing prompt {prompt_id}"),
                        ));
                    }
                    mcp.set_prompt_ref(Some(prompt_id));
                }
                mcp.set_model(model.clone());
                mcp.set_temperature(*temperature);
                mcp.set_max_tokens(*max_tokens);
                mcp.set_system_prompt(system_prompt.clone());
                mcp.set_instruction(instruction.clone());
                for tool_id in selected_tool_ids {
                    let tool_id = ToolId::new(*tool_id);
                    if session.registry().tool(tool_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("step {id} references missing tool {tool_id}"),
                        ));
                    }
                    mcp.selected_tool_ids_mut().push(tool_id);
                }
                (StepId::new(*id), StepBody::Mcp(mcp))
            }
            StepSnapshot::Response {
                id,
                config_ref,
                mode,
                reprocess_instructions,
                error_handling,
            } => {
                let mut response = ResponseStep::default();
                if let Some(config_id) = config_ref.map(ResponseConfigId::new) {
                    if session.registry().response_config(config_id).is_none() {
                        return Err(snapshot_error(
                            path,
                            format!("step {id} references missing response config {config_id}"),
                        ));
                    }
                    response.set_config_ref(Some(config_id));
                }
                response.set_mode(parse_field::<ResponseMode>(path, mode)?);
                response.set_reprocess_instructions(reprocess_instructions.clone());
                response.set_error_handling(parse_field::<ErrorHandling>(path, error_handling)?);
                (StepId::new(*id), StepBody::Response(response))
            }
        };

        if session.steps().get(step_id).is_some() {
            return Err(snapshot_error(
                path,
                format!("duplicate step id {step_id}"),
            ));
        }
        session
            .steps_mut()
            .steps_mut()
            .push(WorkflowStep::new(step_id, body));
        max_object_id = max_object_id.max(step_id.value());
    }

    if !session.steps().is_alternating() {
        return Err(snapshot_error(
            path,
            "step list does not start with an mcp step or does not alternate",
        ));
    }

    if snapshot.next_object_id <= max_object_id {
        return Err(snapshot_error(
            path,
            format!(
                "object id counter {} is behind live id {max_object_id}",
                snapshot.next_object_id
            ),
        ));
    }
    if snapshot.next_record_id <= max_record_id {
        return Err(snapshot_error(
            path,
            format!(
                "record id counter {} is behind live id {max_record_id}",
                snapshot.next_record_id
            ),
        ));
    }
    session.restore_allocator(snapshot.next_object_id);
    session
        .registry_mut()
        .restore_allocator(snapshot.next_record_id);

    if let Some(selection) = &snapshot.selection {
        let item = match selection.kind.as_str() {
            "node" => ItemRef::Node(NodeId::new(selection.id)),
            "edge" => ItemRef::Edge(EdgeId::new(selection.id)),
            "step" => ItemRef::Step(StepId::new(selection.id)),
            "tool" => ItemRef::Tool(ToolId::new(selection.id)),
            "mcp-config" => ItemRef::McpConfig(McpConfigId::new(selection.id)),
            "response-config" => ItemRef::ResponseConfig(ResponseConfigId::new(selection.id)),
            "prompt" => ItemRef::Prompt(PromptId::new(selection.id)),
            other => {
                return Err(snapshot_error(
                    path,
                    format!("unknown selection kind '{other}'"),
                ))
            }
        };
        if !session.set_selection(item) {
            return Err(snapshot_error(
                path,
                format!("selection points at missing item {item}"),
            ));
        }
    }

    session.set_rev(snapshot.rev);
    Ok(session)
}

#[cfg(test)]
mod tests;
