// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reusable registry records: tools, MCP configs, response configs, prompts.
//!
//! Records are referenced by id from graph nodes and workflow steps, never
//! owned by them; the cascading deletes on `Session` keep those references
//! alive-or-absent.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use super::ids::{McpConfigId, PromptId, ResponseConfigId, ToolId};
use super::step::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Error for enum fields parsed from their wire names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecordFieldError {
    field: &'static str,
    value: String,
}

impl ParseRecordFieldError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseRecordFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value '{}'", self.field, self.value)
    }
}

impl std::error::Error for ParseRecordFieldError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ParseRecordFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(ParseRecordFieldError::new("http method", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseMode {
    RawOutput,
    LlmReprocess,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RawOutput => "raw-output",
            Self::LlmReprocess => "llm-reprocess",
        }
    }
}

impl FromStr for ResponseMode {
    type Err = ParseRecordFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw-output" => Ok(Self::RawOutput),
            "llm-reprocess" => Ok(Self::LlmReprocess),
            other => Err(ParseRecordFieldError::new("response mode", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorHandling {
    PassThrough,
    Retry,
    Fallback,
}

impl ErrorHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::Retry => "retry",
            Self::Fallback => "fallback",
        }
    }
}

impl FromStr for ErrorHandling {
    type Err = ParseRecordFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass-through" => Ok(Self::PassThrough),
            "retry" => Ok(Self::Retry),
            "fallback" => Ok(Self::Fallback),
            other => Err(ParseRecordFieldError::new("error handling", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeploymentStatus {
    NotDeployed,
    Deploying,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotDeployed => "not-deployed",
            Self::Deploying => "deploying",
            Self::Deployed => "deployed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for DeploymentStatus {
    type Err = ParseRecordFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not-deployed" => Ok(Self::NotDeployed),
            "deploying" => Ok(Self::Deploying),
            "deployed" => Ok(Self::Deployed),
            "failed" => Ok(Self::Failed),
            other => Err(ParseRecordFieldError::new("deployment status", other)),
        }
    }
}

/// A static header row on a tool definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    name: String,
    value: String,
}

impl HeaderEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A query parameter row on a tool definition.
///
/// A row with an empty value is a runtime input the model must supply; a row
/// with a value is sent as-is on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    name: String,
    value: String,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_runtime_input(&self) -> bool {
        self.value.is_empty()
    }
}

/// A reusable external API call definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    tool_id: ToolId,
    name: String,
    description: Option<String>,
    method: HttpMethod,
    url: String,
    headers: Vec<HeaderEntry>,
    query_params: Vec<QueryParam>,
    body_config: Option<serde_json::Value>,
}

impl Tool {
    pub fn new(
        tool_id: ToolId,
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> Self {
        Self {
            tool_id,
            name: name.into(),
            description: None,
            method,
            url: url.into(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body_config: None,
        }
    }

    pub fn tool_id(&self) -> ToolId {
        self.tool_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description<T: Into<String>>(&mut self, description: Option<T>) {
        self.description = description.map(Into::into);
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn headers(&self) -> &[HeaderEntry] {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Vec<HeaderEntry> {
        &mut self.headers
    }

    pub fn query_params(&self) -> &[QueryParam] {
        &self.query_params
    }

    pub fn query_params_mut(&mut self) -> &mut Vec<QueryParam> {
        &mut self.query_params
    }

    pub fn body_config(&self) -> Option<&serde_json::Value> {
        self.body_config.as_ref()
    }

    pub fn set_body_config(&mut self, body_config: Option<serde_json::Value>) {
        self.body_config = body_config;
    }

    /// Names of `{placeholder}` segments in the URL, in order of appearance.
    /// These become required runtime inputs in the exported declaration.
    pub fn url_path_params(&self) -> Vec<String> {
        let Ok(pattern) = Regex::new(r"\{([A-Za-z0-9_]+)\}") else {
            return Vec::new();
        };
        pattern
            .captures_iter(&self.url)
            .map(|captures| captures[1].to_owned())
            .collect()
    }
}

/// A saved LLM decision-step configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct McpConfig {
    config_id: McpConfigId,
    name: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    system_prompt: Option<String>,
    instruction: Option<String>,
    selected_tool_ids: Vec<ToolId>,
    deployment: DeploymentStatus,
    deployment_url: Option<String>,
}

impl McpConfig {
    pub fn new(config_id: McpConfigId, name: impl Into<String>) -> Self {
        Self {
            config_id,
            name: name.into(),
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: None,
            instruction: None,
            selected_tool_ids: Vec::new(),
            deployment: DeploymentStatus::NotDeployed,
            deployment_url: None,
        }
    }

    pub fn config_id(&self) -> McpConfigId {
        self.config_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.max_tokens = max_tokens;
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn set_system_prompt<T: Into<String>>(&mut self, system_prompt: Option<T>) {
        self.system_prompt = system_prompt.map(Into::into);
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn set_instruction<T: Into<String>>(&mut self, instruction: Option<T>) {
        self.instruction = instruction.map(Into::into);
    }

    pub fn selected_tool_ids(&self) -> &[ToolId] {
        &self.selected_tool_ids
    }

    pub fn selected_tool_ids_mut(&mut self) -> &mut Vec<ToolId> {
        &mut self.selected_tool_ids
    }

    pub fn deployment(&self) -> DeploymentStatus {
        self.deployment
    }

    pub fn set_deployment(&mut self, deployment: DeploymentStatus) {
        self.deployment = deployment;
    }

    pub fn deployment_url(&self) -> Option<&str> {
        self.deployment_url.as_deref()
    }

    pub fn set_deployment_url<T: Into<String>>(&mut self, deployment_url: Option<T>) {
        self.deployment_url = deployment_url.map(Into::into);
    }
}

/// A saved response-shaping configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseConfig {
    config_id: ResponseConfigId,
    name: String,
    mode: ResponseMode,
    reprocess_instructions: Option<String>,
    error_handling: ErrorHandling,
}

impl ResponseConfig {
    pub fn new(config_id: ResponseConfigId, name: impl Into<String>) -> Self {
        Self {
            config_id,
            name: name.into(),
            mode: ResponseMode::RawOutput,
            reprocess_instructions: None,
            error_handling: ErrorHandling::PassThrough,
        }
    }

    pub fn config_id(&self) -> ResponseConfigId {
        self.config_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ResponseMode) {
        self.mode = mode;
    }

    pub fn reprocess_instructions(&self) -> Option<&str> {
        self.reprocess_instructions.as_deref()
    }

    pub fn set_reprocess_instructions<T: Into<String>>(&mut self, instructions: Option<T>) {
        self.reprocess_instructions = instructions.map(Into::into);
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    pub fn set_error_handling(&mut self, error_handling: ErrorHandling) {
        self.error_handling = error_handling;
    }
}

/// A reusable instruction template referenced by MCP steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    prompt_id: PromptId,
    name: String,
    content: String,
    variables: Vec<String>,
}

impl Prompt {
    pub fn new(prompt_id: PromptId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            prompt_id,
            name: name.into(),
            content: content.into(),
            variables: Vec::new(),
        }
    }

    pub fn prompt_id(&self) -> PromptId {
        self.prompt_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Vec<String> {
        &mut self.variables
    }
}
