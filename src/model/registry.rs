// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::ids::{IdAllocator, McpConfigId, PromptId, ResponseConfigId, ToolId};
use super::records::{HttpMethod, McpConfig, Prompt, ResponseConfig, Tool};

/// Id-keyed tables of reusable records plus their id source.
///
/// The registry owns its own allocator so record ids are scoped to the
/// session instance. Raw removals are crate-private: deleting a record goes
/// through `Session`, which performs the mandatory reference cascade in the
/// same operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Registry {
    tools: BTreeMap<ToolId, Tool>,
    mcp_configs: BTreeMap<McpConfigId, McpConfig>,
    response_configs: BTreeMap<ResponseConfigId, ResponseConfig>,
    prompts: BTreeMap<PromptId, Prompt>,
    ids: IdAllocator,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tool(
        &mut self,
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> ToolId {
        let tool_id = self.ids.allocate();
        self.tools.insert(tool_id, Tool::new(tool_id, name, method, url));
        tool_id
    }

    pub fn add_mcp_config(&mut self, name: impl Into<String>) -> McpConfigId {
        let config_id = self.ids.allocate();
        self.mcp_configs
            .insert(config_id, McpConfig::new(config_id, name));
        config_id
    }

    pub fn add_response_config(&mut self, name: impl Into<String>) -> ResponseConfigId {
        let config_id = self.ids.allocate();
        self.response_configs
            .insert(config_id, ResponseConfig::new(config_id, name));
        config_id
    }

    pub fn add_prompt(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> PromptId {
        let prompt_id = self.ids.allocate();
        self.prompts
            .insert(prompt_id, Prompt::new(prompt_id, name, content));
        prompt_id
    }

    pub fn tool(&self, tool_id: ToolId) -> Option<&Tool> {
        self.tools.get(&tool_id)
    }

    pub fn tool_mut(&mut self, tool_id: ToolId) -> Option<&mut Tool> {
        self.tools.get_mut(&tool_id)
    }

    pub fn tools(&self) -> &BTreeMap<ToolId, Tool> {
        &self.tools
    }

    pub fn mcp_config(&self, config_id: McpConfigId) -> Option<&McpConfig> {
        self.mcp_configs.get(&config_id)
    }

    pub fn mcp_config_mut(&mut self, config_id: McpConfigId) -> Option<&mut McpConfig> {
        self.mcp_configs.get_mut(&config_id)
    }

    pub fn mcp_configs(&self) -> &BTreeMap<McpConfigId, McpConfig> {
        &self.mcp_configs
    }

    pub(crate) fn mcp_configs_mut(&mut self) -> &mut BTreeMap<McpConfigId, McpConfig> {
        &mut self.mcp_configs
    }

    pub fn response_config(&self, config_id: ResponseConfigId) -> Option<&ResponseConfig> {
        self.response_configs.get(&config_id)
    }

    pub fn response_config_mut(
        &mut self,
        config_id: ResponseConfigId,
    ) -> Option<&mut ResponseConfig> {
        self.response_configs.get_mut(&config_id)
    }

    pub fn response_configs(&self) -> &BTreeMap<ResponseConfigId, ResponseConfig> {
        &self.response_configs
    }

    pub fn prompt(&self, prompt_id: PromptId) -> Option<&Prompt> {
        self.prompts.get(&prompt_id)
    }

    pub fn prompt_mut(&mut self, prompt_id: PromptId) -> Option<&mut Prompt> {
        self.prompts.get_mut(&prompt_id)
    }

    pub fn prompts(&self) -> &BTreeMap<PromptId, Prompt> {
        &self.prompts
    }

    pub(crate) fn remove_tool_record(&mut self, tool_id: ToolId) -> Option<Tool> {
        self.tools.remove(&tool_id)
    }

    pub(crate) fn remove_mcp_config_record(&mut self, config_id: McpConfigId) -> Option<McpConfig> {
        self.mcp_configs.remove(&config_id)
    }

    pub(crate) fn remove_response_config_record(
        &mut self,
        config_id: ResponseConfigId,
    ) -> Option<ResponseConfig> {
        self.response_configs.remove(&config_id)
    }

    pub(crate) fn remove_prompt_record(&mut self, prompt_id: PromptId) -> Option<Prompt> {
        self.prompts.remove(&prompt_id)
    }

    pub(crate) fn next_record_id_value(&self) -> u64 {
        self.ids.next_value()
    }

    pub(crate) fn restore_allocator(&mut self, next: u64) {
        self.ids = IdAllocator::resume_at(next);
    }

    pub(crate) fn insert_tool_with_id(&mut self, tool: Tool) {
        self.tools.insert(tool.tool_id(), tool);
    }

    pub(crate) fn insert_mcp_config_with_id(&mut self, config: McpConfig) {
        self.mcp_configs.insert(config.config_id(), config);
    }

    pub(crate) fn insert_response_config_with_id(&mut self, config: ResponseConfig) {
        self.response_configs.insert(config.config_id(), config);
    }

    pub(crate) fn insert_prompt_with_id(&mut self, prompt: Prompt) {
        self.prompts.insert(prompt.prompt_id(), prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::model::records::HttpMethod;

    #[test]
    fn adds_allocate_distinct_ids_from_one_cursor() {
        let mut registry = Registry::new();
        let tool = registry.add_tool("get_quote", HttpMethod::Get, "https://api.example.com/q");
        let config = registry.add_mcp_config("Quotes");
        let response = registry.add_response_config("Raw");
        let prompt = registry.add_prompt("Summarize", "Summarize the result.");

        assert_eq!(tool.value(), 1);
        assert_eq!(config.value(), 2);
        assert_eq!(response.value(), 3);
        assert_eq!(prompt.value(), 4);

        assert_eq!(registry.tool(tool).map(|t| t.name()), Some("get_quote"));
        assert_eq!(registry.mcp_config(config).map(|c| c.name()), Some("Quotes"));
        assert_eq!(
            registry.response_config(response).map(|c| c.name()),
            Some("Raw")
        );
        assert_eq!(
            registry.prompt(prompt).map(|p| p.content()),
            Some("Summarize the result.")
        );
    }

    #[test]
    fn lookups_for_missing_ids_return_none() {
        let registry = Registry::new();
        assert!(registry.tool(crate::model::ToolId::new(1)).is_none());
        assert!(registry
            .mcp_config(crate::model::McpConfigId::new(1))
            .is_none());
    }
}
