// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Deployment manifest generation.
//!
//! A deployed MCP serves each selected tool as a function declaration in the
//! Responses API shape: `{"type": "function", "name", "description",
//! "parameters"}`. The parameter schema is derived from the tool definition:
//! URL `{placeholder}` segments and query-parameter rows without a static
//! value become required string inputs the model must supply.

use serde_json::{json, Map, Value};

use crate::model::{McpConfigId, Session, Tool};

/// The function declaration a deployed MCP serves for `tool`.
pub fn tool_function_declaration(tool: &Tool) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for name in tool.url_path_params() {
        if properties.contains_key(&name) {
            continue;
        }
        properties.insert(
            name.clone(),
            json!({
                "type": "string",
                "description": format!("Value for the '{{{name}}}' segment of the request URL"),
            }),
        );
        required.push(Value::String(name));
    }

    for param in tool.query_params() {
        if !param.is_runtime_input() || properties.contains_key(param.name()) {
            continue;
        }
        properties.insert(
            param.name().to_owned(),
            json!({
                "type": "string",
                "description": format!("Value for the '{}' query parameter", param.name()),
            }),
        );
        required.push(Value::String(param.name().to_owned()));
    }

    json!({
        "type": "function",
        "name": tool.name(),
        "description": tool.description().unwrap_or(""),
        "parameters": {
            "type": "object",
            "properties": Value::Object(properties),
            "required": required,
            "additionalProperties": false,
        },
    })
}

/// The deployable manifest for a saved MCP config: model settings plus the
/// resolved declarations of its selected tools. Returns None when the config
/// does not exist.
pub fn mcp_manifest(session: &Session, config_id: McpConfigId) -> Option<Value> {
    let config = session.registry().mcp_config(config_id)?;
    let tools = config
        .selected_tool_ids()
        .iter()
        .filter_map(|tool_id| session.registry().tool(*tool_id))
        .map(tool_function_declaration)
        .collect::<Vec<_>>();

    Some(json!({
        "name": config.name(),
        "model": config.model(),
        "temperature": config.temperature(),
        "max_tokens": config.max_tokens(),
        "system_prompt": config.system_prompt().unwrap_or(""),
        "instruction": config.instruction().unwrap_or(""),
        "tools": tools,
    }))
}

#[cfg(test)]
mod tests {
    use super::{mcp_manifest, tool_function_declaration};
    use crate::model::records::{HttpMethod, QueryParam};
    use crate::model::{McpConfigId, Session, Tool, ToolId};

    fn forecast_tool() -> Tool {
        let mut tool = Tool::new(
            ToolId::new(1),
            "get_forecast",
            HttpMethod::Get,
            "https://api.example.com/{region}/forecast",
        );
        tool.set_description(Some("Fetch the forecast for a region."));
        tool.query_params_mut()
            .push(QueryParam::new("units", "metric"));
        tool.query_params_mut().push(QueryParam::new("day", ""));
        tool
    }

    #[test]
    fn declaration_requires_path_and_runtime_query_params() {
        let declaration = tool_function_declaration(&forecast_tool());

        assert_eq!(declaration["type"], "function");
        assert_eq!(declaration["name"], "get_forecast");
        assert_eq!(declaration["description"], "Fetch the forecast for a region.");

        let parameters = &declaration["parameters"];
        assert_eq!(parameters["type"], "object");
        assert!(parameters["properties"]["region"].is_object());
        assert!(parameters["properties"]["day"].is_object());
        // Static query params stay out of the schema.
        assert!(parameters["properties"]["units"].is_null());
        assert_eq!(
            parameters["required"],
            serde_json::json!(["region", "day"])
        );
    }

    #[test]
    fn manifest_resolves_selected_tools_from_the_registry() {
        let mut session = Session::new();
        let tool_id = session.registry_mut().add_tool(
            "get_forecast",
            HttpMethod::Get,
            "https://api.example.com/{region}/forecast",
        );
        let config_id = session.registry_mut().add_mcp_config("Weather");
        session
            .registry_mut()
            .mcp_config_mut(config_id)
            .expect("config")
            .selected_tool_ids_mut()
            .push(tool_id);

        let manifest = mcp_manifest(&session, config_id).expect("manifest");
        assert_eq!(manifest["name"], "Weather");
        assert_eq!(manifest["model"], "gpt-4o-mini");
        assert_eq!(manifest["tools"].as_array().map(Vec::len), Some(1));
        assert_eq!(manifest["tools"][0]["name"], "get_forecast");
    }

    #[test]
    fn manifest_for_a_missing_config_is_none() {
        let session = Session::new();
        assert!(mcp_manifest(&session, McpConfigId::new(9)).is_none());
    }
}
