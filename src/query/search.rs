// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use regex::RegexBuilder;

use crate::model::{ItemRef, Registry};

/// Minimum rapidfuzz ratio (0..100) for a fuzzy hit.
const FUZZY_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSearchMode {
    Substring,
    Regex,
    Fuzzy,
}

/// Searches all registry records by name.
///
/// Hits are returned grouped by record family (tools, MCP configs, response
/// configs, prompts) in id order within each family, so identical input
/// always yields the identical hit list.
pub fn search_registry(
    registry: &Registry,
    needle: &str,
    mode: RecordSearchMode,
    case_insensitive: bool,
) -> Result<Vec<ItemRef>, regex::Error> {
    let matcher = NameMatcher::new(needle, mode, case_insensitive)?;

    let mut hits = Vec::new();
    for (tool_id, tool) in registry.tools() {
        if matcher.matches(tool.name()) {
            hits.push(ItemRef::Tool(*tool_id));
        }
    }
    for (config_id, config) in registry.mcp_configs() {
        if matcher.matches(config.name()) {
            hits.push(ItemRef::McpConfig(*config_id));
        }
    }
    for (config_id, config) in registry.response_configs() {
        if matcher.matches(config.name()) {
            hits.push(ItemRef::ResponseConfig(*config_id));
        }
    }
    for (prompt_id, prompt) in registry.prompts() {
        if matcher.matches(prompt.name()) {
            hits.push(ItemRef::Prompt(*prompt_id));
        }
    }
    Ok(hits)
}

enum NameMatcher {
    Substring {
        needle: String,
        case_insensitive: bool,
    },
    Regex(regex::Regex),
    Fuzzy {
        needle: String,
        case_insensitive: bool,
    },
}

impl NameMatcher {
    fn new(
        needle: &str,
        mode: RecordSearchMode,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        match mode {
            RecordSearchMode::Substring => Ok(Self::Substring {
                needle: normalize(needle, case_insensitive),
                case_insensitive,
            }),
            RecordSearchMode::Regex => {
                let regex = RegexBuilder::new(needle)
                    .case_insensitive(case_insensitive)
                    .build()?;
                Ok(Self::Regex(regex))
            }
            RecordSearchMode::Fuzzy => Ok(Self::Fuzzy {
                needle: normalize(needle, case_insensitive),
                case_insensitive,
            }),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Substring {
                needle,
                case_insensitive,
            } => normalize(name, *case_insensitive).contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(name),
            Self::Fuzzy {
                needle,
                case_insensitive,
            } => {
                if needle.is_empty() {
                    return false;
                }
                let haystack = normalize(name, *case_insensitive);
                rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars()) * 100.0 >= FUZZY_THRESHOLD
            }
        }
    }
}

fn normalize(value: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        value.to_lowercase()
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{search_registry, RecordSearchMode};
    use crate::model::{ItemRef, Registry};
    use crate::model::records::HttpMethod;

    fn fixture_registry() -> Registry {
        let mut registry = Registry::default();
        registry.add_tool(
            "get_weather",
            HttpMethod::Get,
            "https://api.example.com/weather",
        );
        registry.add_tool(
            "get_stock_quote",
            HttpMethod::Get,
            "https://api.example.com/quote",
        );
        registry.add_mcp_config("Weather assistant");
        registry.add_response_config("Raw weather output");
        registry.add_prompt("weather-summary", "Summarize the forecast.");
        registry
    }

    #[test]
    fn substring_search_spans_all_record_families_in_order() {
        let registry = fixture_registry();
        let hits = search_registry(&registry, "weather", RecordSearchMode::Substring, true)
            .expect("search");
        assert_eq!(
            hits,
            vec![
                ItemRef::Tool(crate::model::ToolId::new(1)),
                ItemRef::McpConfig(crate::model::McpConfigId::new(3)),
                ItemRef::ResponseConfig(crate::model::ResponseConfigId::new(4)),
                ItemRef::Prompt(crate::model::PromptId::new(5)),
            ]
        );
    }

    #[test]
    fn substring_search_respects_case_sensitivity() {
        let registry = fixture_registry();
        let hits = search_registry(&registry, "Weather", RecordSearchMode::Substring, false)
            .expect("search");
        assert_eq!(
            hits,
            vec![ItemRef::McpConfig(crate::model::McpConfigId::new(3))]
        );
    }

    #[test]
    fn regex_mode_matches_anchored_patterns() {
        let registry = fixture_registry();
        let hits =
            search_registry(&registry, "^get_", RecordSearchMode::Regex, true).expect("search");
        assert_eq!(
            hits,
            vec![
                ItemRef::Tool(crate::model::ToolId::new(1)),
                ItemRef::Tool(crate::model::ToolId::new(2)),
            ]
        );
    }

    #[test]
    fn regex_mode_surfaces_compile_errors() {
        let registry = fixture_registry();
        let err = search_registry(&registry, "(", RecordSearchMode::Regex, true)
            .expect_err("expected regex compile error");
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn fuzzy_mode_tolerates_typos() {
        let registry = fixture_registry();
        let hits = search_registry(&registry, "get_wether", RecordSearchMode::Fuzzy, true)
            .expect("search");
        assert!(hits.contains(&ItemRef::Tool(crate::model::ToolId::new(1))));
        assert!(!hits.contains(&ItemRef::Prompt(crate::model::PromptId::new(5))));
    }

    #[test]
    fn empty_fuzzy_needle_matches_nothing() {
        let registry = fixture_registry();
        let hits =
            search_registry(&registry, "", RecordSearchMode::Fuzzy, true).expect("search");
        assert!(hits.is_empty());
    }
}
