// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rstest::{fixture, rstest};

use super::{PipelineStore, StoreError};
use crate::model::{ItemRef, NodeData, NodeKind, Session, StepKind};
use crate::model::records::{HttpMethod, QueryParam};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!(
            "proteus-{prefix}-{}-{nanos}-{counter}",
            std::process::id()
        ));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

struct PipelineStoreTestCtx {
    _tmp: TempDir,
    store: PipelineStore,
}

impl PipelineStoreTestCtx {
    fn new(prefix: &str) -> Self {
        let tmp = TempDir::new(prefix);
        let store = PipelineStore::new(tmp.path().join("pipelines"));
        Self { _tmp: tmp, store }
    }
}

#[fixture]
fn ctx() -> PipelineStoreTestCtx {
    PipelineStoreTestCtx::new("pipeline-store")
}

/// A session exercising every record family, both step kinds, the graph and
/// the selection.
fn populated_session() -> Session {
    let mut session = Session::new();

    let tool_id = session.registry_mut().add_tool(
        "get_forecast",
        HttpMethod::Get,
        "https://api.example.com/{region}/forecast",
    );
    session
        .registry_mut()
        .tool_mut(tool_id)
        .unwrap()
        .query_params_mut()
        .push(QueryParam::new("day", ""));
    let config_id = session.registry_mut().add_mcp_config("Weather");
    session
        .registry_mut()
        .mcp_config_mut(config_id)
        .unwrap()
        .selected_tool_ids_mut()
        .push(tool_id);
    let response_config_id = session.registry_mut().add_response_config("Raw");
    let prompt_id = session
        .registry_mut()
        .add_prompt("route", "Route the user's question.");

    let query = session.add_node("User Query", NodeData::empty(NodeKind::Query));
    let llm = session.add_node(
        "Router",
        NodeData::Llm {
            config_ref: Some(config_id),
        },
    );
    let tool_node = session.add_node(
        "Forecast",
        NodeData::Tool {
            tool_ref: Some(tool_id),
        },
    );
    let response = session.add_node(
        "Answer",
        NodeData::Response {
            config_ref: Some(response_config_id),
        },
    );
    session.add_edge(query, llm).unwrap();
    session.add_edge(llm, tool_node).unwrap();
    session.add_edge(tool_node, response).unwrap();

    let mcp_step = session.add_workflow_step(StepKind::Mcp, None).unwrap();
    let response_step = session
        .add_workflow_step(StepKind::Response, Some(mcp_step))
        .unwrap();
    {
        let mcp = session
            .steps_mut()
            .get_mut(mcp_step)
            .and_then(|step| step.as_mcp_mut())
            .unwrap();
        mcp.set_config_ref(Some(config_id));
        mcp.set_prompt_ref(Some(prompt_id));
        mcp.selected_tool_ids_mut().push(tool_id);
        mcp.set_instruction("Route the query.");
    }
    session
        .steps_mut()
        .get_mut(response_step)
        .and_then(|step| step.as_response_mut())
        .unwrap()
        .set_config_ref(Some(response_config_id));

    assert!(session.set_selection(ItemRef::Step(mcp_step)));
    session
}

#[rstest]
fn save_then_load_round_trips_losslessly(ctx: PipelineStoreTestCtx) {
    let session = populated_session();
    ctx.store.save("weather-bot", &session).unwrap();

    let loaded = ctx.store.load("weather-bot").unwrap();
    assert_eq!(loaded, session);
}

#[rstest]
fn ids_allocated_after_a_load_never_collide(ctx: PipelineStoreTestCtx) {
    let mut session = populated_session();
    ctx.store.save("weather-bot", &session).unwrap();
    let mut loaded = ctx.store.load("weather-bot").unwrap();

    let fresh_in_original = session.add_node("New", NodeData::empty(NodeKind::Condition));
    let fresh_in_loaded = loaded.add_node("New", NodeData::empty(NodeKind::Condition));
    assert_eq!(fresh_in_original, fresh_in_loaded);
    assert!(loaded.graph().nodes().len() > 1);

    let fresh_record = loaded.registry_mut().add_mcp_config("Another");
    assert!(loaded.registry().mcp_config(fresh_record).is_some());
}

#[rstest]
fn save_rejects_path_traversal_ids(ctx: PipelineStoreTestCtx) {
    let session = Session::new();
    for bad in ["", ".", "..", "a/b", "a\\b"] {
        let err = ctx.store.save(bad, &session).unwrap_err();
        match err {
            StoreError::InvalidPipelineId { pipeline_id } => assert_eq!(pipeline_id, bad),
            other => panic!("expected InvalidPipelineId, got: {other:?}"),
        }
    }
}

#[rstest]
fn load_rejects_unsupported_versions(ctx: PipelineStoreTestCtx) {
    let session = Session::new();
    ctx.store.save("p1", &session).unwrap();

    let path = ctx.store.pipeline_path("p1").unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    let bumped = raw.replacen("\"version\": 1", "\"version\": 99", 1);
    assert_ne!(raw, bumped);
    std::fs::write(&path, bumped).unwrap();

    let err = ctx.store.load("p1").unwrap_err();
    match err {
        StoreError::UnsupportedVersion { found, .. } => assert_eq!(found, 99),
        other => panic!("expected UnsupportedVersion, got: {other:?}"),
    }
}

#[rstest]
fn load_rejects_a_snapshot_with_a_dangling_tool_reference(ctx: PipelineStoreTestCtx) {
    let path = ctx.store.pipeline_path("broken").unwrap();
    std::fs::create_dir_all(ctx.store.dir()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "version": 1,
  "rev": 0,
  "next_object_id": 2,
  "next_record_id": 1,
  "nodes": [],
  "edges": [],
  "steps": [
    {
      "type": "mcp",
      "id": 1,
      "config_ref": null,
      "prompt_ref": null,
      "model": "gpt-4o-mini",
      "temperature": 0.7,
      "max_tokens": 1000,
      "system_prompt": "",
      "instruction": "",
      "selected_tool_ids": [42]
    }
  ],
  "tools": [],
  "mcp_configs": [],
  "response_configs": [],
  "prompts": [],
  "selection": null
}"#,
    )
    .unwrap();

    let err = ctx.store.load("broken").unwrap_err();
    match err {
        StoreError::Snapshot { message, .. } => {
            assert!(message.contains("missing tool"), "message: {message}")
        }
        other => panic!("expected Snapshot, got: {other:?}"),
    }
}

#[rstest]
fn load_rejects_an_id_counter_behind_a_live_id(ctx: PipelineStoreTestCtx) {
    let path = ctx.store.pipeline_path("stale-counter").unwrap();
    std::fs::create_dir_all(ctx.store.dir()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "version": 1,
  "rev": 3,
  "next_object_id": 1,
  "next_record_id": 1,
  "nodes": [
    { "id": 5, "label": "Q", "kind": "query", "placeholder": null }
  ],
  "edges": [],
  "steps": [],
  "tools": [],
  "mcp_configs": [],
  "response_configs": [],
  "prompts": [],
  "selection": null
}"#,
    )
    .unwrap();

    let err = ctx.store.load("stale-counter").unwrap_err();
    match err {
        StoreError::Snapshot { message, .. } => {
            assert!(message.contains("counter"), "message: {message}")
        }
        other => panic!("expected Snapshot, got: {other:?}"),
    }
}

#[rstest]
fn load_rejects_a_non_alternating_step_list(ctx: PipelineStoreTestCtx) {
    let path = ctx.store.pipeline_path("bad-steps").unwrap();
    std::fs::create_dir_all(ctx.store.dir()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "version": 1,
  "rev": 0,
  "next_object_id": 2,
  "next_record_id": 1,
  "nodes": [],
  "edges": [],
  "steps": [
    {
      "type": "response",
      "id": 1,
      "config_ref": null,
      "mode": "raw-output",
      "reprocess_instructions": null,
      "error_handling": "pass-through"
    }
  ],
  "tools": [],
  "mcp_configs": [],
  "response_configs": [],
  "prompts": [],
  "selection": null
}"#,
    )
    .unwrap();

    let err = ctx.store.load("bad-steps").unwrap_err();
    match err {
        StoreError::Snapshot { message, .. } => {
            assert!(message.contains("alternate"), "message: {message}")
        }
        other => panic!("expected Snapshot, got: {other:?}"),
    }
}

#[rstest]
fn load_tolerates_dangling_edges(ctx: PipelineStoreTestCtx) {
    let path = ctx.store.pipeline_path("dangling").unwrap();
    std::fs::create_dir_all(ctx.store.dir()).unwrap();
    std::fs::write(
        &path,
        r#"{
  "version": 1,
  "rev": 0,
  "next_object_id": 3,
  "next_record_id": 1,
  "nodes": [],
  "edges": [
    { "id": 2, "source": 7, "target": 8, "label": null }
  ],
  "steps": [],
  "tools": [],
  "mcp_configs": [],
  "response_configs": [],
  "prompts": [],
  "selection": null
}"#,
    )
    .unwrap();

    let session = ctx.store.load("dangling").unwrap();
    assert_eq!(session.graph().edges().len(), 1);
    let validation = crate::query::validate_flow(session.graph());
    assert!(validation.valid);
}

#[rstest]
fn list_returns_sorted_ids_and_remove_deletes(ctx: PipelineStoreTestCtx) {
    assert_eq!(ctx.store.list().unwrap(), Vec::<String>::new());

    let session = Session::new();
    ctx.store.save("zeta", &session).unwrap();
    ctx.store.save("alpha", &session).unwrap();
    assert_eq!(ctx.store.list().unwrap(), vec!["alpha", "zeta"]);

    assert!(ctx.store.remove("zeta").unwrap());
    assert!(!ctx.store.remove("zeta").unwrap());
    assert_eq!(ctx.store.list().unwrap(), vec!["alpha"]);
}

#[rstest]
fn a_failed_overwrite_cannot_truncate_the_previous_snapshot(ctx: PipelineStoreTestCtx) {
    let session = populated_session();
    ctx.store.save("stable", &session).unwrap();

    // Overwrite with a newer state and confirm the document is replaced
    // whole (the temp-then-rename write never leaves a partial file).
    let mut newer = session.clone();
    newer.add_node("Extra", NodeData::empty(NodeKind::Condition));
    ctx.store.save("stable", &newer).unwrap();

    let loaded = ctx.store.load("stable").unwrap();
    assert_eq!(loaded, newer);
}
