// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::ids::{McpConfigId, PromptId, ResponseConfigId, StepId, ToolId};
use super::records::{ErrorHandling, ResponseMode};

/// The type of a workflow step in the simplified builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKind {
    Mcp,
    Response,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::Response => "response",
        }
    }
}

/// Model name a fresh MCP step starts with.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Sampling temperature a fresh MCP step starts with.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Token budget a fresh MCP step starts with.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Payload of an `mcp` step: the language-model decision point, optionally
/// backed by a saved config and a saved prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct McpStep {
    config_ref: Option<McpConfigId>,
    prompt_ref: Option<PromptId>,
    model: String,
    temperature: f64,
    max_tokens: u32,
    system_prompt: String,
    instruction: String,
    selected_tool_ids: Vec<ToolId>,
}

impl Default for McpStep {
    fn default() -> Self {
        Self {
            config_ref: None,
            prompt_ref: None,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: String::new(),
            instruction: String::new(),
            selected_tool_ids: Vec::new(),
        }
    }
}

impl McpStep {
    pub fn config_ref(&self) -> Option<McpConfigId> {
        self.config_ref
    }

    pub fn set_config_ref(&mut self, config_ref: Option<McpConfigId>) {
        self.config_ref = config_ref;
    }

    pub fn prompt_ref(&self) -> Option<PromptId> {
        self.prompt_ref
    }

    pub fn set_prompt_ref(&mut self, prompt_ref: Option<PromptId>) {
        self.prompt_ref = prompt_ref;
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

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn set_system_prompt(&mut self, system_prompt: impl Into<String>) {
        self.system_prompt = system_prompt.into();
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn set_instruction(&mut self, instruction: impl Into<String>) {
        self.instruction = instruction.into();
    }

    pub fn selected_tool_ids(&self) -> &[ToolId] {
        &self.selected_tool_ids
    }

    pub fn selected_tool_ids_mut(&mut self) -> &mut Vec<ToolId> {
        &mut self.selected_tool_ids
    }
}

/// Payload of a `response` step: how the final answer is shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStep {
    config_ref: Option<ResponseConfigId>,
    mode: ResponseMode,
    reprocess_instructions: Option<String>,
    error_handling: ErrorHandling,
}

impl Default for ResponseStep {
    fn default() -> Self {
        Self {
            config_ref: None,
            mode: ResponseMode::RawOutput,
            reprocess_instructions: None,
            error_handling: ErrorHandling::PassThrough,
        }
    }
}

impl ResponseStep {
    pub fn config_ref(&self) -> Option<ResponseConfigId> {
        self.config_ref
    }

    pub fn set_config_ref(&mut self, config_ref: Option<ResponseConfigId>) {
        self.config_ref = config_ref;
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

#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    Mcp(McpStep),
    Response(ResponseStep),
}

impl StepBody {
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Mcp(_) => StepKind::Mcp,
            Self::Response(_) => StepKind::Response,
        }
    }

    /// Fresh body with the defaults for `kind`.
    pub fn with_defaults(kind: StepKind) -> Self {
        match kind {
            StepKind::Mcp => Self::Mcp(McpStep::default()),
            StepKind::Response => Self::Response(ResponseStep::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStep {
    step_id: StepId,
    body: StepBody,
}

impl WorkflowStep {
    pub fn new(step_id: StepId, body: StepBody) -> Self {
        Self { step_id, body }
    }

    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    pub fn kind(&self) -> StepKind {
        self.body.kind()
    }

    pub fn body(&self) -> &StepBody {
        &self.body
    }

    pub(crate) fn body_mut(&mut self) -> &mut StepBody {
        &mut self.body
    }

    pub fn as_mcp(&self) -> Option<&McpStep> {
        match &self.body {
            StepBody::Mcp(step) => Some(step),
            StepBody::Response(_) => None,
        }
    }

    pub(crate) fn as_mcp_mut(&mut self) -> Option<&mut McpStep> {
        match &mut self.body {
            StepBody::Mcp(step) => Some(step),
            StepBody::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseStep> {
        match &self.body {
            StepBody::Response(step) => Some(step),
            StepBody::Mcp(_) => None,
        }
    }

    pub(crate) fn as_response_mut(&mut self) -> Option<&mut ResponseStep> {
        match &mut self.body {
            StepBody::Response(step) => Some(step),
            StepBody::Mcp(_) => None,
        }
    }
}

/// The simplified linear pipeline representation: an ordered list of steps
/// that must start with an `mcp` step and strictly alternate between `mcp`
/// and `response`.
///
/// The sequence is a small state machine whose state is the kind of the step
/// adjacent to an insertion point; [`StepSequence::can_insert`] is the
/// transition predicate and every mutation below preserves the alternation
/// invariant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepSequence {
    steps: Vec<WorkflowStep>,
}

impl StepSequence {
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<WorkflowStep> {
        &mut self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, step_id: StepId) -> Option<&WorkflowStep> {
        self.steps.iter().find(|step| step.step_id() == step_id)
    }

    pub(crate) fn get_mut(&mut self, step_id: StepId) -> Option<&mut WorkflowStep> {
        self.steps.iter_mut().find(|step| step.step_id() == step_id)
    }

    pub fn position(&self, step_id: StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.step_id() == step_id)
    }

    /// Whether the whole sequence satisfies the alternation invariant: empty,
    /// or an `mcp` head with no two neighboring steps of the same kind.
    pub fn is_alternating(&self) -> bool {
        match self.steps.first() {
            None => true,
            Some(first) if first.kind() != StepKind::Mcp => false,
            Some(_) => self
                .steps
                .windows(2)
                .all(|pair| pair[0].kind() != pair[1].kind()),
        }
    }

    /// Transition predicate of the step state machine.
    ///
    /// With no `after`, insertion goes to the head of the list and is legal
    /// only for `mcp` steps, and only when the current head (if any) is not
    /// itself `mcp`. With `after`, the referenced step must exist and the
    /// inserted kind must alternate with it and with the step currently
    /// following it, if any.
    pub fn can_insert(&self, kind: StepKind, after: Option<StepId>) -> bool {
        match after {
            None => {
                if kind != StepKind::Mcp {
                    return false;
                }
                match self.steps.first() {
                    None => true,
                    Some(next) => next.kind() != kind,
                }
            }
            Some(after_id) => {
                let Some(index) = self.position(after_id) else {
                    return false;
                };
                let legal_after = match (self.steps[index].kind(), kind) {
                    (StepKind::Mcp, StepKind::Response) => true,
                    (StepKind::Response, StepKind::Mcp) => true,
                    _ => false,
                };
                if !legal_after {
                    return false;
                }
                match self.steps.get(index + 1) {
                    None => true,
                    Some(next) => next.kind() != kind,
                }
            }
        }
    }

    /// Inserts `step` at the head (no `after`) or immediately after the
    /// referenced step. Returns false and leaves the list unchanged when the
    /// insertion would break the alternation invariant.
    pub(crate) fn insert(&mut self, step: WorkflowStep, after: Option<StepId>) -> bool {
        if !self.can_insert(step.kind(), after) {
            return false;
        }
        let index = match after {
            None => 0,
            // position() succeeded inside can_insert
            Some(after_id) => match self.position(after_id) {
                Some(index) => index + 1,
                None => return false,
            },
        };
        self.steps.insert(index, step);
        true
    }

    pub(crate) fn remove(&mut self, step_id: StepId) -> Option<WorkflowStep> {
        let index = self.position(step_id)?;
        Some(self.steps.remove(index))
    }

    /// Relocates the step to `new_index`, then re-validates the whole
    /// sequence; a move that breaks alternation is rolled back and reported
    /// as false. Out-of-range targets are rejected.
    pub(crate) fn move_to(&mut self, step_id: StepId, new_index: usize) -> bool {
        let Some(index) = self.position(step_id) else {
            return false;
        };
        if new_index >= self.steps.len() {
            return false;
        }
        if new_index == index {
            return true;
        }

        let step = self.steps.remove(index);
        self.steps.insert(new_index, step);

        if self.is_alternating() {
            return true;
        }

        let step = self.steps.remove(new_index);
        self.steps.insert(index, step);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{McpStep, StepBody, StepKind, StepSequence, WorkflowStep};
    use crate::model::ids::StepId;
    use crate::model::records::{ErrorHandling, ResponseMode};

    fn step(id: u64, kind: StepKind) -> WorkflowStep {
        WorkflowStep::new(StepId::new(id), StepBody::with_defaults(kind))
    }

    fn kinds(sequence: &StepSequence) -> Vec<StepKind> {
        sequence.steps().iter().map(|step| step.kind()).collect()
    }

    #[test]
    fn mcp_step_defaults_match_the_builder() {
        let defaults = McpStep::default();
        assert_eq!(defaults.model(), "gpt-4o-mini");
        assert_eq!(defaults.temperature(), 0.7);
        assert_eq!(defaults.max_tokens(), 1000);
        assert_eq!(defaults.system_prompt(), "");
        assert_eq!(defaults.instruction(), "");
        assert!(defaults.selected_tool_ids().is_empty());
        assert_eq!(defaults.config_ref(), None);
        assert_eq!(defaults.prompt_ref(), None);
    }

    #[test]
    fn response_step_defaults_match_the_builder() {
        let defaults = super::ResponseStep::default();
        assert_eq!(defaults.mode(), ResponseMode::RawOutput);
        assert_eq!(defaults.error_handling(), ErrorHandling::PassThrough);
        assert_eq!(defaults.reprocess_instructions(), None);
        assert_eq!(defaults.config_ref(), None);
    }

    #[test]
    fn first_slot_only_accepts_mcp() {
        let mut sequence = StepSequence::default();
        assert!(!sequence.can_insert(StepKind::Response, None));
        assert!(sequence.can_insert(StepKind::Mcp, None));

        assert!(!sequence.insert(step(1, StepKind::Response), None));
        assert!(sequence.is_empty());

        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert_eq!(kinds(&sequence), vec![StepKind::Mcp]);
    }

    #[test]
    fn head_insertion_into_a_mcp_headed_list_is_rejected() {
        let mut sequence = StepSequence::default();
        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert!(!sequence.can_insert(StepKind::Mcp, None));
        assert!(!sequence.insert(step(2, StepKind::Mcp), None));
        assert_eq!(kinds(&sequence), vec![StepKind::Mcp]);
    }

    #[test]
    fn insertion_after_alternates_with_both_neighbors() {
        let mut sequence = StepSequence::default();
        let a = StepId::new(1);
        assert!(sequence.insert(step(1, StepKind::Mcp), None));

        assert!(!sequence.can_insert(StepKind::Mcp, Some(a)));
        assert!(sequence.can_insert(StepKind::Response, Some(a)));
        assert!(sequence.insert(step(2, StepKind::Response), Some(a)));
        assert_eq!(kinds(&sequence), vec![StepKind::Mcp, StepKind::Response]);

        // [mcp(A), response(B)] — another response after A would neighbor B.
        assert!(!sequence.can_insert(StepKind::Response, Some(a)));

        // But an mcp after B extends the chain.
        let b = StepId::new(2);
        assert!(sequence.insert(step(3, StepKind::Mcp), Some(b)));
        assert_eq!(
            kinds(&sequence),
            vec![StepKind::Mcp, StepKind::Response, StepKind::Mcp]
        );
    }

    #[test]
    fn insertion_after_a_missing_step_is_rejected() {
        let mut sequence = StepSequence::default();
        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert!(!sequence.can_insert(StepKind::Response, Some(StepId::new(99))));
        assert!(!sequence.insert(step(2, StepKind::Response), Some(StepId::new(99))));
        assert_eq!(sequence.len(), 1);
    }

    #[test]
    fn move_to_the_current_position_is_accepted() {
        let mut sequence = StepSequence::default();
        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert!(sequence.insert(step(2, StepKind::Response), Some(StepId::new(1))));

        assert!(sequence.move_to(StepId::new(2), 1));
        assert!(sequence.is_alternating());
    }

    // In a strictly alternating list, relocating a single step always joins
    // two same-kind neighbors at the removal point or the insertion point,
    // so every displacing move must roll back.
    #[test]
    fn move_breaking_alternation_is_rolled_back() {
        let mut sequence = StepSequence::default();
        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert!(sequence.insert(step(2, StepKind::Response), Some(StepId::new(1))));
        assert!(sequence.insert(step(3, StepKind::Mcp), Some(StepId::new(2))));
        assert!(sequence.insert(step(4, StepKind::Response), Some(StepId::new(3))));

        let before = sequence.clone();
        for (step_id, new_index) in [(3, 0), (1, 2), (2, 3), (4, 0)] {
            assert!(
                !sequence.move_to(StepId::new(step_id), new_index),
                "move of {step_id} to {new_index} should roll back"
            );
            assert_eq!(sequence, before);
        }
    }

    #[test]
    fn move_rejects_out_of_range_and_missing_ids() {
        let mut sequence = StepSequence::default();
        assert!(sequence.insert(step(1, StepKind::Mcp), None));
        assert!(!sequence.move_to(StepId::new(1), 5));
        assert!(!sequence.move_to(StepId::new(9), 0));
        assert!(sequence.move_to(StepId::new(1), 0));
    }
}
