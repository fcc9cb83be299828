// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;

/// A stable numeric identifier used across the model and snapshot surfaces.
///
/// Ids are plain `u64` values tagged with a phantom kind, so a `StepId` can
/// never be passed where a `NodeId` is expected. Fresh values come from an
/// [`IdAllocator`] owned by the session or registry instance; there is no
/// process-wide counter, so parallel sessions (and parallel test runs) never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<u64> for Id<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

/// Monotonic id source scoped to one owning instance.
///
/// The allocator's cursor is part of the persisted snapshot: restoring a
/// pipeline restores the cursor, so ids handed out after a load never collide
/// with ids already live in the loaded state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resumes allocation at `next`; values below 1 are clamped to 1.
    pub fn resume_at(next: u64) -> Self {
        Self { next: next.max(1) }
    }

    /// The value the next call to [`IdAllocator::allocate`] will hand out.
    pub fn next_value(&self) -> u64 {
        self.next
    }

    pub fn allocate<T>(&mut self) -> Id<T> {
        let id = Id::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeIdTag {}
pub type NodeId = Id<NodeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeIdTag {}
pub type EdgeId = Id<EdgeIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepIdTag {}
pub type StepId = Id<StepIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolIdTag {}
pub type ToolId = Id<ToolIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum McpConfigIdTag {}
pub type McpConfigId = Id<McpConfigIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponseConfigIdTag {}
pub type ResponseConfigId = Id<ResponseConfigIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PromptIdTag {}
pub type PromptId = Id<PromptIdTag>;

#[cfg(test)]
mod tests {
    use super::{IdAllocator, NodeId, StepId};

    #[test]
    fn allocator_hands_out_monotonic_values_starting_at_one() {
        let mut ids = IdAllocator::new();
        let first: NodeId = ids.allocate();
        let second: NodeId = ids.allocate();
        assert_eq!(first.value(), 1);
        assert_eq!(second.value(), 2);
        assert_eq!(ids.next_value(), 3);
    }

    #[test]
    fn allocator_shares_one_cursor_across_kinds() {
        let mut ids = IdAllocator::new();
        let node: NodeId = ids.allocate();
        let step: StepId = ids.allocate();
        assert_eq!(node.value(), 1);
        assert_eq!(step.value(), 2);
    }

    #[test]
    fn allocator_resumes_without_reissuing_live_values() {
        let mut ids = IdAllocator::resume_at(7);
        let id: NodeId = ids.allocate();
        assert_eq!(id.value(), 7);
    }

    #[test]
    fn resume_clamps_to_one() {
        let ids = IdAllocator::resume_at(0);
        assert_eq!(ids.next_value(), 1);
    }
}
