// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for pipelines on disk.
//!
//! The store reads/writes one versioned JSON snapshot per pipeline, keyed by
//! an external string id. Snapshots round-trip the whole session, allocator
//! cursors included.

pub mod pipeline_file;

pub use pipeline_file::{PipelineStore, StoreError};
