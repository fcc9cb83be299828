// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only analyses over a session snapshot.

pub mod search;
pub mod validate;

pub use search::{search_registry, RecordSearchMode};
pub use validate::{validate_flow, FlowValidation};
