// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine-wide configuration knobs. Mirrors the shape of `graphlite`'s
//! `StorageManager::new(path, StorageMethod, StorageType)` constructor
//! taking its behavioral choices as explicit config rather than globals.

use crate::actions::IdGenerator;
use std::sync::Arc;

/// Tunables for the matcher, evaluator, and id allocation. All fields
/// have spec-mandated defaults.
#[derive(Clone)]
pub struct EngineConfig {
    /// Label and relationship-type comparison ignores case unless false.
    pub case_insensitive_labels: bool,
    /// When true, `"42" == 42` is permitted in comparisons. Off by
    /// default per spec's "numeric coercion is opt-in" rule.
    pub numeric_coercion: bool,
    /// Cap on total edges traversed along any one path (§4.D).
    pub max_path_depth: usize,
    /// Cap on the number of paths `findMatchingPaths` returns (§4.D).
    pub max_path_results: usize,
    /// Generator used by `CreateNode` when it allocates a fresh id.
    pub id_generator: Arc<dyn IdGenerator>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            case_insensitive_labels: true,
            numeric_coercion: false,
            max_path_depth: 10,
            max_path_results: 1000,
            id_generator: Arc::new(crate::actions::CounterIdGenerator::default()),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("case_insensitive_labels", &self.case_insensitive_labels)
            .field("numeric_coercion", &self.numeric_coercion)
            .field("max_path_depth", &self.max_path_depth)
            .field("max_path_results", &self.max_path_results)
            .finish()
    }
}
