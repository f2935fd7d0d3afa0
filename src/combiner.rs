// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Binding combiner (component E): joins the binding sets produced by
//! each comma-separated MATCH pattern into their Cartesian product.
//! Generalizes `generate_variable_combinations`/`JoinType::Cross` from
//! `plan/unified_query_planner.rs`, which does the same cross join
//! across separately-planned pattern scans.

use crate::binding::BindingContext;

/// Cartesian product of `sets`, merging left-to-right (later sets
/// overwrite conflicting names from earlier ones, per `BindingContext::merge`).
/// If any input set is empty, the result is empty — a comma-separated
/// MATCH pattern with no matches admits no combined binding.
pub fn combine(sets: &[Vec<BindingContext>]) -> Vec<BindingContext> {
    if sets.is_empty() {
        return vec![BindingContext::new()];
    }
    if sets.iter().any(|s| s.is_empty()) {
        return Vec::new();
    }

    let mut acc = vec![BindingContext::new()];
    for set in sets {
        let mut next = Vec::with_capacity(acc.len() * set.len());
        for partial in &acc {
            for candidate in set {
                let mut combined = partial.clone();
                combined.merge(candidate);
                next.push(combined);
            }
        }
        acc = next;
    }
    acc
}
