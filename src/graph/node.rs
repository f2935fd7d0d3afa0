// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node entity.

use crate::value::Value;
use std::collections::HashMap;

pub type NodeId = String;

/// A node in the property graph: a stable id, a primary label, and a
/// property bag. An additional `labels` array may live inside the
/// property bag (key `"labels"`); pattern labels match either the
/// primary label or any entry in that array.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub properties: HashMap<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            properties: HashMap::new(),
        }
    }

    /// All labels this node answers to: its primary label plus whatever
    /// is stashed in the `labels` property, if present.
    pub fn all_labels(&self) -> Vec<String> {
        let mut labels = vec![self.label.clone()];
        if let Some(Value::List(extra)) = self.properties.get("labels") {
            for v in extra {
                if let Value::String(s) = v {
                    labels.push(s.clone());
                }
            }
        }
        labels
    }

    pub fn has_label(&self, label: &str, case_insensitive: bool) -> bool {
        self.all_labels().iter().any(|l| {
            if case_insensitive {
                l.eq_ignore_ascii_case(label)
            } else {
                l == label
            }
        })
    }
}
