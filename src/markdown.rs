// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Markdown fence extraction: pulls ```` ```graphrule ```` blocks out of
//! a document, parsing their header lines before handing the remaining
//! body to `parser`. Deliberately line-oriented rather than a full
//! Markdown parse — the engine only ever needs fenced code blocks.

/// One extracted rule block, header fields already separated from body text.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBlock {
    pub name: String,
    pub description: Option<String>,
    pub priority: i64,
    pub body: String,
}

/// Scans `markdown` for fenced blocks whose info string begins with
/// `graphrule`, in document order.
pub fn extract_rule_blocks(markdown: &str) -> Vec<RuleBlock> {
    let mut blocks = Vec::new();
    let mut lines = markdown.lines().peekable();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if !trimmed.starts_with("```") {
            continue;
        }
        let info = trimmed[3..].trim();
        if !info.starts_with("graphrule") {
            continue;
        }
        let mut content: Vec<&str> = Vec::new();
        for inner in lines.by_ref() {
            if inner.trim_start().starts_with("```") {
                break;
            }
            content.push(inner);
        }
        blocks.push(parse_block(&content));
    }

    blocks
}

fn parse_block(lines: &[&str]) -> RuleBlock {
    let mut name = None;
    let mut description = None;
    let mut priority = 0i64;
    let mut body_start = lines.len();

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            body_start = idx + 1;
            break;
        }
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("name:") {
            name = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix("description:") {
            description = Some(rest.trim().to_string());
        } else if let Some(rest) = trimmed.strip_prefix("priority:") {
            priority = rest.trim().parse().unwrap_or(0);
        } else {
            // No recognized header line and no blank separator yet —
            // treat everything from here as body.
            body_start = idx;
            break;
        }
    }

    let body = lines[body_start.min(lines.len())..].join("\n").trim().to_string();
    RuleBlock { name: name.unwrap_or_else(|| "unnamed".to_string()), description, priority, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_block_with_header() {
        let markdown = "# Doc\n\n```graphrule\nname: greet\npriority: 5\n\nCREATE (n:Greeting)\n```\n\nTrailing text.";
        let blocks = extract_rule_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "greet");
        assert_eq!(blocks[0].priority, 5);
        assert_eq!(blocks[0].body, "CREATE (n:Greeting)");
    }

    #[test]
    fn ignores_non_graphrule_fences() {
        let markdown = "```rust\nfn main() {}\n```\n";
        assert!(extract_rule_blocks(markdown).is_empty());
    }

    #[test]
    fn extracts_multiple_blocks_in_document_order() {
        let markdown = "```graphrule\nname: first\n\nCREATE (a:A)\n```\ntext\n```graphrule\nname: second\n\nCREATE (b:B)\n```\n";
        let blocks = extract_rule_blocks(markdown);
        assert_eq!(blocks.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
