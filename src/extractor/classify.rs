//! Heuristic classification of extracted test blocks

use crate::model::{Coverage, TestCase};
use crate::tables::{fold_case, Tables};

use super::blocks::RawBlock;

/// Turn a raw block into a classified test case
///
/// Indicators and keywords are matched against the case-folded body; flow
/// patterns against the original-case body.
pub fn classify(block: &RawBlock, tables: &Tables) -> TestCase {
    let lower = fold_case(&block.body);

    TestCase {
        name: block.title.clone(),
        coverage: coverage_of(&lower, tables),
        covered_components: covered_components(&lower, tables),
        user_flow: user_flow(&block.body, tables),
    }
}

fn coverage_of(lower_body: &str, tables: &Tables) -> Coverage {
    if tables.comprehensive.iter().any(|i| lower_body.contains(i.as_str())) {
        Coverage::Full
    } else if tables.basic.iter().any(|i| lower_body.contains(i.as_str())) {
        Coverage::Partial
    } else {
        Coverage::None
    }
}

fn covered_components(lower_body: &str, tables: &Tables) -> Vec<String> {
    let mut components: Vec<String> = Vec::new();
    for entry in &tables.components {
        if lower_body.contains(entry.keyword.as_str()) && !components.contains(&entry.component) {
            components.push(entry.component.clone());
        }
    }
    components
}

fn user_flow(body: &str, tables: &Tables) -> Vec<String> {
    tables
        .flows
        .iter()
        .filter(|flow| flow.regex.is_match(body))
        .map(|flow| flow.action.clone())
        .collect()
}
