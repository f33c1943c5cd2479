//! Coverage aggregation
//!
//! Pure functions over the component tree and a set of test files. The same
//! functions back the extractor, the `stats` command and the renderer's
//! refresh, so every consumer derives identical figures from a report.

use std::collections::HashMap;

use crate::model::{Coverage, CoverageAnalysis, MissingTestEntry, TestFile};
use crate::structure::ComponentNode;
use crate::tables::Tables;

/// Coverage class of every component name in the tree
///
/// A component is `full` if any full-coverage test lists it, else `partial` if
/// any partial-coverage test lists it, else `none`.
pub fn component_classes<'a, I>(structure: &ComponentNode, files: I) -> HashMap<String, Coverage>
where
    I: IntoIterator<Item = &'a TestFile>,
{
    let mut classes: HashMap<String, Coverage> = structure
        .component_names()
        .into_iter()
        .map(|name| (name, Coverage::None))
        .collect();

    for file in files {
        for test in &file.tests {
            for component in &test.covered_components {
                if let Some(class) = classes.get_mut(component) {
                    *class = (*class).max(test.coverage);
                }
            }
        }
    }

    classes
}

/// Recompute the aggregate statistics from the tree and the test files
pub fn recompute<'a, I>(structure: &ComponentNode, files: I) -> CoverageAnalysis
where
    I: IntoIterator<Item = &'a TestFile>,
{
    let classes = component_classes(structure, files);

    let total = classes.len();
    let full = classes.values().filter(|c| **c == Coverage::Full).count();
    let partial = classes.values().filter(|c| **c == Coverage::Partial).count();

    CoverageAnalysis {
        total_components: total,
        fully_covered: full,
        partially_covered: partial,
        not_covered: total - full - partial,
        coverage_percentage: coverage_percentage(full, partial, total),
    }
}

/// `round((full + partial / 2) / total * 100)`, 0 for an empty tree
pub fn coverage_percentage(full: usize, partial: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let weighted = full as f64 + partial as f64 * 0.5;
    (weighted / total as f64 * 100.0).round() as u32
}

/// Components no test references at all, in tree order
pub fn missing_tests(
    structure: &ComponentNode,
    files: &[TestFile],
    tables: &Tables,
) -> Vec<MissingTestEntry> {
    structure
        .component_names()
        .into_iter()
        .filter(|name| {
            !files
                .iter()
                .flat_map(|f| &f.tests)
                .any(|t| t.covers(name))
        })
        .map(|name| MissingTestEntry {
            description: tables.missing_description_for(&name),
            priority: tables.priority_for(&name),
            component: name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TestCase, TestType};
    use crate::structure::app_structure;
    use std::collections::HashSet;

    fn file_with(tests: Vec<(Coverage, Vec<&str>)>) -> TestFile {
        TestFile {
            name: "sample.spec.ts".to_string(),
            test_type: TestType::Other,
            description: String::new(),
            tests: tests
                .into_iter()
                .enumerate()
                .map(|(i, (coverage, components))| TestCase {
                    name: format!("test {}", i),
                    coverage,
                    covered_components: components.iter().map(|c| c.to_string()).collect(),
                    user_flow: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_percentage_formula() {
        assert_eq!(coverage_percentage(0, 0, 0), 0);
        assert_eq!(coverage_percentage(1, 1, 4), 38); // 37.5 rounds up
        assert_eq!(coverage_percentage(3, 0, 3), 100);
        assert_eq!(coverage_percentage(0, 1, 3), 17);
    }

    #[test]
    fn test_full_beats_partial() {
        let tree = app_structure();
        let files = vec![file_with(vec![
            (Coverage::Partial, vec!["Profil", "Ayarlar"]),
            (Coverage::Full, vec!["Profil"]),
            (Coverage::None, vec!["Raporlar"]),
        ])];

        let classes = component_classes(&tree, &files);
        assert_eq!(classes["Profil"], Coverage::Full);
        assert_eq!(classes["Ayarlar"], Coverage::Partial);
        assert_eq!(classes["Raporlar"], Coverage::None);

        let analysis = recompute(&tree, &files);
        assert_eq!(analysis.total_components, 30);
        assert_eq!(analysis.fully_covered, 1);
        assert_eq!(analysis.partially_covered, 1);
        assert_eq!(analysis.not_covered, 28);
        assert_eq!(analysis.coverage_percentage, 5); // 1.5 / 30
    }

    #[test]
    fn test_unknown_components_do_not_count() {
        let tree = app_structure();
        let files = vec![file_with(vec![(Coverage::Full, vec!["Not A Component"])])];
        let analysis = recompute(&tree, &files);
        assert_eq!(analysis.fully_covered, 0);
        assert_eq!(analysis.total_components, 30);
    }

    #[test]
    fn test_empty_tree_has_zero_percentage() {
        let tree = ComponentNode::new("only");
        let analysis = recompute(&tree, &Vec::<TestFile>::new());
        assert_eq!(analysis.total_components, 1);
        assert_eq!(analysis.coverage_percentage, 0);
        assert_eq!(analysis.not_covered, 1);
    }

    #[test]
    fn test_missing_and_covered_partition_all_names() {
        let tree = app_structure();
        let tables = Tables::embedded().unwrap();
        let files = vec![file_with(vec![
            (Coverage::None, vec!["Raporlar", "Giriş"]),
            (Coverage::Full, vec!["Dosya Oluştur"]),
        ])];

        let missing = missing_tests(&tree, &files, &tables);
        let missing_names: HashSet<&str> = missing.iter().map(|m| m.component.as_str()).collect();
        let covered: HashSet<&str> = files[0]
            .tests
            .iter()
            .flat_map(|t| t.covered_components.iter().map(|c| c.as_str()))
            .collect();

        assert!(missing_names.is_disjoint(&covered));
        let all: HashSet<String> = tree.component_names().into_iter().collect();
        let union: HashSet<String> = missing_names
            .union(&covered)
            .map(|s| s.to_string())
            .collect();
        assert_eq!(union, all);

        let first = &missing[0];
        assert_eq!(first.component, "Hukuk Takip Sistemi");
        assert!(missing.iter().any(|m| m.component == "Toplu Sorgu"
            && m.priority == crate::model::Priority::High));
    }
}
