//! Application structure
//!
//! The fixed, hand-authored tree of product areas that tests are matched
//! against. Components are identified by their bare `name` everywhere in the
//! crate; a name repeated in two branches counts as one component.

use serde::{Deserialize, Serialize};

/// A node in the application feature tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentNode {
    pub name: String,
    /// Route of the page, if the node is a page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            tab: None,
            action: None,
            children: Vec::new(),
        }
    }

    pub fn page(name: &str, path: &str) -> Self {
        Self {
            path: Some(path.to_string()),
            ..Self::new(name)
        }
    }

    pub fn tab(name: &str, tab: &str) -> Self {
        Self {
            tab: Some(tab.to_string()),
            ..Self::new(name)
        }
    }

    pub fn action(name: &str, action: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            ..Self::new(name)
        }
    }

    pub fn with_children(mut self, children: Vec<ComponentNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Distinct component names in pre-order, first occurrence wins
    pub fn component_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.walk(&mut |node, _| {
            if !names.contains(&node.name) {
                names.push(node.name.clone());
            }
        });
        names
    }

    /// Dotted paths from the root to every node, in pre-order
    pub fn qualified_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        let path = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", prefix, self.name)
        };
        paths.push(path.clone());
        for child in &self.children {
            child.collect_paths(&path, paths);
        }
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(|c| 1 + c.descendant_count()).sum()
    }

    /// Depth of the deepest node, the root being depth 0
    pub fn depth(&self) -> usize {
        self.children.iter().map(|c| 1 + c.depth()).max().unwrap_or(0)
    }

    /// Visit every node in pre-order together with its depth
    pub fn walk<F: FnMut(&ComponentNode, usize)>(&self, f: &mut F) {
        self.walk_at(0, f);
    }

    fn walk_at<F: FnMut(&ComponentNode, usize)>(&self, depth: usize, f: &mut F) {
        f(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, f);
        }
    }

    /// Parent/child name pairs, in pre-order
    pub fn edges(&self) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        self.collect_edges(&mut edges);
        edges
    }

    fn collect_edges(&self, edges: &mut Vec<(String, String)>) {
        for child in &self.children {
            edges.push((self.name.clone(), child.name.clone()));
            child.collect_edges(edges);
        }
    }
}

/// The Hukuk Takip Sistemi feature tree
pub fn app_structure() -> ComponentNode {
    ComponentNode::page("Hukuk Takip Sistemi", "/").with_children(vec![
        ComponentNode::page("Giriş", "/login").with_children(vec![
            ComponentNode::action("Giriş Formu", "login"),
            ComponentNode::action("Şifremi Unuttum", "forgot-password"),
        ]),
        ComponentNode::page("Ana Sayfa", "/dashboard").with_children(vec![
            ComponentNode::new("İstatistik Kartları"),
            ComponentNode::new("Son İşlemler"),
        ]),
        ComponentNode::page("İcra Dosyalarım", "/icra-dosyalarim").with_children(vec![
            ComponentNode::new("Dosya Listesi"),
            ComponentNode::action("Dosya Arama", "search"),
            ComponentNode::page("Dosya Detayı", "/icra-dosyalarim/[id]").with_children(vec![
                ComponentNode::tab("Genel Bilgiler", "genel"),
                ComponentNode::tab("Taraflar", "taraflar"),
                ComponentNode::tab("Sorgu Sonuçları", "sorgular"),
                ComponentNode::tab("Belgeler", "belgeler"),
            ]),
        ]),
        ComponentNode::page("Dosya Oluştur", "/dosya-olustur").with_children(vec![
            ComponentNode::tab("Alacaklı Bilgileri", "step-1"),
            ComponentNode::tab("Borçlu Bilgileri", "step-2"),
            ComponentNode::tab("Alacak Kalemleri", "step-3"),
            ComponentNode::action("Özet ve Onay", "submit"),
        ]),
        ComponentNode::page("Sorgulama", "/sorgulama").with_children(vec![
            ComponentNode::action("Banka Sorgusu", "banka"),
            ComponentNode::action("Araç Sorgusu", "arac"),
            ComponentNode::action("SGK Sorgusu", "sgk"),
            ComponentNode::action("Tapu Sorgusu", "tapu"),
            ComponentNode::action("Toplu Sorgu", "toplu"),
        ]),
        ComponentNode::page("Raporlar", "/raporlar"),
        ComponentNode::page("Ayarlar", "/ayarlar").with_children(vec![
            ComponentNode::tab("Profil", "profil"),
            ComponentNode::tab("Kullanıcı Yönetimi", "kullanicilar"),
        ]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_structure_names_are_distinct() {
        let tree = app_structure();
        let names = tree.component_names();
        assert_eq!(names.len(), 30);
        assert_eq!(names.len(), tree.descendant_count() + 1);
        assert_eq!(names[0], "Hukuk Takip Sistemi");
        assert!(names.contains(&"İcra Dosyalarım".to_string()));
    }

    #[test]
    fn test_repeated_names_count_once() {
        let tree = ComponentNode::new("root").with_children(vec![
            ComponentNode::new("a").with_children(vec![ComponentNode::new("Modal")]),
            ComponentNode::new("b").with_children(vec![ComponentNode::new("Modal")]),
        ]);
        assert_eq!(tree.component_names(), vec!["root", "a", "Modal", "b"]);
        assert_eq!(tree.qualified_paths().len(), 5);
    }

    #[test]
    fn test_qualified_paths_are_preorder() {
        let tree = ComponentNode::new("root").with_children(vec![
            ComponentNode::new("a").with_children(vec![ComponentNode::new("x")]),
            ComponentNode::new("b"),
        ]);
        assert_eq!(tree.qualified_paths(), vec!["root", "root.a", "root.a.x", "root.b"]);
    }

    #[test]
    fn test_edges_and_depth() {
        let tree = app_structure();
        assert_eq!(tree.edges().len(), tree.descendant_count());
        assert_eq!(tree.depth(), 3);
        assert!(tree
            .edges()
            .contains(&("Dosya Detayı".to_string(), "Taraflar".to_string())));
    }
}
