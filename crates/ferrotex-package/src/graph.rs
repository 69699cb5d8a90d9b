//! Which packages load which, and which packages cannot be combined.

use crate::{PackageIndex, RegistryError};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Serialized form of a [`PackageGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageGraphData {
    /// `loader -> packages it loads`.
    #[serde(default)]
    pub loads: IndexMap<String, Vec<String>>,
    /// Groups of mutually exclusive packages.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    loads: IndexMap<String, IndexSet<String>>,
    /// Transitive closure of `loads`, kept in sync on every insertion.
    closure: IndexMap<String, IndexSet<String>>,
    conflicts: Vec<IndexSet<String>>,
}

impl PackageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph of well-known kernel-adjacent packages.
    pub fn builtin() -> Self {
        crate::builtin::BUILTIN_GRAPH.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let mut graph = Self::new();
        graph.merge_json(json)?;
        Ok(graph)
    }

    /// Adds the edges and conflict groups of a JSON document to this graph.
    pub fn merge_json(&mut self, json: &str) -> Result<(), RegistryError> {
        let data: PackageGraphData = serde_json::from_str(json)?;
        self.extend(data);
        Ok(())
    }

    pub fn extend(&mut self, data: PackageGraphData) {
        for (loader, loaded) in data.loads {
            for package in loaded {
                self.add_load(&loader, &package);
            }
        }
        for group in data.conflicts {
            self.add_conflict(group);
        }
    }

    /// Adds the `\RequirePackage` edges found by a package scan.
    pub fn extend_from_index(&mut self, index: &PackageIndex) {
        let mut added = 0;
        for (name, metadata) in &index.packages {
            for required in &metadata.requires {
                if required != name && self.add_load(name, required) {
                    added += 1;
                }
            }
        }
        log::debug!("Added {} load edges from the package index", added);
    }

    /// Records that importing `loader` also imports `loaded`. Returns false if
    /// the edge was already known.
    pub fn add_load(&mut self, loader: &str, loaded: &str) -> bool {
        let inserted = self
            .loads
            .entry(loader.to_string())
            .or_default()
            .insert(loaded.to_string());
        if inserted {
            self.rebuild_closure();
        }
        inserted
    }

    pub fn add_conflict<I, S>(&mut self, group: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group: IndexSet<String> = group.into_iter().map(Into::into).collect();
        if group.len() > 1 && !self.conflicts.contains(&group) {
            self.conflicts.push(group);
        }
    }

    fn rebuild_closure(&mut self) {
        let mut closure = IndexMap::with_capacity(self.loads.len());
        for loader in self.loads.keys() {
            let mut reached = IndexSet::new();
            let mut stack: Vec<&str> = vec![loader.as_str()];
            while let Some(current) = stack.pop() {
                for next in self.loads.get(current).into_iter().flatten() {
                    if next != loader && reached.insert(next.clone()) {
                        stack.push(next);
                    }
                }
            }
            closure.insert(loader.clone(), reached);
        }
        self.closure = closure;
    }

    /// Packages loaded directly by `loader`.
    pub fn direct_loads(&self, loader: &str) -> impl Iterator<Item = &str> {
        self.loads.get(loader).into_iter().flatten().map(String::as_str)
    }

    /// Every package that ends up loaded when `loader` is imported.
    pub fn transitive_loads(&self, loader: &str) -> impl Iterator<Item = &str> {
        self.closure.get(loader).into_iter().flatten().map(String::as_str)
    }

    /// Packages which, directly or indirectly, load `package`.
    pub fn loaders_of<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.closure
            .iter()
            .filter(move |(_, loaded)| loaded.contains(package))
            .map(|(loader, _)| loader.as_str())
    }

    /// True if some package in `included` loads `package`.
    pub fn is_loaded_by_any(&self, package: &str, included: &IndexSet<String>) -> bool {
        self.loaders_of(package)
            .any(|loader| included.contains(loader))
    }

    /// An included package that shares a conflict group with `package`.
    pub fn conflicting_package<'a>(
        &self,
        package: &str,
        included: &'a IndexSet<String>,
    ) -> Option<&'a str> {
        self.conflicts
            .iter()
            .filter(|group| group.contains(package))
            .flat_map(|group| group.iter())
            .filter(|other| other.as_str() != package)
            .find_map(|other| included.get(other).map(String::as_str))
    }

    pub fn conflict_groups(&self) -> &[IndexSet<String>] {
        &self.conflicts
    }

    pub fn to_data(&self) -> PackageGraphData {
        PackageGraphData {
            loads: self
                .loads
                .iter()
                .map(|(loader, loaded)| (loader.clone(), loaded.iter().cloned().collect()))
                .collect(),
            conflicts: self
                .conflicts
                .iter()
                .map(|group| group.iter().cloned().collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PackageMetadata;

    fn included(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_builtin_edges() {
        let graph = PackageGraph::builtin();
        let loaded: Vec<_> = graph.direct_loads("amssymb").collect();
        assert_eq!(loaded, vec!["amsfonts"]);
        assert!(graph.is_loaded_by_any("amsmath", &included(&["mathtools"])));
        assert!(graph.is_loaded_by_any("graphics", &included(&["graphicx"])));
        assert!(graph.is_loaded_by_any("color", &included(&["xcolor"])));
        assert!(!graph.is_loaded_by_any("amsmath", &included(&["amssymb"])));
    }

    #[test]
    fn test_transitive_loads() {
        let mut graph = PackageGraph::new();
        graph.add_load("tikz", "pgf");
        graph.add_load("pgf", "xcolor");
        graph.add_load("xcolor", "color");

        let loaded: Vec<_> = graph.transitive_loads("tikz").collect();
        assert_eq!(loaded.len(), 3);
        assert!(graph.is_loaded_by_any("color", &included(&["tikz"])));
        let mut loaders: Vec<_> = graph.loaders_of("color").collect();
        loaders.sort();
        assert_eq!(loaders, vec!["pgf", "tikz", "xcolor"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut graph = PackageGraph::new();
        graph.add_load("a", "b");
        graph.add_load("b", "a");
        let loaded: Vec<_> = graph.transitive_loads("a").collect();
        assert_eq!(loaded, vec!["b"]);
    }

    #[test]
    fn test_conflicting_package() {
        let graph = PackageGraph::builtin();
        let packages = included(&["natbib", "graphicx"]);
        assert_eq!(graph.conflicting_package("biblatex", &packages), Some("natbib"));
        assert_eq!(graph.conflicting_package("natbib", &packages), None);
        assert_eq!(graph.conflicting_package("amsmath", &packages), None);
    }

    #[test]
    fn test_conflict_group_needs_two_members() {
        let mut graph = PackageGraph::new();
        graph.add_conflict(["solo"]);
        graph.add_conflict(["a", "b"]);
        graph.add_conflict(["a", "b"]);
        assert_eq!(graph.conflict_groups().len(), 1);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "loads": { "beamer": ["xcolor", "hyperref"] },
            "conflicts": [["algorithmic", "algpseudocode"]]
        }"#;
        let graph = PackageGraph::from_json(json).unwrap();
        assert!(graph.is_loaded_by_any("xcolor", &included(&["beamer"])));
        assert_eq!(
            graph.conflicting_package("algorithmic", &included(&["algpseudocode"])),
            Some("algpseudocode")
        );
        assert!(PackageGraph::from_json("{ nope").is_err());
    }

    #[test]
    fn test_extend_from_index() {
        let mut index = PackageIndex::new();
        index.insert(
            "siunitx".into(),
            PackageMetadata {
                requires: vec!["translations".into(), "siunitx".into()],
                ..Default::default()
            },
        );
        let mut graph = PackageGraph::new();
        graph.extend_from_index(&index);
        let loaded: Vec<_> = graph.direct_loads("siunitx").collect();
        assert_eq!(loaded, vec!["translations"]);
    }
}
