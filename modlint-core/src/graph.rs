//! Dependency-graph queries over the declared edges.
//!
//! Performance characteristics:
//! - Graph build: O(|V| + |E|) where V = modules, E = declarations
//! - Classpath / api-closure: O(|V| + |E|) BFS per query
//!
//! Uses `DiGraphMap<&str, ()>` for the api-edge graph: string slices
//! borrowed from the model avoid cloning, and unit edges minimize
//! memory footprint.

use crate::model::{
    DependencyDeclaration, ModulePath, ProjectModel, SourceSetName,
};
use petgraph::graphmap::DiGraphMap;
use std::collections::{HashSet, VecDeque};

/// One module visible on another module's configuration classpath.
#[derive(Debug, Clone, Copy)]
pub struct ClasspathEntry<'a> {
    pub target: &'a ModulePath,
    /// The direct declaration this entry was inherited through. For a
    /// direct dependency it is the declaration itself.
    pub via: &'a DependencyDeclaration,
    /// Hops from the consuming module: 1 = direct, 2+ = inherited
    /// through a transitive `api` chain.
    pub depth: usize,
}

impl ClasspathEntry<'_> {
    pub fn is_direct(&self) -> bool {
        self.depth == 1
    }
}

/// Read-only view over the declared dependency edges of a
/// [`ProjectModel`], with the transitive `api` graph prebuilt.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    model: &'a ProjectModel,
    /// `main`-source-set api edges only: the edges that leak to
    /// downstream consumers transitively.
    api_graph: DiGraphMap<&'a str, ()>,
}

impl<'a> DependencyGraph<'a> {
    pub fn build(model: &'a ProjectModel) -> Self {
        let mut api_graph = DiGraphMap::new();
        for module in model.modules() {
            api_graph.add_node(module.path.as_str());
        }
        for module in model.modules() {
            for decl in &module.declarations {
                let is_main_api = decl.configuration.is_api()
                    && decl.configuration.to_source_set_name().is_main();
                if is_main_api && model.contains(&decl.target) {
                    api_graph.add_edge(module.path.as_str(), decl.target.as_str(), ());
                }
            }
        }
        Self { model, api_graph }
    }

    pub fn model(&self) -> &'a ProjectModel {
        self.model
    }

    /// Direct declarations visible to code in `source_set`: the source
    /// set's own configurations plus everything declared upstream
    /// (`implementation` is visible to `test`, `testImplementation` is
    /// not visible to `main`).
    pub fn direct_dependencies(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Vec<&'a DependencyDeclaration> {
        let Some(node) = self.model.module(module) else {
            return Vec::new();
        };
        node.declarations
            .iter()
            .filter(|d| source_set.sees(&d.configuration.to_source_set_name()))
            .collect()
    }

    /// The full configuration-visible dependency set of
    /// `(module, source_set)`: direct declarations plus everything
    /// reachable from them through transitive `api` chains.
    ///
    /// Entries come back in nearest-first order: breadth-first by hop
    /// depth, and within one depth in declaration order. The first entry
    /// per target wins, which is exactly the resolver's tie-break.
    pub fn classpath(
        &self,
        module: &ModulePath,
        source_set: &SourceSetName,
    ) -> Vec<ClasspathEntry<'a>> {
        let mut entries: Vec<ClasspathEntry<'a>> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        // The module never appears on its own classpath.
        seen.insert(module.as_str());

        let mut queue: VecDeque<ClasspathEntry<'a>> = VecDeque::new();
        for decl in self.direct_dependencies(module, source_set) {
            if self.model.contains(&decl.target) && seen.insert(decl.target.as_str()) {
                queue.push_back(ClasspathEntry {
                    target: &decl.target,
                    via: decl,
                    depth: 1,
                });
            }
        }

        while let Some(entry) = queue.pop_front() {
            entries.push(entry);
            let Some(node) = self.model.module(entry.target) else {
                continue;
            };
            for decl in &node.declarations {
                let leaks = decl.configuration.is_api()
                    && decl.configuration.to_source_set_name().is_main();
                if leaks && self.model.contains(&decl.target) && seen.insert(decl.target.as_str())
                {
                    queue.push_back(ClasspathEntry {
                        target: &decl.target,
                        via: entry.via,
                        depth: entry.depth + 1,
                    });
                }
            }
        }

        entries
    }

    /// Modules reachable from `start` through `api` edges, excluding
    /// `start` itself. BFS, O(|V| + |E|).
    pub fn api_closure(&self, start: &ModulePath) -> HashSet<&'a str> {
        let mut visited: HashSet<&'a str> = HashSet::new();
        // Re-borrow the key from the model so it carries the graph's
        // lifetime.
        let Some(node) = self.model.module(start) else {
            return visited;
        };
        let root: &'a str = node.path.as_str();

        let mut queue: VecDeque<&'a str> = VecDeque::new();
        for next in self.api_graph.neighbors(root) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
        while let Some(current) = queue.pop_front() {
            for next in self.api_graph.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited.remove(root);
        visited
    }

    /// Modules declaring a direct dependency on `target`, in path order.
    pub fn direct_dependents(
        &self,
        target: &ModulePath,
    ) -> Vec<&'a crate::model::ModuleNode> {
        self.model
            .modules()
            .filter(|m| m.declares_dependency_on(target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigurationName, ModuleNode};

    fn module(path: &str, deps: &[(&str, &str)]) -> ModuleNode {
        let mut node = ModuleNode::new(ModulePath::new(path));
        for (config, target) in deps {
            node.declarations.push(DependencyDeclaration {
                configuration: ConfigurationName::new(*config),
                target: ModulePath::new(*target),
                position: None,
            });
        }
        node
    }

    fn model(nodes: Vec<ModuleNode>) -> ProjectModel {
        let mut model = ProjectModel::new();
        for node in nodes {
            model.add_module(node);
        }
        model
    }

    #[test]
    fn test_direct_dependencies_respect_source_set_visibility() {
        let m = model(vec![
            module(
                ":app",
                &[("implementation", ":lib-a"), ("testImplementation", ":test-utils")],
            ),
            module(":lib-a", &[]),
            module(":test-utils", &[]),
        ]);
        let graph = DependencyGraph::build(&m);
        let app = ModulePath::new(":app");

        let main = graph.direct_dependencies(&app, &SourceSetName::main());
        assert_eq!(main.len(), 1);
        assert_eq!(main[0].target.as_str(), ":lib-a");

        // Test code sees both the test configuration and main's.
        let test = graph.direct_dependencies(&app, &SourceSetName::test());
        assert_eq!(test.len(), 2);
    }

    #[test]
    fn test_classpath_follows_api_chains_only() {
        let m = model(vec![
            module(":app", &[("implementation", ":lib-a")]),
            module(":lib-a", &[("api", ":lib-b"), ("implementation", ":hidden")]),
            module(":lib-b", &[("api", ":lib-c")]),
            module(":lib-c", &[]),
            module(":hidden", &[]),
        ]);
        let graph = DependencyGraph::build(&m);
        let cp = graph.classpath(&ModulePath::new(":app"), &SourceSetName::main());

        let targets: Vec<&str> = cp.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec![":lib-a", ":lib-b", ":lib-c"]);

        // Everything inherited arrives via the :lib-a direct edge.
        assert!(cp.iter().all(|e| e.via.target.as_str() == ":lib-a"));
        assert_eq!(cp[0].depth, 1);
        assert_eq!(cp[1].depth, 2);
        assert_eq!(cp[2].depth, 3);
    }

    #[test]
    fn test_classpath_nearest_entry_wins() {
        // :dup is both a direct dependency and inherited through :lib-a.
        let m = model(vec![
            module(":app", &[("implementation", ":lib-a"), ("implementation", ":dup")]),
            module(":lib-a", &[("api", ":dup")]),
            module(":dup", &[]),
        ]);
        let graph = DependencyGraph::build(&m);
        let cp = graph.classpath(&ModulePath::new(":app"), &SourceSetName::main());

        let dup = cp.iter().find(|e| e.target.as_str() == ":dup").unwrap();
        assert_eq!(dup.depth, 1);
        assert_eq!(cp.len(), 2);
    }

    #[test]
    fn test_api_closure() {
        let m = model(vec![
            module(":a", &[("api", ":b")]),
            module(":b", &[("api", ":c"), ("implementation", ":d")]),
            module(":c", &[]),
            module(":d", &[]),
        ]);
        let graph = DependencyGraph::build(&m);
        let closure = graph.api_closure(&ModulePath::new(":a"));
        assert!(closure.contains(":b"));
        assert!(closure.contains(":c"));
        assert!(!closure.contains(":d"));
        assert!(!closure.contains(":a"));
    }

    #[test]
    fn test_direct_dependents() {
        let m = model(vec![
            module(":app", &[("implementation", ":lib")]),
            module(":feature", &[("api", ":lib")]),
            module(":lib", &[]),
        ]);
        let graph = DependencyGraph::build(&m);
        let dependents = graph.direct_dependents(&ModulePath::new(":lib"));
        let paths: Vec<&str> = dependents.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec![":app", ":feature"]);
    }
}
