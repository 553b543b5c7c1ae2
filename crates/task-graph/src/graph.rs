//! Task graph built on petgraph.
//!
//! Nodes are tasks keyed by name; an edge `dep -> task` means `task` must not
//! start before `dep` finished. Edges are added explicitly, so the graph can
//! be grown one registration at a time.

use crate::{Error, ParallelGroups, Result, TopologicalOrder};
use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::debug;

/// A node in the task graph.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// Name of the task.
    pub name: String,
    /// The task data.
    pub task: T,
}

/// Directed acyclic graph of tasks and their dependencies.
pub struct TaskGraph<T> {
    /// The directed graph of tasks.
    graph: DiGraph<GraphNode<T>, ()>,
    /// Map from task names to node indices.
    name_to_node: HashMap<String, NodeIndex>,
}

impl<T> TaskGraph<T> {
    /// Create a new empty task graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_node: HashMap::new(),
        }
    }

    /// Add a single task to the graph.
    ///
    /// If a task with the same name already exists, the existing node index
    /// is returned and `task` is dropped.
    pub fn add_task(&mut self, name: &str, task: T) -> NodeIndex {
        if let Some(&node) = self.name_to_node.get(name) {
            return node;
        }

        let node_index = self.graph.add_node(GraphNode {
            name: name.to_string(),
            task,
        });
        self.name_to_node.insert(name.to_string(), node_index);
        debug!("Added task node '{}'", name);

        node_index
    }

    /// Record that `task` depends on `dependency`.
    ///
    /// Adding the same dependency twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if `task` is not in the graph and
    /// [`Error::MissingDependency`] if `dependency` is not.
    pub fn add_dependency(&mut self, task: &str, dependency: &str) -> Result<()> {
        let Some(&to) = self.name_to_node.get(task) else {
            return Err(Error::UnknownTask {
                task: task.to_string(),
            });
        };
        let Some(&from) = self.name_to_node.get(dependency) else {
            return Err(Error::MissingDependency {
                task: task.to_string(),
                dependency: dependency.to_string(),
            });
        };

        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
        Ok(())
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Get the number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of dependency edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if a task exists in the graph.
    #[must_use]
    pub fn contains_task(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Get the node index for a task by name.
    #[must_use]
    pub fn get_node_index(&self, name: &str) -> Option<NodeIndex> {
        self.name_to_node.get(name).copied()
    }

    /// Get a reference to a task node by name.
    #[must_use]
    pub fn get_node_by_name(&self, name: &str) -> Option<&GraphNode<T>> {
        self.name_to_node
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Names of the direct dependencies of `name`, in no particular order.
    #[must_use]
    pub fn dependency_names(&self, name: &str) -> Vec<&str> {
        self.name_to_node
            .get(name)
            .map(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .map(|dep| self.graph[dep].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn inner(&self) -> &DiGraph<GraphNode<T>, ()> {
        &self.graph
    }
}

impl<T: Clone> TaskGraph<T> {
    /// Get topologically sorted list of tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn topological_sort(&self) -> Result<TopologicalOrder<T>> {
        if self.has_cycles() {
            return Err(Error::CycleDetected {
                message: "Task dependency graph contains cycles".to_string(),
            });
        }

        match toposort(&self.graph, None) {
            Ok(sorted_indices) => Ok(sorted_indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(_) => Err(Error::TopologicalSortFailed {
                reason: "petgraph toposort failed".to_string(),
            }),
        }
    }

    /// Get all tasks that can run in parallel (no dependencies between them).
    ///
    /// Returns a vector of parallel groups, where each group contains tasks
    /// that can execute concurrently. Groups are ordered by dependency level.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn get_parallel_groups(&self) -> Result<ParallelGroups<T>> {
        if self.has_cycles() {
            return Err(Error::CycleDetected {
                message: "Task dependency graph contains cycles".to_string(),
            });
        }
        let sorted = toposort(&self.graph, None).map_err(|_| Error::TopologicalSortFailed {
            reason: "petgraph toposort failed".to_string(),
        })?;

        let mut groups: ParallelGroups<T> = vec![];
        let mut levels: HashMap<NodeIndex, usize> = HashMap::new();

        for idx in sorted {
            // One past the deepest dependency
            let level = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .filter_map(|dep| levels.get(&dep).map(|l| l + 1))
                .max()
                .unwrap_or(0);

            if level >= groups.len() {
                groups.resize(level + 1, vec![]);
            }
            groups[level].push(self.graph[idx].clone());
            levels.insert(idx, level);
        }

        Ok(groups)
    }
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(tasks: &[(&str, &[&str])]) -> TaskGraph<()> {
        let mut graph = TaskGraph::new();
        for (name, _) in tasks {
            graph.add_task(name, ());
        }
        for (name, deps) in tasks {
            for dep in *deps {
                graph.add_dependency(name, dep).unwrap();
            }
        }
        graph
    }

    fn positions(sorted: &[GraphNode<()>]) -> HashMap<String, usize> {
        sorted
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.clone(), i))
            .collect()
    }

    #[test]
    fn test_task_graph_new() {
        let graph: TaskGraph<()> = TaskGraph::new();
        assert_eq!(graph.task_count(), 0);
        assert!(graph.topological_sort().unwrap().is_empty());
        assert!(graph.get_parallel_groups().unwrap().is_empty());
    }

    #[test]
    fn test_add_single_task() {
        let mut graph = TaskGraph::new();
        let node = graph.add_task("compile", 1);
        assert!(graph.contains_task("compile"));

        // Adding same task again should return same node and keep the first payload
        let node2 = graph.add_task("compile", 2);
        assert_eq!(node, node2);
        assert_eq!(graph.task_count(), 1);
        assert_eq!(graph.get_node_by_name("compile").unwrap().task, 1);
    }

    #[test]
    fn test_task_dependencies() {
        let graph = graph_with(&[
            ("task1", &[]),
            ("task2", &["task1"]),
            ("task3", &["task1", "task2"]),
        ]);

        assert!(!graph.has_cycles());
        let sorted = graph.topological_sort().unwrap();
        let positions = positions(&sorted);

        assert!(positions["task1"] < positions["task2"]);
        assert!(positions["task1"] < positions["task3"]);
        assert!(positions["task2"] < positions["task3"]);
    }

    #[test]
    fn test_duplicate_dependency_adds_one_edge() {
        let mut graph = graph_with(&[("a", &[]), ("b", &["a"])]);
        graph.add_dependency("b", "a").unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_dependency() {
        let mut graph = TaskGraph::new();
        graph.add_task("link", ());
        let err = graph.add_dependency("link", "compile").unwrap_err();
        assert_eq!(
            err,
            Error::MissingDependency {
                task: "link".to_string(),
                dependency: "compile".to_string(),
            }
        );
        assert!(matches!(
            graph.add_dependency("ghost", "link"),
            Err(Error::UnknownTask { .. })
        ));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = graph_with(&[("task1", &[]), ("task2", &["task1"]), ("task3", &["task2"])]);
        graph.add_dependency("task1", "task3").unwrap();

        assert!(graph.has_cycles());
        assert!(matches!(
            graph.topological_sort(),
            Err(Error::CycleDetected { .. })
        ));
        assert!(graph.get_parallel_groups().is_err());
    }

    #[test]
    fn test_parallel_groups() {
        // Level 0: task1, task2
        // Level 1: task3 (task1), task4 (task2)
        // Level 2: task5 (task3, task4)
        let graph = graph_with(&[
            ("task1", &[]),
            ("task2", &[]),
            ("task3", &["task1"]),
            ("task4", &["task2"]),
            ("task5", &["task3", "task4"]),
        ]);

        let groups = graph.get_parallel_groups().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[2].len(), 1);
        assert_eq!(groups[2][0].name, "task5");
    }

    #[test]
    fn test_diamond_dependency() {
        let graph = graph_with(&[
            ("root", &[]),
            ("left", &["root"]),
            ("right", &["root"]),
            ("join", &["left", "right"]),
        ]);

        let groups = graph.get_parallel_groups().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].len(), 2);

        let mut deps = graph.dependency_names("join");
        deps.sort_unstable();
        assert_eq!(deps, ["left", "right"]);
    }

    #[test]
    fn test_dependency_names_of_unknown_task_is_empty() {
        let graph: TaskGraph<()> = TaskGraph::new();
        assert!(graph.dependency_names("nothing").is_empty());
    }
}
