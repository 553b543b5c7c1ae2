//! Traversal algorithms and types for task graphs.
//!
//! This module provides types and utilities for traversing task graphs
//! in various orders.

use crate::{Error, GraphNode, Result, TaskGraph};
use petgraph::Direction;
use std::collections::HashSet;

/// A topologically sorted sequence of task nodes.
///
/// This type represents tasks in an order where all dependencies
/// come before the tasks that depend on them.
pub type TopologicalOrder<T> = Vec<GraphNode<T>>;

/// Groups of tasks that can execute in parallel.
///
/// Each inner vector contains tasks that have no dependencies on each other
/// and can safely execute concurrently. The outer vector is ordered by
/// dependency level - all tasks in group N must complete before tasks
/// in group N+1 can start.
pub type ParallelGroups<T> = Vec<Vec<GraphNode<T>>>;

impl<T> TaskGraph<T> {
    /// Names of every task `name` depends on, directly or transitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if `name` is not in the graph.
    pub fn transitive_dependencies(&self, name: &str) -> Result<HashSet<String>> {
        let graph = self.inner();
        let Some(start) = self.get_node_index(name) else {
            return Err(Error::UnknownTask {
                task: name.to_string(),
            });
        };

        let mut all = HashSet::new();
        let mut frontier = vec![start];

        while let Some(current) = frontier.pop() {
            for dep in graph.neighbors_directed(current, Direction::Incoming) {
                if all.insert(graph[dep].name.clone()) {
                    frontier.push(dep);
                }
            }
        }

        Ok(all)
    }
}
