//! Validation utilities for task graphs.
//!
//! This module provides types and functions for validating task graph structure.

use crate::{Error, TaskGraph};
use petgraph::algo::tarjan_scc;

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid (no cycles).
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

impl<T> TaskGraph<T> {
    /// Validate the graph structure.
    ///
    /// Reports one [`Error::CycleDetected`] per strongly connected component
    /// that forms a cycle, naming its members.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let graph = self.inner();
        let mut errors = Vec::new();

        for component in tarjan_scc(graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.find_edge(idx, idx).is_some());
            if !is_cycle {
                continue;
            }

            let mut names: Vec<&str> = component
                .iter()
                .map(|&idx| graph[idx].name.as_str())
                .collect();
            names.sort_unstable();
            errors.push(Error::CycleDetected {
                message: format!("tasks {} depend on each other", names.join(", ")),
            });
        }

        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acyclic_graph_is_valid() {
        let mut graph = TaskGraph::new();
        graph.add_task("a", ());
        graph.add_task("b", ());
        graph.add_dependency("b", "a").unwrap();

        let result = graph.validate();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_cycle_members_are_reported() {
        let mut graph = TaskGraph::new();
        for name in ["a", "b", "c", "free"] {
            graph.add_task(name, ());
        }
        graph.add_dependency("b", "a").unwrap();
        graph.add_dependency("c", "b").unwrap();
        graph.add_dependency("a", "c").unwrap();

        let result = graph.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        let message = result.errors[0].to_string();
        assert!(message.contains("a, b, c"));
        assert!(!message.contains("free"));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = TaskGraph::new();
        graph.add_task("self", ());
        graph.add_dependency("self", "self").unwrap();

        let result = graph.validate();
        assert!(!result.is_valid);
        assert!(result.errors[0].to_string().contains("self"));
    }
}
