//! In-process execution queue backed by a [`TaskGraph`].

use crate::{
    Error, ParallelGroups, Result, TaskGraph, TaskNodeData, TopologicalOrder, ValidationResult,
};
use parking_lot::Mutex;
use runq_task_cache::{BoxError, ExecutionQueue};
use std::collections::HashSet;
use tracing::debug;

/// One accepted registration, in the order the queue received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Name of the registered task.
    pub task: String,
    /// Names of its direct dependencies, deduplicated, in call order.
    pub dependencies: Vec<String>,
    /// Whether the task was eligible for scheduling right away.
    pub dispatch: bool,
}

struct QueueState<T> {
    graph: TaskGraph<T>,
    held: HashSet<String>,
    registrations: Vec<Registration>,
}

/// Thread-safe queue that grows a task graph one registration at a time.
///
/// Tasks are identified by [`TaskNodeData::node_name`]. A dependency must be
/// registered before any task that names it, which keeps the graph acyclic
/// for every sequence of accepted registrations.
pub struct GraphQueue<T> {
    state: Mutex<QueueState<T>>,
}

impl<T: TaskNodeData + Clone> GraphQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                graph: TaskGraph::new(),
                held: HashSet::new(),
                registrations: Vec::new(),
            }),
        }
    }

    /// Register `task` after `dependencies`.
    ///
    /// When `dispatch` is `false` the task is held until [`release`](Self::release)
    /// is called for it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if a task with the same name was
    /// already registered and [`Error::MissingDependencies`] if any
    /// dependency was not. A rejected registration leaves the queue unchanged.
    pub fn try_register(&self, task: &T, dependencies: &[T], dispatch: bool) -> Result<()> {
        let name = task.node_name();
        let mut state = self.state.lock();

        if state.graph.contains_task(name) {
            return Err(Error::DuplicateTask {
                task: name.to_string(),
            });
        }

        let mut dependency_names: Vec<String> = Vec::with_capacity(dependencies.len());
        let mut missing = Vec::new();
        for dependency in dependencies {
            let dep_name = dependency.node_name();
            if dependency_names.iter().any(|seen| seen == dep_name) {
                continue;
            }
            if !state.graph.contains_task(dep_name) {
                missing.push((name.to_string(), dep_name.to_string()));
            }
            dependency_names.push(dep_name.to_string());
        }
        if !missing.is_empty() {
            return Err(Error::MissingDependencies { missing });
        }

        state.graph.add_task(name, task.clone());
        for dep_name in &dependency_names {
            state.graph.add_dependency(name, dep_name)?;
        }
        if !dispatch {
            state.held.insert(name.to_string());
        }

        debug!(
            task = name,
            dependencies = dependency_names.len(),
            dispatch,
            "Registered task"
        );
        state.registrations.push(Registration {
            task: name.to_string(),
            dependencies: dependency_names,
            dispatch,
        });
        Ok(())
    }

    /// Make a held task eligible for scheduling.
    ///
    /// Returns `true` if the task was held, `false` if it was already dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if no task with this name was registered.
    pub fn release(&self, name: &str) -> Result<bool> {
        let mut state = self.state.lock();
        if !state.graph.contains_task(name) {
            return Err(Error::UnknownTask {
                task: name.to_string(),
            });
        }
        let released = state.held.remove(name);
        if released {
            debug!(task = name, "Released held task");
        }
        Ok(released)
    }

    /// Whether the named task is registered and held.
    #[must_use]
    pub fn is_held(&self, name: &str) -> bool {
        self.state.lock().held.contains(name)
    }

    /// Names of all held tasks, sorted.
    #[must_use]
    pub fn held(&self) -> Vec<String> {
        let mut held: Vec<String> = self.state.lock().held.iter().cloned().collect();
        held.sort_unstable();
        held
    }

    /// Whether a task with this name was registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().graph.contains_task(name)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.state.lock().graph.task_count()
    }

    /// The registered task with this name.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<T> {
        self.state
            .lock()
            .graph
            .get_node_by_name(name)
            .map(|node| node.task.clone())
    }

    /// Every accepted registration, in arrival order.
    #[must_use]
    pub fn registrations(&self) -> Vec<Registration> {
        self.state.lock().registrations.clone()
    }

    /// All registered tasks in dependency order.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn execution_order(&self) -> Result<TopologicalOrder<T>> {
        self.state.lock().graph.topological_sort()
    }

    /// Registered tasks grouped by dependency level.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn parallel_groups(&self) -> Result<ParallelGroups<T>> {
        self.state.lock().graph.get_parallel_groups()
    }

    /// Tasks that may run now, in dependency order.
    ///
    /// A task is excluded when it is held or when anything it depends on,
    /// directly or transitively, is held.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn schedulable(&self) -> Result<TopologicalOrder<T>> {
        let state = self.state.lock();
        let order = state.graph.topological_sort()?;

        // Dependencies come first in the order, so one pass settles every task
        let mut blocked: HashSet<&str> = HashSet::new();
        let mut ready = Vec::new();
        for node in &order {
            let is_blocked = state.held.contains(&node.name)
                || state
                    .graph
                    .dependency_names(&node.name)
                    .into_iter()
                    .any(|dep| blocked.contains(dep));
            if is_blocked {
                blocked.insert(node.name.as_str());
            } else {
                ready.push(node.clone());
            }
        }
        Ok(ready)
    }

    /// Transitive dependency closure of the named task, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTask`] if no task with this name was registered.
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<String>> {
        let mut closure: Vec<String> = self
            .state
            .lock()
            .graph
            .transitive_dependencies(name)?
            .into_iter()
            .collect();
        closure.sort_unstable();
        Ok(closure)
    }

    /// Check the registered graph for cycles.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        self.state.lock().graph.validate()
    }
}

impl<T: TaskNodeData + Clone> Default for GraphQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TaskNodeData + Clone> ExecutionQueue<T> for GraphQueue<T> {
    fn register(
        &self,
        task: &T,
        dependencies: &[T],
        dispatch: bool,
    ) -> std::result::Result<(), BoxError> {
        self.try_register(task, dependencies, dispatch)
            .map_err(Into::into)
    }
}

impl<T> std::fmt::Debug for GraphQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("GraphQueue")
            .field("tasks", &state.graph.task_count())
            .field("held", &state.held.len())
            .finish_non_exhaustive()
    }
}
