//! Pure derived views of the todo list.
//!
//! Selectors are recomputed on demand and never stored in state.

use crate::types::{Todo, TodoState};

/// Completed todos, in list order
#[must_use]
pub fn select_completed(todos: &[Todo]) -> Vec<&Todo> {
    todos.iter().filter(|todo| todo.completed).collect()
}

/// Todos not completed yet, in list order
#[must_use]
pub fn select_not_completed(todos: &[Todo]) -> Vec<&Todo> {
    todos.iter().filter(|todo| !todo.completed).collect()
}

/// Todos visible under the state's current filter
#[must_use]
pub fn select_visible(state: &TodoState) -> Vec<&Todo> {
    state
        .todos
        .iter()
        .filter(|todo| state.filter.matches(todo))
        .collect()
}

/// True when the list is non-empty and every todo is completed
///
/// An empty list is never "all completed".
#[must_use]
pub fn all_completed(todos: &[Todo]) -> bool {
    !todos.is_empty() && todos.iter().all(|todo| todo.completed)
}

/// Number of todos not completed yet
#[must_use]
pub fn remaining_count(todos: &[Todo]) -> usize {
    todos.iter().filter(|todo| !todo.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Filter;

    fn sample() -> Vec<Todo> {
        vec![
            Todo::new("1", "a").with_completed(true),
            Todo::new("2", "b"),
            Todo::new("3", "c").with_completed(true),
        ]
    }

    fn ids(todos: &[&Todo]) -> Vec<String> {
        todos.iter().map(|todo| todo.id.to_string()).collect()
    }

    #[test]
    fn completed_and_not_completed_partition_in_order() {
        let todos = sample();

        assert_eq!(ids(&select_completed(&todos)), ["1", "3"]);
        assert_eq!(ids(&select_not_completed(&todos)), ["2"]);
    }

    #[test]
    fn empty_list_selects_nothing() {
        assert!(select_completed(&[]).is_empty());
        assert!(select_not_completed(&[]).is_empty());
        assert!(!all_completed(&[]));
        assert_eq!(remaining_count(&[]), 0);
    }

    #[test]
    fn visible_follows_filter() {
        let state = TodoState::new(sample());

        assert_eq!(select_visible(&state).len(), 3);
        assert_eq!(
            ids(&select_visible(&state.clone().with_filter(Filter::Active))),
            ["2"]
        );
        assert_eq!(
            ids(&select_visible(&state.with_filter(Filter::Completed))),
            ["1", "3"]
        );
    }

    #[test]
    fn all_completed_requires_every_todo() {
        let mut todos = sample();
        assert!(!all_completed(&todos));
        assert_eq!(remaining_count(&todos), 1);

        todos[1].completed = true;
        assert!(all_completed(&todos));
        assert_eq!(remaining_count(&todos), 0);
    }
}
