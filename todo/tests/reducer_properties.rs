//! Property tests for the todo reducer.

use proptest::prelude::*;
use std::sync::Arc;
use todo_state_core::http::HttpMethod;
use todo_state_core::reducer::Reducer;
use todo_state_testing::{RecordingHttpClient, SequentialIdGenerator, assertions};
use todomvc::{Todo, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};

fn env() -> TodoEnvironment {
    TodoEnvironment::new(
        Arc::new(SequentialIdGenerator::starting_after(1_000)),
        Arc::new(RecordingHttpClient::new()),
    )
}

fn todo_strategy() -> impl Strategy<Value = Todo> {
    ("[0-9]{1,3}", "\\PC{0,12}", any::<bool>())
        .prop_map(|(id, title, completed)| Todo::new(id, title).with_completed(completed))
}

fn todos_strategy() -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec(todo_strategy(), 0..12)
}

fn reduce(state: &mut TodoState, action: TodoAction) -> Vec<todo_state_core::effect::Effect<TodoAction>> {
    TodoReducer::new().reduce(state, action, &env()).into_vec()
}

proptest! {
    #[test]
    fn prop_load_replaces_exactly(before in todos_strategy(), loaded in todos_strategy()) {
        let mut state = TodoState::new(before);

        let effects = reduce(&mut state, TodoAction::Load { todos: loaded.clone() });

        prop_assert_eq!(state.todos, loaded);
        prop_assert!(effects.is_empty());
    }

    #[test]
    fn prop_create_appends_one_active_todo(before in todos_strategy(), title in "\\PC{0,20}") {
        let mut state = TodoState::new(before.clone());

        let effects = reduce(&mut state, TodoAction::Create { title: title.clone() });

        prop_assert_eq!(state.todos.len(), before.len() + 1);
        prop_assert_eq!(&state.todos[..before.len()], &before[..]);
        let created = &state.todos[before.len()];
        prop_assert_eq!(&created.title, &title);
        prop_assert!(!created.completed);
        assertions::assert_single_http_request(&effects, HttpMethod::Post, "/todos");
    }

    #[test]
    fn prop_remove_is_idempotent(before in todos_strategy(), id in "[0-9]{1,3}") {
        let id = TodoId::from(id);
        let mut once = TodoState::new(before);
        reduce(&mut once, TodoAction::Remove { id: id.clone() });

        let mut twice = once.clone();
        reduce(&mut twice, TodoAction::Remove { id: id.clone() });

        prop_assert_eq!(&once, &twice);
        prop_assert!(once.todos.iter().all(|todo| todo.id != id));
    }

    #[test]
    fn prop_complete_all_twice_restores_uniform_lists(
        todos in todos_strategy(),
        completed in any::<bool>(),
    ) {
        let uniform: Vec<Todo> = todos
            .into_iter()
            .map(|todo| todo.with_completed(completed))
            .collect();
        let mut state = TodoState::new(uniform.clone());

        reduce(&mut state, TodoAction::CompleteAll);
        reduce(&mut state, TodoAction::CompleteAll);

        prop_assert_eq!(state.todos, uniform);
    }

    #[test]
    fn prop_complete_all_on_mixed_list_completes_everything(todos in todos_strategy()) {
        prop_assume!(todos.iter().any(|todo| todo.completed));
        prop_assume!(todos.iter().any(|todo| !todo.completed));
        let mut state = TodoState::new(todos);

        reduce(&mut state, TodoAction::CompleteAll);

        prop_assert!(state.todos.iter().all(|todo| todo.completed));
    }

    #[test]
    fn prop_clear_completed_keeps_active_in_order(todos in todos_strategy()) {
        let expected: Vec<Todo> = todos.iter().filter(|todo| !todo.completed).cloned().collect();
        let all_done = !todos.is_empty() && todos.iter().all(|todo| todo.completed);
        let mut state = TodoState::new(todos);

        let effects = reduce(&mut state, TodoAction::ClearCompleted);

        prop_assert_eq!(state.todos, expected);
        prop_assert_eq!(assertions::http_requests(&effects).len(), usize::from(all_done));
    }
}
