//! Text rendering of the list.

use crate::types::{Todo, TodoId, TodoState};
use std::fmt::Write;

/// Shown exactly while the list is loading
pub const LOADING: &str = "Loading...";

/// Shown for a loaded, empty list
pub const EMPTY: &str = "No todos yet. Add one with `add <text>`.";

/// Renders the whole list, one line per todo
#[must_use]
pub fn render(state: &TodoState) -> String {
    if state.loading {
        return format!("{LOADING}\n");
    }
    if state.items.is_empty() {
        return format!("{EMPTY}\n");
    }

    let mut out = String::new();
    for (index, todo) in state.items.iter().enumerate() {
        render_item(&mut out, index + 1, todo);
    }
    let _ = writeln!(out, "{}/{} done", state.completed_count(), state.items.len());
    out
}

fn render_item(out: &mut String, number: usize, todo: &Todo) {
    let mark = if todo.completed { 'x' } else { ' ' };
    let _ = writeln!(out, "{number:>3}. [{mark}] {}", todo.text);
    if !todo.content.is_empty() {
        let _ = writeln!(out, "        {}", todo.content);
    }
}

/// Id of the todo shown at 1-based position `number`
#[must_use]
pub fn item_at(state: &TodoState, number: usize) -> Option<&TodoId> {
    number
        .checked_sub(1)
        .and_then(|index| state.items.get(index))
        .map(|todo| &todo.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_sync_testing::row;

    fn state() -> TodoState {
        let mut first = Todo::from(row("1", "A", false, 1));
        first.content = "<p>body</p>".to_string();
        TodoState::mounted(vec![first, Todo::from(row("2", "B", true, 0))])
    }

    #[test]
    fn loading_hides_list() {
        let mut state = state();
        state.loading = true;
        assert_eq!(render(&state), "Loading...\n");
    }

    #[test]
    fn empty_list_message() {
        assert_eq!(render(&TodoState::mounted(Vec::new())), format!("{EMPTY}\n"));
    }

    #[test]
    fn items_with_marks_and_content() {
        let rendered = render(&state());
        assert_eq!(
            rendered,
            "  1. [ ] A\n        <p>body</p>\n  2. [x] B\n1/2 done\n"
        );
    }

    #[test]
    fn positions_are_one_based() {
        let state = state();
        assert_eq!(item_at(&state, 1), Some(&TodoId::from("1")));
        assert_eq!(item_at(&state, 2), Some(&TodoId::from("2")));
        assert_eq!(item_at(&state, 0), None);
        assert_eq!(item_at(&state, 3), None);
    }
}
