//! Any sequence of intents leaves the list equal to the remote table once
//! calls and change notifications have settled.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use todo_sync::{Todo, TodoController, TodoRepository};
use todo_sync_testing::properties::{blank_text, html_content, todo_text};
use todo_sync_testing::{ScriptedRemote, eventually, row};

#[derive(Clone, Debug)]
enum Op {
    Add(String, String),
    Toggle(usize),
    Remove(usize),
    Edit(usize, String, String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (todo_text(), html_content()).prop_map(|(text, content)| Op::Add(text, content)),
        1 => blank_text().prop_map(|text| Op::Add(text, String::new())),
        2 => (0usize..8).prop_map(Op::Toggle),
        2 => (0usize..8).prop_map(Op::Remove),
        1 => (0usize..8, todo_text(), html_content())
            .prop_map(|(index, text, content)| Op::Edit(index, text, content)),
    ]
}

async fn apply(controller: &TodoController, op: Op) {
    let items = controller.items().await;
    let pick = |index: usize| items.get(index).map(|todo| todo.id.clone());

    let handle = match op {
        Op::Add(text, content) => controller.add(text, content).await,
        Op::Toggle(index) => match pick(index) {
            Some(id) => controller.toggle(&id).await,
            None => return,
        },
        Op::Remove(index) => match pick(index) {
            Some(id) => controller.remove(&id).await,
            None => return,
        },
        Op::Edit(index, text, content) => match pick(index) {
            Some(id) => controller.edit(&id, text, content).await,
            None => return,
        },
    };
    handle.unwrap().wait().await;
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn list_converges_to_remote(ops in prop::collection::vec(op(), 1..12)) {
        let converged = runtime().block_on(async move {
            let remote = ScriptedRemote::with_rows(vec![
                row("1", "A", false, 20),
                row("2", "B", true, 10),
                row("3", "C", false, 0),
            ]);
            let controller =
                TodoController::new(TodoRepository::from_remote(Arc::new(remote.clone())));
            controller.mount().await.unwrap().wait().await;

            for op in ops {
                apply(&controller, op).await;
            }

            eventually(Duration::from_secs(2), || async {
                let expected: Vec<Todo> = remote.rows().into_iter().map(Todo::from).collect();
                controller.items().await == expected
            })
            .await
        });

        prop_assert!(converged);
    }
}
