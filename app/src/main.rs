//! Interactive todo list in the terminal.
//!
//! Reads commands from stdin and re-renders the list every time a fetch
//! completes, including refetches caused by changes from other clients.

use anyhow::Context;
use std::time::Duration;
use todo_sync::cli::{self, Command};
use todo_sync::{AppConfig, TodoAction, TodoController, view};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_sync=info,todo_sync_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let repository = config
        .backend
        .connect()
        .await
        .context("failed to connect to the todo store")?;

    let controller = TodoController::new(repository);
    let renderer = tokio::spawn(render_on_fetch(controller.clone(), controller.updates()));

    controller.mount().await?.wait().await;
    println!("{}", cli::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match cli::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => run(&controller, command).await?,
            Err(cli::ParseError::Empty) => {},
            Err(error) => eprintln!("{error}"),
        }
    }

    controller.unmount().await?;
    controller
        .shutdown(SHUTDOWN_TIMEOUT)
        .await
        .context("pending calls did not finish")?;
    renderer.abort();
    Ok(())
}

async fn run(controller: &TodoController, command: Command) -> anyhow::Result<()> {
    let state = controller.snapshot().await;
    let mut handle = match command {
        Command::Add { text, content } => {
            if text.trim().is_empty() {
                eprintln!("a todo needs some text");
                return Ok(());
            }
            controller.add(text, content).await?
        },
        Command::Toggle(number) => match view::item_at(&state, number) {
            Some(id) => controller.toggle(id).await?,
            None => return no_such_item(number),
        },
        Command::Remove(number) => match view::item_at(&state, number) {
            Some(id) => controller.remove(id).await?,
            None => return no_such_item(number),
        },
        Command::Edit {
            number,
            text,
            content,
        } => match view::item_at(&state, number) {
            Some(id) => controller.edit(id, text, content).await?,
            None => return no_such_item(number),
        },
        Command::List => {
            print!("{}", view::render(&state));
            return Ok(());
        },
        Command::Help => {
            println!("{}", cli::HELP);
            return Ok(());
        },
        Command::Quit => return Ok(()),
    };
    handle.wait().await;
    Ok(())
}

fn no_such_item(number: usize) -> anyhow::Result<()> {
    eprintln!("there is no item {number}");
    Ok(())
}

async fn render_on_fetch(controller: TodoController, mut updates: broadcast::Receiver<TodoAction>) {
    loop {
        match updates.recv().await {
            Ok(action) if action.is_fetch() => print!("{}", view::render(&controller.snapshot().await)),
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {},
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use todo_sync::TodoRepository;
    use todo_sync_testing::{RemoteOp, ScriptedRemote};

    #[tokio::test]
    async fn blank_add_is_not_sent() {
        let remote = ScriptedRemote::with_rows(Vec::new());
        let controller = TodoController::new(TodoRepository::from_remote(Arc::new(remote.clone())));
        controller.mount().await.unwrap().wait().await;
        controller.shutdown(Duration::from_secs(1)).await.unwrap();

        // a stopped controller rejects every action it is sent
        let blank = Command::Add {
            text: "  ".to_string(),
            content: String::new(),
        };
        assert!(run(&controller, blank).await.is_ok());
        assert_eq!(remote.count(RemoteOp::Insert), 0);
    }
}
