use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use todo_client::{QueryClient, QueryKey};

mod command;
use command::{DetailCommand, ListCommand};

/// Terminal front end for the todo service.
#[derive(Debug, Parser)]
#[command(name = "todo", version)]
struct Args {
    /// Base URL of the todo server.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,
}

/// The two screens of the UI.
#[derive(Debug, Clone, Copy)]
enum View {
    List,
    Detail(i64),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let client = QueryClient::new(&args.base_url);

    let stdin = io::stdin();
    let mut view = View::List;
    let mut line = String::new();

    loop {
        match view {
            View::List => render_list(&client).await,
            View::Detail(id) => render_detail(&client, id).await,
        }

        print!("> ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match view {
            View::List => match command::parse_list(input) {
                Ok(ListCommand::Quit) => break,
                Ok(cmd) => view = run_list_command(&client, cmd).await,
                Err(msg) => println!("{msg}"),
            },
            View::Detail(id) => match command::parse_detail(input) {
                Ok(DetailCommand::Quit) => break,
                Ok(cmd) => view = run_detail_command(&client, id, cmd).await,
                Err(msg) => println!("{msg}"),
            },
        }
    }

    Ok(())
}

async fn render_list(client: &QueryClient) {
    println!();
    println!("Todo List");
    match client.todos().await {
        Ok(todos) if todos.is_empty() => println!("  (nothing to do)"),
        Ok(todos) => {
            for todo in &todos {
                let mark = if todo.completed { "x" } else { " " };
                let pending = if client.is_updating(todo.id) {
                    " (updating)"
                } else {
                    ""
                };
                println!("  [{mark}] {:>3}  {}{pending}", todo.id, todo.title);
            }
        }
        Err(e) => println!("  Error: {e}"),
    }
}

async fn run_list_command(client: &QueryClient, cmd: ListCommand) -> View {
    match cmd {
        ListCommand::Refresh => client.invalidate(QueryKey::Todos),
        ListCommand::Add(title) => {
            if let Err(e) = client.create_todo(&title).await {
                println!("Error: {e}");
            }
        }
        ListCommand::Toggle(id) => toggle(client, id).await,
        ListCommand::Edit(id, title) => {
            if let Err(e) = client.rename_todo(id, &title).await {
                println!("Error: {e}");
            }
        }
        ListCommand::Delete(id) => {
            if let Err(e) = client.delete_todo(id).await {
                println!("Error: {e}");
            }
        }
        ListCommand::Open(id) => return View::Detail(id),
        ListCommand::Help => {
            println!("add <title> | toggle <id> | edit <id> <title> | rm <id> | open <id> | refresh | quit");
        }
        ListCommand::Quit => unreachable!("handled by the caller"),
    }
    View::List
}

/// Flip `completed` for one row. The checkbox is disabled while that row's
/// update is in flight; other rows stay interactive.
async fn toggle(client: &QueryClient, id: i64) {
    if client.is_updating(id) {
        println!("todo {id} is still updating, try again shortly");
        return;
    }

    let current = match client.todos().await {
        Ok(todos) => todos.into_iter().find(|t| t.id == id),
        Err(e) => {
            println!("Error: {e}");
            return;
        }
    };

    match current {
        Some(todo) => {
            if let Err(e) = client.set_completed(id, !todo.completed).await {
                println!("Error: {e}");
            }
        }
        None => println!("no todo with id {id}"),
    }
}

async fn render_detail(client: &QueryClient, id: i64) {
    println!();
    println!("Todo {id}");
    match client.todo(id).await {
        Ok(todo) => {
            println!("  Title:  {}", todo.title);
            println!(
                "  Status: {}",
                if todo.completed {
                    "Completed"
                } else {
                    "Not completed"
                }
            );
        }
        Err(e) => println!("  Error: {e}"),
    }
}

async fn run_detail_command(client: &QueryClient, id: i64, cmd: DetailCommand) -> View {
    match cmd {
        DetailCommand::Refresh => client.invalidate(QueryKey::Todo(id)),
        DetailCommand::Title(title) => match client.rename_todo(id, &title).await {
            Ok(_) => println!("Todo updated"),
            Err(e) => println!("Failed to update todo: {e}"),
        },
        DetailCommand::Delete => match client.delete_todo(id).await {
            Ok(()) => {
                // Deleting from the detail view navigates back to the list.
                println!("Todo deleted");
                return View::List;
            }
            Err(e) => println!("Failed to delete todo: {e}"),
        },
        DetailCommand::Back => return View::List,
        DetailCommand::Help => println!("title <new title> | rm | back | refresh | quit"),
        DetailCommand::Quit => unreachable!("handled by the caller"),
    }
    View::Detail(id)
}
