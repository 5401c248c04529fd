//! Interactive list screen.
//!
//! Every line typed is a keystroke-level search update; `:N` opens row N,
//! `:a TITLE` adds a task, `:q` leaves. The list follows storage through a
//! `WatchedStore` subscription, and the screen state is released on exit.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use todolist_lib::{Binding, Task, TaskListView, TaskStore, WatchedStore};

use crate::cli::Context;
use crate::error::Result;
use crate::format::{format_task_line, html_to_plain};

const PROMPT: &str = "search (:N open, :a TITLE add, :q quit)> ";

/// Execute the browse command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the terminal fails.
pub fn execute(ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let mut backend = ctx.open_store(&config)?;
    let stdin = io::stdin();
    browse(backend.store(), stdin.lock(), io::stdout().lock())?;
    backend.finish()
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Open(usize),
    Add(&'a str),
    Search(&'a str),
}

fn parse(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if matches!(trimmed, ":q" | ":quit") {
        return Input::Quit;
    }
    if let Some(title) = trimmed.strip_prefix(":a ") {
        return Input::Add(title.trim());
    }
    if let Some(Ok(n)) = trimmed.strip_prefix(':').map(str::parse::<usize>) {
        return Input::Open(n);
    }
    Input::Search(line)
}

/// Run the screen over `input`/`out` against `store`.
///
/// # Errors
///
/// Returns I/O errors from the terminal, or a storage error from the
/// initial read.
pub fn browse<S, R, W>(store: S, input: R, mut out: W) -> Result<()>
where
    S: TaskStore,
    R: BufRead,
    W: Write,
{
    let opened: Rc<RefCell<Option<Task>>> = Rc::default();
    let sink = Rc::clone(&opened);
    let view = TaskListView::new(move |task: &Task| *sink.borrow_mut() = Some(task.clone()));
    let screen = Rc::new(RefCell::new(Binding::new("browse", view)));

    let mut watched = WatchedStore::new(store);
    let listener = Rc::clone(&screen);
    let subscription = watched.subscribe(move |tasks| {
        if let Ok(view) = listener.borrow_mut().get_mut() {
            view.set_tasks(tasks);
        }
    })?;

    render(&screen.borrow(), &mut out)?;
    for line in input.lines() {
        let line = line?;
        match parse(&line) {
            Input::Quit => break,
            Input::Search(query) => screen.borrow_mut().get_mut()?.set_query(query),
            Input::Open(row) => {
                let found = row > 0 && screen.borrow_mut().get_mut()?.select(row - 1);
                match opened.borrow_mut().take() {
                    Some(task) if found => show_task(&task, &mut out)?,
                    _ => writeln!(out, "No row {row}.")?,
                }
            }
            Input::Add(title) => match watched.insert(&Task::new(title, None)) {
                Ok(task) => writeln!(out, "Created #{}: {}", task.id, task.title)?,
                Err(e) => writeln!(out, "{e}")?,
            },
        }
        render(&screen.borrow(), &mut out)?;
    }

    watched.unsubscribe(subscription);
    screen.borrow_mut().dispose();
    tracing::debug!("Browse screen closed");
    Ok(())
}

fn render<F: FnMut(&Task)>(screen: &Binding<TaskListView<F>>, out: &mut impl Write) -> Result<()> {
    let view = screen.get()?;
    writeln!(out)?;
    if view.is_empty() {
        writeln!(out, "No tasks yet.")?;
    } else {
        for (i, task) in view.shown().iter().enumerate() {
            writeln!(out, "{:>3}. {}", i + 1, format_task_line(task))?;
        }
        writeln!(out, "{} of {} shown", view.shown().len(), view.total())?;
    }
    write!(out, "{PROMPT}")?;
    out.flush()?;
    Ok(())
}

fn show_task(task: &Task, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n#{} {}", task.id, task.title)?;
    if let Some(desc) = task.description.as_deref().map(|d| html_to_plain(d, 80)) {
        if !desc.is_empty() {
            writeln!(out, "{desc}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todolist_lib::InMemoryStore;

    fn run(store: &mut InMemoryStore, keys: &str) -> String {
        let mut out = Vec::new();
        browse(store, keys.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn seeded() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.insert(&Task::new("Take aspirin", Some("<p>Daily</p>".to_string()))).unwrap();
        store.insert(&Task::new("Blood test", None)).unwrap();
        store
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse(":q"), Input::Quit);
        assert_eq!(parse(":2"), Input::Open(2));
        assert_eq!(parse(":a  Refill "), Input::Add("Refill"));
        assert_eq!(parse("asp"), Input::Search("asp"));
        assert_eq!(parse(":x"), Input::Search(":x"));
    }

    #[test]
    fn test_search_and_open() {
        let mut store = seeded();
        let screen = run(&mut store, "asp\n:1\n:q\n");
        assert!(screen.contains("2 of 2 shown"));
        assert!(screen.contains("1 of 2 shown"));
        assert!(screen.contains("Daily"));
    }

    #[test]
    fn test_add_refreshes_list() {
        let mut store = seeded();
        let screen = run(&mut store, ":a Refill prescription\n");
        assert!(screen.contains("Created #3: Refill prescription"));
        assert!(screen.contains("3 of 3 shown"));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_empty_placeholder_and_bad_row() {
        let mut store = InMemoryStore::new();
        let screen = run(&mut store, ":4\n");
        assert!(screen.contains("No tasks yet."));
        assert!(screen.contains("No row 4."));
    }
}
