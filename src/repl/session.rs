//! Console read loop.
//!
//! Holds the menu cursor, reads one line at a time and hands leaves to the
//! dispatcher. The cursor only moves on `..` and on entering a branch.

use super::tree::{Action, MenuTree, NodeId, Resolution};
use crate::repl::executor::Dispatcher;
use crate::ui::formatter::{print_info, print_success, print_warning, Formatter};
use crate::ui::input::{InputError, Prompter};

/// Whether the loop keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct ReplSession<P: Prompter> {
    prompter: P,
    tree: MenuTree,
    cursor: NodeId,
    dispatcher: Dispatcher,
}

impl<P: Prompter> ReplSession<P> {
    pub fn new(prompter: P, tree: MenuTree, dispatcher: Dispatcher) -> Self {
        let cursor = tree.root();
        Self {
            prompter,
            tree,
            cursor,
            dispatcher,
        }
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Prompt shown at the current node, e.g. `events/list> `.
    pub fn prompt(&self) -> String {
        format!("{}> ", self.tree.name(self.cursor))
    }

    /// Read and handle lines until `exit` or end of input, then release the
    /// signer.
    pub async fn run(&mut self) {
        self.print_welcome();

        loop {
            self.prompter
                .set_completions(self.tree.completions(self.cursor));
            let prompt = self.prompt();
            match self.prompter.read_line(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.prompter.add_history(line.trim());
                    if self.handle_line(&line).await == Flow::Exit {
                        break;
                    }
                }
                Err(InputError::Interrupted) => {
                    print_info("Use 'exit' or Ctrl+D to quit");
                }
                Err(InputError::Eof) => break,
                Err(e) => {
                    print_warning(format!("Error: {}", e));
                    break;
                }
            }
        }

        self.dispatcher.shutdown().await;
        print_success("Goodbye!");
    }

    /// Resolve one line at the cursor and act on it.
    pub async fn handle_line(&mut self, line: &str) -> Flow {
        match self.tree.resolve(self.cursor, line) {
            Resolution::Subtree(id) => {
                self.cursor = id;
                Flow::Continue
            }
            Resolution::NotFound => {
                print_warning(format!("command not found: {}", line.trim()));
                Flow::Continue
            }
            Resolution::Leaf(id) => {
                let Some(action) = self.tree.node(id).action().cloned() else {
                    return Flow::Continue;
                };
                match action {
                    Action::Exit => Flow::Exit,
                    Action::Help => {
                        println!("{}", self.tree.help(self.cursor));
                        Flow::Continue
                    }
                    Action::Up => {
                        if let Some(parent) = self.tree.node(self.cursor).parent() {
                            self.cursor = parent;
                        }
                        Flow::Continue
                    }
                    action => {
                        let path = self.tree.name(id);
                        match self
                            .dispatcher
                            .dispatch(&action, &path, &mut self.prompter)
                            .await
                        {
                            Err(e) if e.is_eof() => Flow::Exit,
                            _ => Flow::Continue,
                        }
                    }
                }
            }
        }
    }

    fn print_welcome(&self) {
        println!("{}", Formatter::success("=== Smart Contract Console ==="));
        println!(
            "{}",
            Formatter::info("Type 'help' for available commands, '..' to go up")
        );
    }
}
