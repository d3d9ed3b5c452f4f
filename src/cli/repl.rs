// Interactive terminal loop: chat turns and "run:" commands

use anyhow::Result;
use std::io::{self, IsTerminal, Write};

use super::system_prompt;
use crate::ollama::{ChatMessage, OllamaClient};
use crate::platform;

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Quit,
    Command(&'a str),
    Chat(&'a str),
    Empty,
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ReplInput::Quit;
    }
    // Keywords match in any case; the command itself keeps its case
    if let Some(prefix) = line.get(..4) {
        if prefix.eq_ignore_ascii_case("run:") {
            return ReplInput::Command(line[4..].trim());
        }
    }
    ReplInput::Chat(line)
}

/// Terminal front end over a ready Ollama runtime.
///
/// Conversation history is threaded into every chat call, and command output
/// joins the history as assistant turns so the model can refer back to it.
pub struct Repl {
    client: OllamaClient,
    model: String,
    history: Vec<ChatMessage>,
    is_interactive: bool,
}

impl Repl {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        let is_interactive = io::stdout().is_terminal();
        Self {
            client,
            model: model.into(),
            history: vec![ChatMessage::system(system_prompt())],
            is_interactive,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.is_interactive {
            println!(
                "Entity agent on {} (model: {})",
                platform::operating_system(),
                self.model
            );
            println!("Chat freely. Prefix shell commands with 'run:'. Type 'exit' to quit.");
        }

        loop {
            if self.is_interactive {
                print!("you> ");
                io::stdout().flush()?;
            }

            let mut line = String::new();
            if io::stdin().read_line(&mut line)? == 0 {
                // EOF: piped input ran out
                break;
            }

            match parse_input(&line) {
                ReplInput::Empty => continue,
                ReplInput::Quit => {
                    if self.is_interactive {
                        println!("Goodbye!");
                    }
                    break;
                }
                ReplInput::Command(command) => self.handle_command(command).await,
                ReplInput::Chat(message) => self.handle_chat(message).await,
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: &str) {
        if command == "list_processes" {
            let processes = platform::list_processes();
            for p in &processes {
                println!("{:>8}  {:<16} {}", p.pid, p.username, p.name);
            }
            self.remember_exchange(
                format!("run: {}", command),
                format!("Listed {} running processes.", processes.len()),
            );
            return;
        }

        let output = platform::execute_command(command).await;
        if !output.stdout.is_empty() {
            print!("{}", output.stdout);
        }
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
        if output.return_code != 0 {
            println!("(exit code {})", output.return_code);
        }

        let mut transcript = format!("$ {}\n{}", command, output.stdout);
        if !output.stderr.is_empty() {
            transcript.push_str(&output.stderr);
        }
        if output.return_code != 0 {
            transcript.push_str(&format!("(exit code {})\n", output.return_code));
        }
        self.remember_exchange(format!("run: {}", command), transcript);
    }

    async fn handle_chat(&mut self, message: &str) {
        self.history.push(ChatMessage::user(message));
        match self.client.chat(&self.model, &self.history).await {
            Ok(reply) => {
                println!("{}", reply);
                self.history.push(ChatMessage::assistant(reply));
            }
            Err(err) => {
                // Keep the loop alive and the history consistent
                eprintln!("Error: {}", err);
                self.history.pop();
            }
        }
    }

    fn remember_exchange(&mut self, user: String, assistant: String) {
        self.history.push(ChatMessage::user(user));
        self.history.push(ChatMessage::assistant(assistant));
    }
}
