// CLI module
// Public interface for the terminal REPL

mod repl;

pub use repl::Repl;

use crate::platform;

/// System prompt shared by the REPL and the web chat endpoint. Names the
/// host OS and the two things the agent can actually do.
pub fn system_prompt() -> String {
    format!(
        "You are Entity, a local AI agent running on {}. You answer questions \
         conversationally. The user can also execute shell commands with the \
         'run:' prefix and list running processes; the results of those \
         commands are part of the conversation.",
        platform::operating_system()
    )
}
