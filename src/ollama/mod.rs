// Bootstrap and client plumbing for the local Ollama runtime
//
// `ensure_ready` drives the whole pipeline: locate the CLI (installing it
// when missing), verify it runs, make sure the model artifact is present,
// and make sure the background server answers before anything talks to it.

pub mod client;
pub mod command;
pub mod error;
pub mod install;
pub mod locate;
pub mod model;
pub mod ready;
pub mod server;

pub use client::{ChatMessage, OllamaClient};
pub use command::{CommandResult, CommandRunner, SystemRunner};
pub use error::SetupError;
pub use install::{InstallOutcome, Installer, PlatformInstaller};
pub use locate::{find_in_search_path, Platform, RuntimeLocator, RuntimeTarget};
pub use model::ModelEnsurer;
pub use ready::{ensure_ready, CliHandle, ReadinessOrchestrator};
pub use server::{ProbeState, Prober, ProcessBackend, ServerBackend, ServerSupervisor};
