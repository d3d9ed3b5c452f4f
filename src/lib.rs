// Entity - local AI agent over a self-bootstrapped Ollama runtime
// Library exports

pub mod cli;
pub mod config;
pub mod ollama;
pub mod platform;
pub mod web;
