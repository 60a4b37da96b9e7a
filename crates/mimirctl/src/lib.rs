//! Mimir Control - user-facing CLI for the Mimir assistant.

pub mod repl;
