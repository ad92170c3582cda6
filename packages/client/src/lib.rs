//! Izakaya chat client library.
//!
//! A room-based chat client with an embedded turn-based game
//! (tic-tac-toe), synchronized across clients through a subscribable
//! remote store. Every client runs the full loop independently: UI
//! action -> state transition -> gateway write -> store broadcast ->
//! subscription delivery -> state transition.

pub mod app;
pub mod demo;
pub mod domain;
pub mod infrastructure;
pub mod state;
pub mod usecase;

// Re-export the client entry point
pub use app::{Client, ClientError};
