pub mod error;
pub mod server;
pub mod state;
pub mod wallet;

mod app;
mod handlers;
mod queue;
mod router;
mod types;

pub use types::Connection;
