/// Module containing the handler trait
pub mod handler;
/// Module containing the logic for the server
pub mod server;
/// Module containing the handler chain
pub mod task;

pub use handler::Handler;
pub use server::{Server, ShutdownHandle};
pub use task::{Next, TaskList};
