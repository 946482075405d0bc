//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod handler;

pub use dispatcher::MessageDispatcher;
pub use handler::CustomCommandsHandler;
