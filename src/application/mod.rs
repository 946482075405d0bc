//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Custom command storage access
//! - Errors: Domain-specific errors
//! - Messaging: Dispatching and the custom command responder

pub mod errors;
pub mod services;
pub mod messaging;
