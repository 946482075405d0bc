//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (CustomCommand, Message, User)
//! - Traits: Abstractions for infrastructure (Bot, HashStore, hosts)

pub mod entities;
pub mod traits;
