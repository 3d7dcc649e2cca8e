//! Domain layer - scan entities, value objects, and collaborator contracts

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use services::*;
pub use value_objects::*;
