// Domain layer - Core business logic

pub mod errors;
pub mod markers;
pub mod model;
pub mod rules;
