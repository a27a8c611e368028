// Domain layer - Entities and value types
pub mod dashboard;
pub mod render;
pub mod slash_command;
pub mod time_range;
