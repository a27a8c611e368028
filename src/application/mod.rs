// Application layer - Use cases and ports
pub mod chat_uploader;
pub mod command_service;
pub mod dashboard_registry;
pub mod delivery;
pub mod panel_renderer;

#[cfg(test)]
pub mod testing;
