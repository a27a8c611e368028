// Application state for HTTP handlers
use crate::application::command_service::CommandService;
use secrecy::SecretString;

#[derive(Clone)]
pub struct AppState {
    pub command_service: CommandService,
    pub signing_secret: SecretString,
}
