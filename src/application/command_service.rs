// Command service - Turns a verified slash command into an acknowledgement
use crate::application::chat_uploader::ChatUploader;
use crate::application::dashboard_registry::DashboardRegistry;
use crate::application::delivery::DeliveryTask;
use crate::application::panel_renderer::PanelRenderer;
use crate::domain::render::{RenderOptions, RenderRequest};
use crate::domain::slash_command::SlashCommand;
use crate::domain::time_range::parse_relative_offset;
use std::sync::Arc;

pub const DEFAULT_TRIGGER: &str = "/graph";

pub const MSG_ACCEPTED: &str = "taking graph...";
pub const MSG_NO_GRAPH: &str = "no graph";
pub const MSG_INVALID_TIME_RANGE: &str = "time range is invalid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// Synchronous acknowledgement text for the chat platform.
    Message(&'static str),
    /// Not our command: answer with an empty 200.
    Ignored,
}

#[derive(Clone)]
pub struct CommandService {
    registry: Arc<DashboardRegistry>,
    renderer: Arc<dyn PanelRenderer>,
    uploader: Arc<dyn ChatUploader>,
    trigger: String,
}

impl CommandService {
    pub fn new(
        registry: Arc<DashboardRegistry>,
        renderer: Arc<dyn PanelRenderer>,
        uploader: Arc<dyn ChatUploader>,
        trigger: String,
    ) -> Self {
        Self {
            registry,
            renderer,
            uploader,
            trigger,
        }
    }

    /// Must be called from within a tokio runtime; an accepted command spawns
    /// its delivery task before returning.
    pub fn dispatch(&self, command: &SlashCommand) -> CommandReply {
        if command.command != self.trigger {
            tracing::debug!(command = %command.command, "ignoring unknown slash command");
            return CommandReply::Ignored;
        }

        let (name, range) = command.arguments();

        let options = match range.map(parse_relative_offset).transpose() {
            Ok(Some(from)) => RenderOptions::since(from),
            Ok(None) => RenderOptions::default(),
            Err(e) => {
                tracing::info!(user = %command.user_name, "{}", e);
                return CommandReply::Message(MSG_INVALID_TIME_RANGE);
            }
        };

        let dashboard = match self.registry.resolve(name) {
            Ok(dashboard) => dashboard,
            Err(e) => {
                tracing::info!(user = %command.user_name, "{}", e);
                return CommandReply::Message(MSG_NO_GRAPH);
            }
        };

        tracing::info!(
            dashboard = %dashboard.name,
            channel = %command.channel_id,
            user = %command.user_name,
            user_id = %command.user_id,
            from = options.from.as_deref().unwrap_or("-"),
            "graph requested"
        );

        DeliveryTask::new(
            self.renderer.clone(),
            self.uploader.clone(),
            RenderRequest::new(dashboard, options),
            command.channel_id.clone(),
        )
        .spawn();

        CommandReply::Message(MSG_ACCEPTED)
    }
}
