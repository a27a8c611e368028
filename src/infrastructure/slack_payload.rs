// Slash command webhook body (application/x-www-form-urlencoded)
use crate::domain::slash_command::SlashCommand;
use crate::error::{AppError, AppResult};
use url::form_urlencoded;

pub fn parse_slash_command(body: &[u8]) -> AppResult<SlashCommand> {
    let mut command = None;
    let mut channel_id = None;
    let mut parsed = SlashCommand::default();

    for (key, value) in form_urlencoded::parse(body) {
        match key.as_ref() {
            "command" => command = Some(value.into_owned()),
            "channel_id" => channel_id = Some(value.into_owned()),
            "text" => parsed.text = value.into_owned(),
            "user_id" => parsed.user_id = value.into_owned(),
            "user_name" => parsed.user_name = value.into_owned(),
            _ => {}
        }
    }

    parsed.command = command
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Payload("missing command".to_string()))?;
    parsed.channel_id = channel_id
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Payload("missing channel_id".to_string()))?;

    Ok(parsed)
}
