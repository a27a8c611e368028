// Slash command as delivered by the chat platform

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlashCommand {
    pub command: String,
    pub text: String,
    pub channel_id: String,
    pub user_id: String,
    pub user_name: String,
}

impl SlashCommand {
    /// First token is the dashboard name, the optional second one a time range.
    /// Anything after that is ignored.
    pub fn arguments(&self) -> (&str, Option<&str>) {
        let mut tokens = self.text.split_whitespace();
        let name = tokens.next().unwrap_or("");
        (name, tokens.next())
    }
}
