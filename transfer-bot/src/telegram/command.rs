/// A recognised bot command with its whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    SetSource(Vec<String>),
    SetTarget(Vec<String>),
    Transfer(Vec<String>),
}

impl Command {
    /// Parse `/name[@bot] arg...`. Plain text and unknown commands yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let head = tokens.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        match name.as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "set_source" => Some(Command::SetSource(args)),
            "set_target" => Some(Command::SetTarget(args)),
            "transfer" => Some(Command::Transfer(args)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::SetSource(_) => "set_source",
            Command::SetTarget(_) => "set_target",
            Command::Transfer(_) => "transfer",
        }
    }
}
