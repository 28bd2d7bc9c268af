//! Input lines typed at the prompt, mapped to controller actions.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Send(String),
    Recommend,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        match command.to_ascii_lowercase().as_str() {
            "recommend" | "r" => Self::Recommend,
            "reset" => Self::Reset,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Send(_) => "send",
            Self::Recommend => "recommend",
            Self::Reset => "reset",
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Unknown(_) => "unknown",
        }
    }
}

pub const HELP: &str = "\
Type a message and press enter to chat.
  /recommend, /r   fetch movie recommendations
  /reset           start the conversation over
  /help            show this help
  /quit            leave";
