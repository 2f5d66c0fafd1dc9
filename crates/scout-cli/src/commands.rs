/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    History,
    Save,
    Exit,
    /// Anything else goes to the assistant verbatim
    Message(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Self::Empty,
            "history" | "h" => Self::History,
            "save" | "s" => Self::Save,
            "exit" | "quit" => Self::Exit,
            _ => Self::Message(trimmed.to_string()),
        }
    }
}

pub const BANNER: &str = "\nGreetings!\n\n\
Try asking Scout to show you a preview of the data.\n\n\
Commands:\n\
- Type 'history' or 'h' to view thread history\n\
- Type 'save' or 's' to save current thread state\n\
- Type 'exit' or 'quit' to end the session\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Command::parse("HISTORY"), Command::History);
        assert_eq!(Command::parse(" h "), Command::History);
        assert_eq!(Command::parse("Save"), Command::Save);
        assert_eq!(Command::parse("quit\n"), Command::Exit);
        assert_eq!(Command::parse("exit"), Command::Exit);
    }

    #[test]
    fn test_other_input_is_a_message() {
        assert_eq!(
            Command::parse("show me the data\n"),
            Command::Message("show me the data".into())
        );
        assert_eq!(Command::parse("hist"), Command::Message("hist".into()));
        assert_eq!(Command::parse("   "), Command::Empty);
    }
}
