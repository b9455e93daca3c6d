/// What a key press asks the runner to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RespondPosition,
    RespondAudio,
    /// Start the next block, or leave the results screen
    Continue,
    Reset,
    LevelUp,
    LevelDown,
    Quit,
}

impl Command {
    pub fn from_key(key: char) -> Option<Self> {
        Some(match key.to_ascii_lowercase() {
            'l' => Command::RespondPosition,
            'a' => Command::RespondAudio,
            ' ' => Command::Continue,
            'r' => Command::Reset,
            '+' | '=' => Command::LevelUp,
            '-' => Command::LevelDown,
            'q' => Command::Quit,
            _ => return None,
        })
    }
}

/// Terminal input arrives a line at a time; a bare Enter means continue.
pub fn parse_line(line: &str) -> Vec<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return vec![Command::Continue];
    }
    line.chars().filter_map(Command::from_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(Command::from_key('L'), Some(Command::RespondPosition));
        assert_eq!(Command::from_key('a'), Some(Command::RespondAudio));
        assert_eq!(Command::from_key('x'), None);
    }

    #[test]
    fn lines_split_into_commands() {
        assert_eq!(parse_line("\n"), vec![Command::Continue]);
        assert_eq!(
            parse_line("la\n"),
            vec![Command::RespondPosition, Command::RespondAudio]
        );
        assert_eq!(parse_line("zz"), vec![]);
    }
}
