//! Parsing of the line-oriented keyboard commands.
use std::str::FromStr;

use crate::clock::Mode;
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Toggle,
    Start,
    Pause,
    Reset,
    Adjust(Mode, i64),
    Help,
    Quit,
}

impl FromStr for UserCommand {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim().to_lowercase();
        let command = match input.as_str() {
            "" | "t" | "toggle" => UserCommand::Toggle,
            "start" => UserCommand::Start,
            "p" | "pause" => UserCommand::Pause,
            "r" | "reset" => UserCommand::Reset,
            "h" | "help" | "?" => UserCommand::Help,
            "q" | "quit" | "exit" => UserCommand::Quit,
            other => return parse_adjust(other),
        };
        Ok(command)
    }
}

// b+, b-, s+3, "s - 10"
fn parse_adjust(input: &str) -> Result<UserCommand, CommandError> {
    let mut chars = input.chars();
    let phase = match chars.next() {
        Some('b') => Mode::Break,
        Some('s') => Mode::Session,
        _ => return Err(CommandError::Unknown(input.to_string())),
    };
    let rest: String = chars.filter(|c| !c.is_whitespace()).collect();
    let (sign, amount) = match rest.chars().next() {
        Some('+') => (1, &rest[1..]),
        Some('-') => (-1, &rest[1..]),
        _ => return Err(CommandError::Unknown(input.to_string())),
    };
    let amount = if amount.is_empty() {
        1
    } else if amount.chars().all(|c| c.is_ascii_digit()) {
        amount
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidAmount(amount.to_string()))?
    } else {
        return Err(CommandError::InvalidAmount(amount.to_string()));
    };
    Ok(UserCommand::Adjust(phase, amount.saturating_mul(sign)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<UserCommand, CommandError> {
        input.parse()
    }

    #[test]
    fn parses_control_words() {
        assert_eq!(parse(""), Ok(UserCommand::Toggle));
        assert_eq!(parse(" T "), Ok(UserCommand::Toggle));
        assert_eq!(parse("start"), Ok(UserCommand::Start));
        assert_eq!(parse("p"), Ok(UserCommand::Pause));
        assert_eq!(parse("Reset"), Ok(UserCommand::Reset));
        assert_eq!(parse("?"), Ok(UserCommand::Help));
        assert_eq!(parse("exit"), Ok(UserCommand::Quit));
    }

    #[test]
    fn parses_length_adjustments() {
        assert_eq!(parse("b+"), Ok(UserCommand::Adjust(Mode::Break, 1)));
        assert_eq!(parse("b-"), Ok(UserCommand::Adjust(Mode::Break, -1)));
        assert_eq!(parse("s+"), Ok(UserCommand::Adjust(Mode::Session, 1)));
        assert_eq!(parse("S-100"), Ok(UserCommand::Adjust(Mode::Session, -100)));
        assert_eq!(parse("s + 5"), Ok(UserCommand::Adjust(Mode::Session, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse("go"), Err(CommandError::Unknown("go".to_string())));
        assert_eq!(parse("b"), Err(CommandError::Unknown("b".to_string())));
        assert_eq!(parse("s+x"), Err(CommandError::InvalidAmount("x".to_string())));
        assert_eq!(parse("s--5"), Err(CommandError::InvalidAmount("-5".to_string())));
        assert_eq!(parse("b+-1"), Err(CommandError::InvalidAmount("-1".to_string())));
        assert_eq!(parse("s++2"), Err(CommandError::InvalidAmount("+2".to_string())));
    }

    #[test]
    fn huge_amounts_keep_their_sign() {
        assert_eq!(
            parse("b+9223372036854775807"),
            Ok(UserCommand::Adjust(Mode::Break, i64::MAX))
        );
        assert_eq!(
            parse("s-9223372036854775807"),
            Ok(UserCommand::Adjust(Mode::Session, -i64::MAX))
        );
        assert!(matches!(
            parse("b+99999999999999999999"),
            Err(CommandError::InvalidAmount(_))
        ));
    }
}
