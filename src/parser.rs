use crate::command::ArgVector;
use crate::error::ShellError;
use crate::lexer::{Separator, Token};

/// Condition under which a command of a list runs, decided by the separator before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    /// First command of the line, or preceded by `;`.
    Always,
    /// Preceded by `&&`.
    IfSuccess,
    /// Preceded by `||`.
    IfFailure,
}

impl Connector {
    /// Whether a command with this connector runs after a command that returned `last`.
    pub fn should_run(&self, last: i32) -> bool {
        match self {
            Connector::Always => true,
            Connector::IfSuccess => last == 0,
            Connector::IfFailure => last != 0,
        }
    }
}

/// One simple command of a list, still unexpanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub connector: Connector,
    pub argv: ArgVector,
}

/// Errors that can occur while splitting a line into commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// A separator with no command in front of it, `;;`, or a dangling `&&`/`||`.
    UnexpectedSeparator(Separator),
}

impl From<ParsingError> for ShellError {
    fn from(err: ParsingError) -> Self {
        match err {
            ParsingError::UnexpectedSeparator(sep) => ShellError::Syntax(sep.to_string()),
        }
    }
}

struct ListBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl ListBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        ListBuilder { tokens, pos: 0 }
    }

    /// Parse a list: command (separator command)* separator?
    fn build_list(mut self) -> Result<Vec<ListItem>, ParsingError> {
        let mut items = Vec::new();
        let mut connector = Connector::Always;
        // separator that ended the previous command and still needs a command after it
        let mut pending: Option<Separator> = None;

        while self.peek().is_some() {
            let argv = self.parse_command();
            if argv.is_empty() {
                // a separator with nothing in front of it
                if let Some(Token::Separator(sep)) = self.consume() {
                    return Err(ParsingError::UnexpectedSeparator(sep));
                }
            }
            items.push(ListItem { connector, argv });

            pending = match self.consume() {
                Some(Token::Separator(Separator::DoubleSemicolon)) => {
                    return Err(ParsingError::UnexpectedSeparator(Separator::DoubleSemicolon));
                }
                Some(Token::Separator(sep)) => Some(sep),
                Some(Token::Word(_)) | None => None,
            };
            connector = match pending {
                Some(Separator::And) => Connector::IfSuccess,
                Some(Separator::Or) => Connector::IfFailure,
                _ => Connector::Always,
            };
        }

        match pending {
            Some(sep @ (Separator::And | Separator::Or)) => {
                Err(ParsingError::UnexpectedSeparator(sep))
            }
            _ => Ok(items),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Collect words up to the next separator or the end of the line.
    fn parse_command(&mut self) -> ArgVector {
        let mut argv = ArgVector::new();
        while let Some(Token::Word(word)) = self.peek() {
            argv.push(word.clone());
            self.pos += 1;
        }
        argv
    }
}

/// Split a tokenized line into the commands it contains.
///
/// The whole line is rejected if any separator is misplaced, so nothing on a line
/// with a syntax error is ever run.
pub fn construct_list(tokens: Vec<Token>) -> Result<Vec<ListItem>, ParsingError> {
    ListBuilder::from(tokens).build_list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;

    fn parse(line: &str) -> Result<Vec<ListItem>, ParsingError> {
        construct_list(split_into_tokens(line))
    }

    fn item(connector: Connector, words: &str) -> ListItem {
        ListItem {
            connector,
            argv: words.split_whitespace().map(String::from).collect(),
        }
    }

    #[test]
    fn test_single_command() {
        assert_eq!(parse("ls -l /tmp").unwrap(), vec![item(Connector::Always, "ls -l /tmp")]);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(parse("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(
            parse("false || echo a && echo b; echo c").unwrap(),
            vec![
                item(Connector::Always, "false"),
                item(Connector::IfFailure, "echo a"),
                item(Connector::IfSuccess, "echo b"),
                item(Connector::Always, "echo c"),
            ]
        );
    }

    #[test]
    fn test_trailing_semicolon_is_allowed() {
        assert_eq!(parse("ls;").unwrap(), vec![item(Connector::Always, "ls")]);
    }

    #[test]
    fn test_leading_separator_is_rejected() {
        assert_eq!(
            parse("; ls"),
            Err(ParsingError::UnexpectedSeparator(Separator::Semicolon))
        );
        assert_eq!(parse("&& ls"), Err(ParsingError::UnexpectedSeparator(Separator::And)));
    }

    #[test]
    fn test_double_semicolon_is_rejected() {
        assert_eq!(
            parse("ls ;; pwd"),
            Err(ParsingError::UnexpectedSeparator(Separator::DoubleSemicolon))
        );
    }

    #[test]
    fn test_adjacent_separators_are_rejected() {
        assert_eq!(
            parse("ls && || pwd"),
            Err(ParsingError::UnexpectedSeparator(Separator::Or))
        );
        assert_eq!(
            parse("ls ; ; pwd"),
            Err(ParsingError::UnexpectedSeparator(Separator::Semicolon))
        );
    }

    #[test]
    fn test_dangling_logical_operator_is_rejected() {
        assert_eq!(parse("ls &&"), Err(ParsingError::UnexpectedSeparator(Separator::And)));
        assert_eq!(parse("ls ||"), Err(ParsingError::UnexpectedSeparator(Separator::Or)));
    }

    #[test]
    fn test_syntax_error_message() {
        let err: ShellError = parse("ls ;; pwd").unwrap_err().into();
        assert_eq!(err.to_string(), "Syntax error: \";;\" unexpected");
        assert_eq!(err.status(), 2);
    }

    #[test]
    fn test_connector_gating() {
        assert!(Connector::Always.should_run(1));
        assert!(Connector::IfSuccess.should_run(0));
        assert!(!Connector::IfSuccess.should_run(2));
        assert!(Connector::IfFailure.should_run(127));
        assert!(!Connector::IfFailure.should_run(0));
    }
}
