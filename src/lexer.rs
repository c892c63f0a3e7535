//! A module implementing lexical analysis (tokenization) of one input line.
//!
//! Words are separated by blanks; consecutive blanks collapse. Command separators
//! (`;`, `&&`, `||`) are tokens of their own and need no surrounding blanks, and a `#`
//! at the start of a word comments out the rest of the line. There is no quoting.

use std::fmt;

/// Operators that end one command and say how the next one runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `;` - run the next command unconditionally.
    Semicolon,
    /// `;;` - only meaningful inside `case`, always a syntax error here.
    DoubleSemicolon,
    /// `&&` - run the next command only if this one succeeded.
    And,
    /// `||` - run the next command only if this one failed.
    Or,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Semicolon => ";",
            Separator::DoubleSemicolon => ";;",
            Separator::And => "&&",
            Separator::Or => "||",
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Separator(Separator),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    Comment,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    fn make_tokens(&mut self) -> Vec<Token> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch, &mut out),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::Comment => break,
            }
        }

        self.finish_word(&mut out);
        out
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn handle_start(&mut self, ch: char, out: &mut Vec<Token>) {
        match ch {
            c if is_blank(c) => {}
            '#' => self.state = LexingState::Comment,
            c => {
                if let Some(sep) = self.separator(c) {
                    out.push(Token::Separator(sep));
                } else {
                    self.buffer.push(c);
                    self.state = LexingState::ReadingWord;
                }
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Token>) {
        if is_blank(ch) {
            self.finish_word(out);
            return;
        }
        match self.separator(ch) {
            Some(sep) => {
                self.finish_word(out);
                out.push(Token::Separator(sep));
            }
            None => self.buffer.push(ch),
        }
    }

    /// Consume the rest of a separator starting with `ch`, if `ch` starts one.
    fn separator(&mut self, ch: char) -> Option<Separator> {
        let next = self.peek_char();
        let sep = match (ch, next) {
            (';', Some(';')) => Separator::DoubleSemicolon,
            (';', _) => return Some(Separator::Semicolon),
            ('&', Some('&')) => Separator::And,
            ('|', Some('|')) => Separator::Or,
            _ => return None,
        };
        self.read_char();
        Some(sep)
    }

    fn finish_word(&mut self, out: &mut Vec<Token>) {
        if !self.buffer.is_empty() {
            out.push(Token::Word(std::mem::take(&mut self.buffer)));
        }
        if self.state == LexingState::ReadingWord {
            self.state = LexingState::Start;
        }
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Tokenize one input line.
///
/// An empty result means the line was blank or a comment and there is nothing to run.
pub fn split_into_tokens(line: &str) -> Vec<Token> {
    LexingFSM::new(line).make_tokens()
}
