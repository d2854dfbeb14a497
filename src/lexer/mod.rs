mod error;
pub mod formatter;
mod token;

pub use error::{LexerError, LexerErrorKind};
pub use token::{Token, KEYWORD_HASHMAP};

use compact_str::CompactString;
use std::ops::Range;

/// Maps 1-based line numbers to byte ranges of the source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_spans: Vec<Range<usize>>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_spans = Vec::new();
        let mut start = 0;
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_spans.push(start..offset);
                start = offset + 1;
            }
        }
        line_spans.push(start..text.len());
        Self { line_spans }
    }

    pub fn get_span(&self, line: u32) -> Range<usize> {
        let index = line.saturating_sub(1) as usize;
        match self.line_spans.get(index) {
            Some(span) => span.clone(),
            None => self.line_spans.last().cloned().unwrap_or(0..0),
        }
    }
}

/// Tokenizes the entire input up front and exposes a forward-only cursor
/// over the materialized token sequence.
#[derive(Debug)]
pub struct Lexer {
    tokens: Vec<Token>,
    lines: Vec<u32>,
    cursor: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Result<Self, LexerError> {
        let mut tokenizer = Tokenizer::new();
        for (index, line) in source.lines().enumerate() {
            tokenizer.tokenize_line(line, (index + 1) as u32)?;
        }
        let (tokens, lines) = tokenizer.finish();
        Ok(Self {
            tokens,
            lines,
            cursor: 0,
        })
    }

    pub fn current_token(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    /// Advances the cursor and returns the new current token. The cursor
    /// saturates at the trailing `Eof`.
    pub fn next_token(&mut self) -> &Token {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        self.current_token()
    }

    /// The source line of the current token.
    pub fn current_line(&self) -> u32 {
        self.lines[self.cursor]
    }
}

#[derive(Debug)]
struct Tokenizer {
    tokens: Vec<Token>,
    lines: Vec<u32>,
    indentation: usize,
    line: u32,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            lines: Vec::new(),
            indentation: 0,
            line: 1,
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
        self.lines.push(self.line);
    }

    fn error(&self, kind: LexerErrorKind) -> LexerError {
        LexerError {
            kind,
            line: self.line,
        }
    }

    /// Blank lines and lines whose first non-space character is `#`
    /// contribute no tokens and no indentation change.
    fn is_ignorable(line: &str) -> bool {
        let rest = line.trim_start_matches(' ');
        rest.is_empty() || rest.starts_with('#')
    }

    fn tokenize_line(&mut self, line: &str, number: u32) -> Result<(), LexerError> {
        self.line = number;
        if Self::is_ignorable(line) {
            return Ok(());
        }
        let mut rest = self.scan_indentation(line)?;
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() || rest.starts_with('#') {
                break;
            }
            rest = match rest.as_bytes()[0] {
                b'0'..=b'9' => self.scan_number(rest)?,
                b'=' | b'!' | b'<' | b'>' => self.scan_comparison(rest)?,
                c @ (b'*' | b'/' | b'+' | b'-' | b'(' | b')' | b',' | b'.' | b':' | b';'
                | b'\t' | b'\n') => {
                    self.push(Token::Char(c));
                    &rest[1..]
                }
                b'\'' | b'"' => self.scan_string(rest)?,
                _ => self.scan_word(rest)?,
            };
        }
        self.push(Token::Newline);
        Ok(())
    }

    fn scan_indentation<'a>(&mut self, line: &'a str) -> Result<&'a str, LexerError> {
        let rest = line.trim_start_matches(' ');
        let width = line.len() - rest.len();
        if width % 2 != 0 {
            return Err(self.error(LexerErrorKind::OddIndentation));
        }
        let level = width / 2;
        for _ in level..self.indentation {
            self.push(Token::Dedent);
        }
        for _ in self.indentation..level {
            self.push(Token::Indent);
        }
        self.indentation = level;
        Ok(rest)
    }

    fn scan_number<'a>(&mut self, rest: &'a str) -> Result<&'a str, LexerError> {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (text, rest) = rest.split_at(digits);
        let value: i64 = text
            .parse()
            .map_err(|_| self.error(LexerErrorKind::OversizedNumber))?;
        self.push(Token::Number(value));
        Ok(rest)
    }

    fn scan_comparison<'a>(&mut self, rest: &'a str) -> Result<&'a str, LexerError> {
        let first = rest.as_bytes()[0];
        if rest.as_bytes().get(1) == Some(&b'=') {
            let token = match first {
                b'=' => Token::Eq,
                b'!' => Token::NotEq,
                b'<' => Token::LessOrEq,
                _ => Token::GreaterOrEq,
            };
            self.push(token);
            Ok(&rest[2..])
        } else if first == b'!' {
            // `!` only occurs as part of `!=`
            Err(self.error(LexerErrorKind::UnexpectedCharacter('!')))
        } else {
            self.push(Token::Char(first));
            Ok(&rest[1..])
        }
    }

    fn scan_string<'a>(&mut self, rest: &'a str) -> Result<&'a str, LexerError> {
        let bytes = rest.as_bytes();
        let quote = bytes[0];
        let mut value = CompactString::default();
        let mut index = 1;
        loop {
            match bytes.get(index) {
                Option::None => return Err(self.error(LexerErrorKind::UnterminatedString)),
                Some(&b) if b == quote => {
                    index += 1;
                    break;
                }
                Some(&b'\\') => {
                    let Some(&escaped) = bytes.get(index + 1) else {
                        return Err(self.error(LexerErrorKind::UnterminatedString));
                    };
                    match escaped {
                        b'n' => value.push('\n'),
                        b't' => value.push('\t'),
                        b'r' => value.push('\r'),
                        b'"' => value.push('"'),
                        b'\\' => value.push('\\'),
                        b'\'' => value.push('\''),
                        // unrecognized escapes are dropped
                        _ => {}
                    }
                    index += 2;
                }
                Some(&b) => {
                    value.push(b as char);
                    index += 1;
                }
            }
        }
        self.push(Token::String(value));
        Ok(&rest[index..])
    }

    fn scan_word<'a>(&mut self, rest: &'a str) -> Result<&'a str, LexerError> {
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count();
        if len == 0 {
            let c = rest.chars().next().unwrap_or_default();
            return Err(self.error(LexerErrorKind::UnexpectedCharacter(c)));
        }
        let (word, rest) = rest.split_at(len);
        let token = KEYWORD_HASHMAP
            .get(word)
            .cloned()
            .unwrap_or_else(|| Token::Id(word.into()));
        self.push(token);
        Ok(rest)
    }

    fn finish(mut self) -> (Vec<Token>, Vec<u32>) {
        while self.indentation > 0 {
            self.push(Token::Dedent);
            self.indentation -= 1;
        }
        self.push(Token::Eof);
        (self.tokens, self.lines)
    }
}
