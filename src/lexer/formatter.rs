use super::{LexerError, LineMap, Token};
use ariadne::{Color, Label, Report, ReportKind, Source};

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_lexical_error(&self, error: &LexerError) -> String;
}

pub struct BasicFormatter;

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        token.to_string()
    }

    fn format_lexical_error(&self, error: &LexerError) -> String {
        format!("[line {}] Error: {}", error.line, error.kind)
    }
}

pub struct DebugFormatter;

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_lexical_error(&self, error: &LexerError) -> String {
        format!("{error:?}")
    }
}

/// Renders source-annotated reports for errors that carry a line number.
pub struct ErrorReporter<'src> {
    source: &'src str,
    name: &'src str,
    line_map: LineMap,
}

impl<'src> ErrorReporter<'src> {
    pub fn new(source: &'src str, name: &'src str) -> Self {
        Self {
            source,
            name,
            line_map: LineMap::new(source),
        }
    }

    pub fn report(&self, line: u32, message: &str) -> String {
        let span = self.line_map.get_span(line);
        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (self.name, span.clone()))
            .with_message(message)
            .with_label(
                Label::new((self.name, span))
                    .with_message(message)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((self.name, Source::from(self.source)), &mut output)
            .expect("Write into buffer should not fail.");
        String::from_utf8(output.into_inner()).expect("Ariadne produces valid utf-8 strings.")
    }
}
