use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, Token>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("and", Token::And);
    map.insert("class", Token::Class);
    map.insert("def", Token::Def);
    map.insert("else", Token::Else);
    map.insert("False", Token::False);
    map.insert("if", Token::If);
    map.insert("None", Token::None);
    map.insert("not", Token::Not);
    map.insert("or", Token::Or);
    map.insert("print", Token::Print);
    map.insert("return", Token::Return);
    map.insert("True", Token::True);
    map
});

/// A lexeme of the language. Payload-carrying variants compare by both
/// discriminant and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Literals
    Number(i64),
    Id(CompactString),
    String(CompactString),
    /// A single punctuation character such as `+` or `:`.
    Char(u8),
    // Keywords
    Class,
    Return,
    If,
    Else,
    Def,
    Print,
    And,
    Or,
    Not,
    None,
    True,
    False,
    // Two-character comparison operators
    Eq,
    NotEq,
    LessOrEq,
    GreaterOrEq,
    // Layout
    Newline,
    Indent,
    Dedent,
    // End of input.
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(value) => write!(f, "Number{{{value}}}"),
            Token::Id(name) => write!(f, "Id{{{name}}}"),
            Token::String(value) => write!(f, "String{{{value}}}"),
            Token::Char(c) => write!(f, "Char{{{}}}", *c as char),
            Token::Class => write!(f, "Class"),
            Token::Return => write!(f, "Return"),
            Token::If => write!(f, "If"),
            Token::Else => write!(f, "Else"),
            Token::Def => write!(f, "Def"),
            Token::Print => write!(f, "Print"),
            Token::And => write!(f, "And"),
            Token::Or => write!(f, "Or"),
            Token::Not => write!(f, "Not"),
            Token::None => write!(f, "None"),
            Token::True => write!(f, "True"),
            Token::False => write!(f, "False"),
            Token::Eq => write!(f, "Eq"),
            Token::NotEq => write!(f, "NotEq"),
            Token::LessOrEq => write!(f, "LessOrEq"),
            Token::GreaterOrEq => write!(f, "GreaterOrEq"),
            Token::Newline => write!(f, "Newline"),
            Token::Indent => write!(f, "Indent"),
            Token::Dedent => write!(f, "Dedent"),
            Token::Eof => write!(f, "Eof"),
        }
    }
}
