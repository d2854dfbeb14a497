mod error;

pub use error::{ParserError, ParserErrorKind};

use crate::interpreter::{Class, Comparator, Method, Statement};
use crate::lexer::{Lexer, Token};
use compact_str::CompactString;
use std::collections::HashMap;
use std::rc::Rc;

/// Recursive descent over the token cursor. Classes are resolved while
/// parsing, so construction sites hold a reference to an already declared
/// class and every class outlives its instances.
pub struct Parser {
    lexer: Lexer,
    classes: HashMap<CompactString, Rc<Class>>,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParserError> {
        let lexer = Lexer::new(source).map_err(|error| ParserError {
            line: error.line,
            kind: ParserErrorKind::Lexical(error),
        })?;
        Ok(Self {
            lexer,
            classes: HashMap::new(),
        })
    }

    /// Parses the whole program into its root compound statement.
    pub fn parse(mut self) -> Result<Statement, ParserError> {
        let mut statements = Vec::new();
        while !matches!(self.current(), Token::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Statement::Compound { statements })
    }
}

// Cursor helpers
impl Parser {
    fn current(&self) -> &Token {
        self.lexer.current_token()
    }

    fn advance(&mut self) -> Token {
        let token = self.lexer.current_token().clone();
        self.lexer.next_token();
        token
    }

    fn error(&self, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            line: self.lexer.current_line(),
        }
    }

    fn eat_if(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.lexer.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParserError> {
        if self.current() == token {
            self.lexer.next_token();
            Ok(())
        } else {
            Err(self.error(ParserErrorKind::UnexpectedToken {
                expected,
                actual: self.current().clone(),
            }))
        }
    }

    fn expect_char(&mut self, c: u8, expected: &'static str) -> Result<(), ParserError> {
        self.expect(&Token::Char(c), expected)
    }

    fn expect_id(&mut self) -> Result<CompactString, ParserError> {
        match self.current() {
            Token::Id(name) => {
                let name = name.clone();
                self.lexer.next_token();
                Ok(name)
            }
            token => Err(self.error(ParserErrorKind::UnexpectedToken {
                expected: "an identifier",
                actual: token.clone(),
            })),
        }
    }
}

// Statements
impl Parser {
    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        match self.current() {
            Token::Class => self.parse_class_definition(),
            Token::If => self.parse_if(),
            Token::Print => self.parse_print(),
            Token::Return => self.parse_return(),
            _ => self.parse_assignment_or_expression(),
        }
    }

    fn parse_class_definition(&mut self) -> Result<Statement, ParserError> {
        self.advance();
        let name = self.expect_id()?;
        let parent = if self.eat_if(&Token::Char(b'(')) {
            let parent_name = self.expect_id()?;
            self.expect_char(b')', "`)`")?;
            let parent = self
                .classes
                .get(&parent_name)
                .cloned()
                .ok_or_else(|| self.error(ParserErrorKind::UnknownClass(parent_name.clone())))?;
            Some(parent)
        } else {
            None
        };
        self.expect_char(b':', "`:`")?;
        self.expect(&Token::Newline, "a newline")?;
        self.expect(&Token::Indent, "an indented class body")?;
        let mut methods = Vec::new();
        loop {
            methods.push(self.parse_method()?);
            if matches!(self.current(), Token::Dedent) {
                break;
            }
        }
        self.advance();
        let class = Rc::new(Class::new(name.clone(), methods, parent));
        self.classes.insert(name, class.clone());
        Ok(Statement::ClassDefinition { class })
    }

    fn parse_method(&mut self) -> Result<Method, ParserError> {
        self.expect(&Token::Def, "`def`")?;
        let name = self.expect_id()?;
        self.expect_char(b'(', "`(`")?;
        let mut formal_params = Vec::new();
        if !self.eat_if(&Token::Char(b')')) {
            loop {
                formal_params.push(self.expect_id()?);
                if !self.eat_if(&Token::Char(b',')) {
                    break;
                }
            }
            self.expect_char(b')', "`)`")?;
        }
        self.expect_char(b':', "`:`")?;
        let body = self.parse_suite()?;
        Ok(Method {
            name,
            formal_params,
            body: Statement::MethodBody {
                body: Box::new(body),
            },
        })
    }

    fn parse_suite(&mut self) -> Result<Statement, ParserError> {
        self.expect(&Token::Newline, "a newline")?;
        self.expect(&Token::Indent, "an indented block")?;
        let mut statements = Vec::new();
        loop {
            statements.push(self.parse_statement()?);
            if matches!(self.current(), Token::Dedent) {
                break;
            }
        }
        self.advance();
        Ok(Statement::Compound { statements })
    }

    fn parse_if(&mut self) -> Result<Statement, ParserError> {
        self.advance();
        let condition = self.parse_expression()?;
        self.expect_char(b':', "`:`")?;
        let if_body = self.parse_suite()?;
        let else_body = if self.eat_if(&Token::Else) {
            self.expect_char(b':', "`:`")?;
            Some(Box::new(self.parse_suite()?))
        } else {
            None
        };
        Ok(Statement::IfElse {
            condition: Box::new(condition),
            if_body: Box::new(if_body),
            else_body,
        })
    }

    fn parse_print(&mut self) -> Result<Statement, ParserError> {
        self.advance();
        let mut args = Vec::new();
        if !matches!(self.current(), Token::Newline) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat_if(&Token::Char(b',')) {
                    break;
                }
            }
        }
        self.expect(&Token::Newline, "a newline")?;
        Ok(Statement::Print { args })
    }

    fn parse_return(&mut self) -> Result<Statement, ParserError> {
        self.advance();
        let value = self.parse_expression()?;
        self.expect(&Token::Newline, "a newline")?;
        Ok(Statement::Return {
            value: Box::new(value),
        })
    }

    fn parse_assignment_or_expression(&mut self) -> Result<Statement, ParserError> {
        let expr = self.parse_expression()?;
        if self.eat_if(&Token::Char(b'=')) {
            let value = Box::new(self.parse_expression()?);
            self.expect(&Token::Newline, "a newline")?;
            match expr {
                Statement::VariableValue { mut dotted_ids } => {
                    if dotted_ids.len() == 1 {
                        let name = dotted_ids.pop().expect("Just checked the length.");
                        Ok(Statement::Assignment { name, value })
                    } else {
                        let field = dotted_ids.pop().expect("A dotted path is never empty.");
                        Ok(Statement::FieldAssignment {
                            object: Box::new(Statement::VariableValue { dotted_ids }),
                            field,
                            value,
                        })
                    }
                }
                _ => Err(self.error(ParserErrorKind::InvalidAssignmentTarget)),
            }
        } else {
            self.expect(&Token::Newline, "a newline")?;
            Ok(expr)
        }
    }
}

// Expressions, lowest precedence first
impl Parser {
    fn parse_expression(&mut self) -> Result<Statement, ParserError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Statement, ParserError> {
        let mut lhs = self.parse_and()?;
        while self.eat_if(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Statement::Or {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Statement, ParserError> {
        let mut lhs = self.parse_not()?;
        while self.eat_if(&Token::And) {
            let rhs = self.parse_not()?;
            lhs = Statement::And {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Statement, ParserError> {
        if self.eat_if(&Token::Not) {
            let argument = self.parse_not()?;
            Ok(Statement::Not {
                argument: Box::new(argument),
            })
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Statement, ParserError> {
        let lhs = self.parse_sum()?;
        let comparator = match self.current() {
            Token::Eq => Comparator::Equal,
            Token::NotEq => Comparator::NotEqual,
            Token::LessOrEq => Comparator::LessOrEqual,
            Token::GreaterOrEq => Comparator::GreaterOrEqual,
            Token::Char(b'<') => Comparator::Less,
            Token::Char(b'>') => Comparator::Greater,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_sum()?;
        Ok(Statement::Comparison {
            comparator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_sum(&mut self) -> Result<Statement, ParserError> {
        let mut lhs = self.parse_term()?;
        loop {
            if self.eat_if(&Token::Char(b'+')) {
                let rhs = self.parse_term()?;
                lhs = Statement::Add {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            } else if self.eat_if(&Token::Char(b'-')) {
                let rhs = self.parse_term()?;
                lhs = Statement::Sub {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_term(&mut self) -> Result<Statement, ParserError> {
        let mut lhs = self.parse_primary()?;
        loop {
            if self.eat_if(&Token::Char(b'*')) {
                let rhs = self.parse_primary()?;
                lhs = Statement::Mult {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            } else if self.eat_if(&Token::Char(b'/')) {
                let rhs = self.parse_primary()?;
                lhs = Statement::Div {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                };
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Statement, ParserError> {
        match self.current().clone() {
            Token::Number(value) => {
                self.advance();
                Ok(Statement::NumericConst(value))
            }
            Token::String(value) => {
                self.advance();
                Ok(Statement::StringConst(value))
            }
            Token::True => {
                self.advance();
                Ok(Statement::BoolConst(true))
            }
            Token::False => {
                self.advance();
                Ok(Statement::BoolConst(false))
            }
            Token::None => {
                self.advance();
                Ok(Statement::NoneConst)
            }
            Token::Char(b'(') => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_char(b')', "`)`")?;
                Ok(inner)
            }
            Token::Id(name) => {
                self.advance();
                self.parse_name(name)
            }
            token => Err(self.error(ParserErrorKind::NonExpression(token))),
        }
    }

    fn parse_name(&mut self, first: CompactString) -> Result<Statement, ParserError> {
        // `str(...)` is the stringification builtin
        if first == "str" && self.current() == &Token::Char(b'(') {
            self.advance();
            let argument = self.parse_expression()?;
            self.expect_char(b')', "`)`")?;
            return Ok(Statement::Stringify {
                argument: Box::new(argument),
            });
        }
        let mut dotted_ids = vec![first];
        while self.eat_if(&Token::Char(b'.')) {
            dotted_ids.push(self.expect_id()?);
        }
        if self.eat_if(&Token::Char(b'(')) {
            let mut args = Vec::new();
            if !self.eat_if(&Token::Char(b')')) {
                loop {
                    args.push(self.parse_expression()?);
                    if !self.eat_if(&Token::Char(b',')) {
                        break;
                    }
                }
                self.expect_char(b')', "`)`")?;
            }
            if dotted_ids.len() == 1 {
                let name = dotted_ids.pop().expect("Just checked the length.");
                let class = self
                    .classes
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| self.error(ParserErrorKind::UnknownClass(name.clone())))?;
                Ok(Statement::NewInstance {
                    class,
                    args: Some(args),
                })
            } else {
                let method = dotted_ids.pop().expect("A dotted path is never empty.");
                Ok(Statement::MethodCall {
                    object: Box::new(Statement::VariableValue { dotted_ids }),
                    method,
                    args,
                })
            }
        } else {
            Ok(Statement::VariableValue { dotted_ids })
        }
    }
}
