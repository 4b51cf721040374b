use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid character '{text}' at position {span:?}")]
    InvalidCharacter { text: String, span: Span },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let tokens = tokens.into_iter().filter(|t| t.kind != TokenKind::Comment).collect();
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens.get(self.pos + offset).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == TokenKind::Newline {
            self.advance();
        }
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            None => ParseError::UnexpectedEof(expected.to_string()),
            Some(t) if t.kind == TokenKind::Eof => ParseError::UnexpectedEof(expected.to_string()),
            Some(t) if t.kind == TokenKind::Error => ParseError::InvalidCharacter {
                text: t.text.clone(),
                span: t.span,
            },
            Some(t) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: if t.kind == TokenKind::Ident || t.kind == TokenKind::Number {
                    format!("'{}'", t.text)
                } else {
                    t.kind.describe().to_string()
                },
                span: t.span,
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.peek_kind() == kind {
            if let Some(token) = self.advance() {
                return Ok(token);
            }
        }
        Err(self.unexpected(kind.describe()))
    }

    /// A statement ends at a newline or the end of input
    fn end_of_statement(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.skip_newlines();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.skip_newlines();
        let objective = self.parse_objective()?;
        self.end_of_statement()?;

        let mut constraints = Vec::new();
        match self.peek_kind() {
            TokenKind::Eof => {}
            TokenKind::Subject => {
                self.advance();
                self.expect(TokenKind::To)?;
                self.end_of_statement()?;
            }
            TokenKind::St => {
                self.advance();
                self.end_of_statement()?;
            }
            _ => return Err(self.unexpected("'subject to'")),
        }

        while self.peek_kind() != TokenKind::Eof {
            constraints.push(self.parse_constraint()?);
            self.end_of_statement()?;
        }

        Ok(Program {
            objective,
            constraints,
        })
    }

    fn parse_objective(&mut self) -> Result<ObjectiveDecl, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or_default();
        let sense = match self.peek_kind() {
            TokenKind::Maximize => Sense::Maximize,
            TokenKind::Minimize => Sense::Minimize,
            _ => return Err(self.unexpected("maximize or minimize")),
        };
        self.advance();

        // optional label, e.g. `maximize z: 3 x1`
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            self.advance();
            self.advance();
        }

        let expr = self.parse_linear_expr()?;
        Ok(ObjectiveDecl {
            span: Span::new(start.start, self.previous_end()),
            sense,
            expr,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or_default();

        let name = if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Colon {
            let name = self.advance().map(|t| t.text);
            self.advance();
            name
        } else {
            None
        };

        let lhs = self.parse_linear_expr()?;
        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            _ => return Err(self.unexpected("'<=' or '>='")),
        };
        self.advance();
        let rhs = self.parse_signed_number()?;

        Ok(ConstraintDecl {
            span: Span::new(start.start, self.previous_end()),
            name,
            lhs,
            relation,
            rhs,
        })
    }

    /// `[sign] term { sign term }`, where a line break may follow an operator
    fn parse_linear_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let mut terms = Vec::new();

        let mut sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };

        loop {
            self.skip_newlines();
            terms.push(self.parse_term(sign)?);

            sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
        }

        Ok(LinearExpr { terms })
    }

    /// `[number] [*] ident`
    fn parse_term(&mut self, sign: f64) -> Result<Term, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or_default();

        let coefficient = if self.peek_kind() == TokenKind::Number {
            let value = self.parse_number()?;
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
            value
        } else {
            1.0
        };

        if self.peek_kind() != TokenKind::Ident {
            return Err(self.unexpected("variable name"));
        }
        let variable = self.expect(TokenKind::Ident)?;

        Ok(Term {
            span: start.merge(variable.span),
            coefficient: sign * coefficient,
            variable: variable.text,
        })
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let token = self.expect(TokenKind::Number)?;
        token
            .text
            .parse()
            .map_err(|_| ParseError::InvalidNumber(token.text.clone()))
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            _ => 1.0,
        };
        Ok(sign * self.parse_number()?)
    }
}
