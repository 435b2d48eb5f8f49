//! Logo parser - produces an AST
//!
//! Recursive descent, one statement at a time, with error recovery: a
//! malformed construct records a ParseError and the parser skips forward to
//! the next command or TO keyword, so one mistake does not hide the rest of
//! the program's diagnostics.

use crate::logo::commands;
use crate::logo::error::ParseError;
use crate::logo::lexer::{Token, TokenKind};

/// Expression node. Every node carries the position of its first token.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Numeric literal
    Number(f64),
    /// `:name` variable reference
    Variable(String),
    /// `RANDOM <bound>`
    Random(Box<Expr>),
    /// Arithmetic: `+ - * /`
    Binary {
        op: char,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison: `< > = !=`
    Comparison {
        op: CmpOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Procedure call in expression position; its value comes from OUTPUT.
    Call { name: String, args: Vec<Expr> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
        }
    }
}

/// Statement node, also position-tagged.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// Canonical turtle command with its fixed-arity argument list.
    Command { name: String, args: Vec<Expr> },
    /// `REPEAT <count> [ <statements> ]`
    Repeat { count: Expr, body: Vec<Stmt> },
    /// `IF <condition> [ <statements> ]` - no else branch.
    If { condition: Expr, body: Vec<Stmt> },
    /// `TO <name> <:param>* <statements> END`
    Procedure {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    /// Bare word followed by arguments: a user procedure call.
    Call { name: String, args: Vec<Expr> },
    /// `OUTPUT <value>` - only meaningful inside a procedure body.
    Output { value: Expr },
}

/// Parse a token stream into a program plus all collected errors.
pub fn parse(tokens: Vec<Token>) -> (Vec<Stmt>, Vec<ParseError>) {
    Parser::new(tokens).run()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, "", 1, 1));
        }
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        let token = self.current();
        ParseError::new(msg, token.line, token.column)
    }

    /// Skip ahead to the next statement-starting token after an error.
    fn synchronize(&mut self) {
        while !matches!(self.peek(), TokenKind::Command | TokenKind::To | TokenKind::Eof) {
            self.advance();
        }
    }

    fn run(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut program = Vec::new();
        let mut errors = Vec::new();

        while self.peek() != TokenKind::Eof {
            match self.parse_statement() {
                Ok(stmt) => program.push(stmt),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        (program, errors)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Command => {
                self.advance();
                match token.text.as_str() {
                    commands::REPEAT => self.parse_repeat(&token),
                    commands::IF => self.parse_if(&token),
                    commands::OUTPUT => {
                        let value = self.parse_expression()?;
                        Ok(self.stmt(StmtKind::Output { value }, &token))
                    }
                    commands::RANDOM => Err(ParseError::new(
                        "RANDOM produces a value and cannot stand alone",
                        token.line,
                        token.column,
                    )),
                    name => {
                        let arity = commands::arity(name).unwrap_or(0);
                        let mut args = Vec::with_capacity(arity);
                        for _ in 0..arity {
                            args.push(self.parse_expression()?);
                        }
                        Ok(self.stmt(
                            StmtKind::Command {
                                name: name.to_string(),
                                args,
                            },
                            &token,
                        ))
                    }
                }
            }
            TokenKind::To => {
                self.advance();
                self.parse_procedure(&token)
            }
            TokenKind::Word => {
                self.advance();
                let args = self.parse_call_args(token.line)?;
                Ok(self.stmt(
                    StmtKind::Call {
                        name: token.text.clone(),
                        args,
                    },
                    &token,
                ))
            }
            TokenKind::Error => Err(self.error(format!("unrecognized token '{}'", token.text))),
            _ => Err(self.error(format!("unexpected '{}'", token.text))),
        }
    }

    fn stmt(&self, kind: StmtKind, at: &Token) -> Stmt {
        Stmt {
            kind,
            line: at.line,
            column: at.column,
        }
    }

    fn parse_repeat(&mut self, at: &Token) -> Result<Stmt, ParseError> {
        let count = self.parse_expression()?;
        let body = self.parse_block("REPEAT")?;
        Ok(self.stmt(StmtKind::Repeat { count, body }, at))
    }

    fn parse_if(&mut self, at: &Token) -> Result<Stmt, ParseError> {
        let condition = self.parse_expression()?;
        let body = self.parse_block("IF")?;
        Ok(self.stmt(StmtKind::If { condition, body }, at))
    }

    /// Parse a `[ ... ]` statement block. Blocks nest through recursion; an
    /// unterminated bracket is reported once, at the opening bracket.
    fn parse_block(&mut self, context: &str) -> Result<Vec<Stmt>, ParseError> {
        if self.peek() != TokenKind::LBracket {
            return Err(self.error(format!("{} needs a [ block ]", context)));
        }
        let bracket = self.advance();

        let mut body = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RBracket => {
                    self.advance();
                    return Ok(body);
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        "missing ']' to close this block",
                        bracket.line,
                        bracket.column,
                    ));
                }
                _ => body.push(self.parse_statement()?),
            }
        }
    }

    fn parse_procedure(&mut self, at: &Token) -> Result<Stmt, ParseError> {
        let name = match self.peek() {
            TokenKind::Word => self.advance().text,
            _ => return Err(self.error("expected a procedure name after TO")),
        };

        let mut params = Vec::new();
        while self.peek() == TokenKind::Colon {
            self.advance();
            match self.peek() {
                TokenKind::Word => params.push(self.advance().text),
                _ => return Err(self.error("expected a parameter name after ':'")),
            }
        }

        let mut body = Vec::new();
        loop {
            match self.peek() {
                TokenKind::End => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        format!("TO {} is missing END", name),
                        at.line,
                        at.column,
                    ));
                }
                _ => body.push(self.parse_statement()?),
            }
        }

        Ok(self.stmt(StmtKind::Procedure { name, params, body }, at))
    }

    /// Procedure call arguments are collected greedily: every following
    /// token that can begin an expression, on the same source line as the
    /// call, becomes an argument. Arity is checked at runtime.
    fn parse_call_args(&mut self, call_line: usize) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        while self.starts_expression() && self.current().line == call_line {
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    fn starts_expression(&self) -> bool {
        match self.peek() {
            TokenKind::Number | TokenKind::Colon | TokenKind::LParen | TokenKind::Word => true,
            TokenKind::Command => self.current().text == commands::RANDOM,
            _ => false,
        }
    }

    /// Precedence climbing: comparisons bind weaker than additive, which
    /// bind weaker than multiplicative.
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        while self.peek() == TokenKind::ComparisonOp {
            let token = self.advance();
            let op = match token.text.as_str() {
                "<" => CmpOp::Lt,
                ">" => CmpOp::Gt,
                "=" => CmpOp::Eq,
                _ => CmpOp::Ne,
            };
            let right = self.parse_additive()?;
            left = Expr {
                line: left.line,
                column: left.column,
                kind: ExprKind::Comparison {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        while self.peek() == TokenKind::ArithOp && matches!(self.current().text.as_str(), "+" | "-")
        {
            let op = self.advance().text.chars().next().unwrap_or('+');
            let right = self.parse_multiplicative()?;
            left = Expr {
                line: left.line,
                column: left.column,
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        while self.peek() == TokenKind::ArithOp && matches!(self.current().text.as_str(), "*" | "/")
        {
            let op = self.advance().text.chars().next().unwrap_or('*');
            let right = self.parse_primary()?;
            left = Expr {
                line: left.line,
                column: left.column,
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token.text.parse().unwrap_or(0.0);
                Ok(self.expr(ExprKind::Number(value), &token))
            }
            TokenKind::Colon => {
                self.advance();
                match self.peek() {
                    TokenKind::Word => {
                        let name = self.advance().text;
                        Ok(self.expr(ExprKind::Variable(name), &token))
                    }
                    _ => Err(self.error("expected a variable name after ':'")),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if self.peek() != TokenKind::RParen {
                    return Err(self.error("missing ')'"));
                }
                self.advance();
                Ok(inner)
            }
            TokenKind::Command if token.text == commands::RANDOM => {
                self.advance();
                let bound = self.parse_additive()?;
                Ok(self.expr(ExprKind::Random(Box::new(bound)), &token))
            }
            TokenKind::Word => {
                self.advance();
                let args = self.parse_call_args(token.line)?;
                Ok(self.expr(
                    ExprKind::Call {
                        name: token.text.clone(),
                        args,
                    },
                    &token,
                ))
            }
            TokenKind::Error => Err(self.error(format!("cannot use '{}' here", token.text))),
            _ => Err(self.error(format!("expected a value, found '{}'", token.text))),
        }
    }

    fn expr(&self, kind: ExprKind, at: &Token) -> Expr {
        Expr {
            kind,
            line: at.line,
            column: at.column,
        }
    }
}
