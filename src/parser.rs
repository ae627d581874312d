use crate::ast::{
    BlockStatement, Expression, InfixOperator, LogicalOperator, PrefixOperator, Program,
    Statement,
};
use crate::error::{ErrorKind, SyntaxError};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    LogicalOr,
    LogicalAnd,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Or => Precedence::LogicalOr,
        TokenKind::And => Precedence::LogicalAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
            Precedence::LessGreater
        }
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen | TokenKind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Lex and parse `source` in one go.
pub fn parse(source: &str) -> (Program, Vec<SyntaxError>) {
    Parser::new(Lexer::new(source)).parse_program()
}

/// Pratt parser over the token stream of one source text.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<SyntaxError>,
    block_depth: usize,
    // Hash literals opened in the current block and not yet closed
    open_hashes: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        // The lexer iterator always ends with exactly one Eof token.
        let tokens: Vec<Token> = lexer.collect();
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            block_depth: 0,
            open_hashes: 0,
        }
    }

    /// Parses every statement, collecting syntax errors instead of stopping
    /// at the first one. A program returned with errors must not be evaluated.
    pub fn parse_program(&mut self) -> (Program, Vec<SyntaxError>) {
        let statements = self.parse_statements(None);
        let errors = std::mem::take(&mut self.errors);

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "parsing finished with syntax errors");
        }

        (Program { statements }, errors)
    }

    fn parse_statements(&mut self, terminator: Option<TokenKind>) -> Vec<Statement> {
        let mut statements = Vec::new();

        while !self.cur_is(TokenKind::Eof) && terminator.map_or(true, |end| !self.cur_is(end)) {
            match self.parse_statement() {
                Ok(statement) => {
                    statements.push(statement);
                    self.next_token();
                }
                Err(error) => {
                    tracing::debug!(error = %error, start = error.span.start, "syntax error");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        statements
    }

    /// Skips to the next statement boundary: past a top-level `;`, onto the
    /// `}` closing the enclosing block, past a stray `}` at the top level, or
    /// onto `Eof`. Braces of hash literals left open by the failed statement
    /// are skipped along with their contents.
    fn synchronize(&mut self) {
        let mut nesting = std::mem::take(&mut self.open_hashes);

        loop {
            match self.cur().kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if nesting == 0 => {
                    self.next_token();
                    return;
                }
                TokenKind::LBrace => nesting += 1,
                TokenKind::RBrace if nesting > 0 => nesting -= 1,
                TokenKind::RBrace => {
                    if self.block_depth == 0 {
                        self.next_token();
                    }
                    return;
                }
                _ => {}
            }
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.cur().kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace if !self.brace_starts_hash() => {
                Ok(Statement::Block(self.parse_block_statement()?))
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> ParseResult<Statement> {
        self.expect_peek_with_help(
            TokenKind::Ident,
            "Let bindings need a name: let x = 5;",
        )?;
        let name = self.cur().literal.clone();

        self.expect_peek_with_help(
            TokenKind::Assign,
            "Let bindings assign with '=': let x = 5;",
        )?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
            return Ok(Statement::Return(None));
        }
        if self.peek_is(TokenKind::RBrace) || self.peek_is(TokenKind::Eof) {
            return Ok(Statement::Return(None));
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        // Semicolons are optional after expressions
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Ok(Statement::Expression(expr))
    }

    /// Expects the current token to be `{`; leaves the parser on the closing `}`.
    fn parse_block_statement(&mut self) -> ParseResult<BlockStatement> {
        self.block_depth += 1;
        let outer_hashes = std::mem::take(&mut self.open_hashes);
        self.next_token();
        let statements = self.parse_statements(Some(TokenKind::RBrace));
        self.open_hashes = outer_hashes;
        self.block_depth -= 1;

        if !self.cur_is(TokenKind::RBrace) {
            return Err(SyntaxError::unexpected(
                self.cur().span,
                TokenKind::RBrace,
                self.cur().kind,
            )
            .with_help("Blocks must be closed with '}' after the opening '{'."));
        }

        Ok(BlockStatement { statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let token = self.cur().clone();

        match token.kind {
            TokenKind::Ident => Ok(Expression::Identifier(token.literal)),
            TokenKind::Int => token.literal.parse::<i64>().map(Expression::Integer).map_err(|_| {
                SyntaxError::new(
                    ErrorKind::Parse,
                    token.span,
                    token.kind,
                    format!("could not parse {} as integer", token.literal),
                )
                .with_help("Integer literals must fit in a signed 64-bit integer.")
            }),
            TokenKind::String => Ok(Expression::String(token.literal)),
            TokenKind::True => Ok(Expression::Boolean(true)),
            TokenKind::False => Ok(Expression::Boolean(false)),
            TokenKind::Bang | TokenKind::Minus => {
                let operator = if token.kind == TokenKind::Bang {
                    PrefixOperator::Not
                } else {
                    PrefixOperator::Negate
                };
                self.next_token();
                let right = self.parse_expression(Precedence::Prefix)?;
                Ok(Expression::Prefix {
                    operator,
                    right: Box::new(right),
                })
            }
            TokenKind::LParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek_with_help(
                    TokenKind::RParen,
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
                )?;
                Ok(expr)
            }
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => {
                let elements = self.parse_expression_list(TokenKind::RBracket)?;
                Ok(Expression::Array(elements))
            }
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Illegal => {
                let message = if token.literal.starts_with('"') {
                    "unterminated string literal".to_string()
                } else {
                    format!("illegal token '{}'", token.literal)
                };
                Err(SyntaxError::new(ErrorKind::Lex, token.span, token.kind, message))
            }
            _ => {
                let help = match token.kind {
                    TokenKind::RParen => "Found ')' without matching '('. Check for unbalanced parentheses.",
                    TokenKind::RBrace => "Found '}' without matching '{'. Check for unbalanced braces.",
                    TokenKind::RBracket => "Found ']' without matching '['. Check for unbalanced brackets.",
                    TokenKind::Eof => "Reached end of input while expecting an expression.",
                    _ => "Expected a literal value, identifier, or parenthesized expression here.",
                };
                Err(SyntaxError::new(
                    ErrorKind::Parse,
                    token.span,
                    token.kind,
                    format!("no prefix parse rule for {}", token.kind),
                )
                .with_help(help))
            }
        }
    }

    fn parse_infix(&mut self, left: Expression) -> ParseResult<Expression> {
        let kind = self.cur().kind;

        match kind {
            TokenKind::LParen => {
                let arguments = self.parse_expression_list(TokenKind::RParen)?;
                Ok(Expression::Call {
                    function: Box::new(left),
                    arguments,
                })
            }
            TokenKind::LBracket => {
                self.next_token();
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect_peek_with_help(
                    TokenKind::RBracket,
                    "Index expressions must be closed with ']'. Example: items[0]",
                )?;
                Ok(Expression::Index {
                    left: Box::new(left),
                    index: Box::new(index),
                })
            }
            TokenKind::And | TokenKind::Or => {
                let operator = if kind == TokenKind::And {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                };
                let precedence = precedence_of(kind);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Ok(Expression::Logical {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                })
            }
            _ => {
                let operator = match kind {
                    TokenKind::Plus => InfixOperator::Add,
                    TokenKind::Minus => InfixOperator::Subtract,
                    TokenKind::Asterisk => InfixOperator::Multiply,
                    TokenKind::Slash => InfixOperator::Divide,
                    TokenKind::Eq => InfixOperator::Equal,
                    TokenKind::NotEq => InfixOperator::NotEqual,
                    TokenKind::Lt => InfixOperator::Less,
                    TokenKind::LtEq => InfixOperator::LessEqual,
                    TokenKind::Gt => InfixOperator::Greater,
                    TokenKind::GtEq => InfixOperator::GreaterEqual,
                    // parse_expression only calls us for kinds with an infix precedence
                    _ => unreachable!("no infix rule for {}", kind),
                };
                let precedence = precedence_of(kind);
                self.next_token();
                let right = self.parse_expression(precedence)?;
                Ok(Expression::Infix {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                })
            }
        }
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect_peek_with_help(
            TokenKind::LParen,
            "If expressions require parentheses around the condition: if (condition) { ... }",
        )?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek_with_help(
            TokenKind::RParen,
            "If conditions must be enclosed in parentheses: if (condition) { ... }",
        )?;
        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.next_token();
            if self.peek_is(TokenKind::If) {
                // `else if` is an else block holding a single if expression
                self.next_token();
                let nested = self.parse_if_expression()?;
                Some(BlockStatement {
                    statements: vec![Statement::Expression(nested)],
                })
            } else {
                self.expect_peek(TokenKind::LBrace)?;
                Some(self.parse_block_statement()?)
            }
        } else {
            None
        };

        Ok(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> ParseResult<Expression> {
        self.expect_peek_with_help(
            TokenKind::LParen,
            "Function literals list their parameters in parentheses: fn(x, y) { x + y }",
        )?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::Function { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> ParseResult<Vec<String>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Ok(parameters);
        }

        self.expect_peek(TokenKind::Ident)?;
        parameters.push(self.cur().literal.clone());

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            parameters.push(self.cur().literal.clone());
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(parameters)
    }

    /// Comma separated expressions up to `end`; the current token is the opener.
    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();
        self.open_hashes += 1;

        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek_with_help(
                TokenKind::Colon,
                "Hash entries require a colon ':' between key and value. Example: {\"key\": \"value\"}",
            )?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RBrace)?;
        self.open_hashes -= 1;
        Ok(Expression::Hash(pairs))
    }

    /// Decides whether a `{` at statement start opens a hash literal (a `:`
    /// at depth zero, or `{}`) rather than a block.
    fn brace_starts_hash(&self) -> bool {
        let mut depth = 0usize;

        for (offset, token) in self.tokens[self.current + 1..].iter().enumerate() {
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RBrace if depth == 0 => return offset == 0,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Colon if depth == 0 => return true,
                TokenKind::Semicolon if depth == 0 => return false,
                TokenKind::Eof => return false,
                _ => {}
            }
        }

        false
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek(&self) -> &Token {
        let index = (self.current + 1).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn next_token(&mut self) {
        if self.current + 1 < self.tokens.len() {
            self.current += 1;
        }
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek().kind)
    }

    fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(self.peek_error(kind))
        }
    }

    fn expect_peek_with_help(&mut self, kind: TokenKind, help: &str) -> ParseResult<()> {
        self.expect_peek(kind).map_err(|error| error.with_help(help))
    }

    fn peek_error(&self, expected: TokenKind) -> SyntaxError {
        let found = self.peek();
        let error = SyntaxError::unexpected(found.span, expected, found.kind);
        if found.kind == TokenKind::Illegal {
            SyntaxError {
                kind: ErrorKind::Lex,
                ..error
            }
        } else {
            error
        }
    }
}
