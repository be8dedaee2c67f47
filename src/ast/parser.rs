//! Recursive-descent parser: tokens in, statements out.
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

use super::{AssignTarget, BinaryOp, Block, Expr, FunctionEntry, FunctionTable, Stmt, MAX_FUNCTIONS};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    functions: &'a mut FunctionTable,
}

type PResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, functions: &'a mut FunctionTable) -> Self {
        Parser {
            tokens,
            pos: 0,
            functions,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&EOF)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.pos).cloned().unwrap_or(Token::eof());
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect_keyword(&mut self, word: &str) -> PResult<()> {
        if self.peek().is_keyword(word) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected '{word}', found '{}'",
                self.peek()
            )))
        }
    }

    fn expect_delimiter(&mut self, d: char) -> PResult<()> {
        if self.peek().is_delimiter(d) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected '{d}' after expression, found '{}'",
                self.peek()
            )))
        }
    }

    fn expect_identifier(&mut self) -> PResult<String> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.advance().text)
        } else {
            Err(ParseError::new(format!(
                "Expected identifier, found '{}'",
                self.peek()
            )))
        }
    }

    /// Parse one top-level statement; the caller (the interpreter's run
    /// loop) executes it immediately and then asks for the next one, so a
    /// `def` parsed here is already registered by the time a later
    /// statement calls it. Returns `None` once the token stream is
    /// exhausted.
    pub fn next_statement(&mut self) -> Option<PResult<Stmt>> {
        if self.is_at_end() {
            return None;
        }
        Some(self.parse_statement())
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        let token = self.peek().clone();

        if token.is_keyword("for") {
            return self.parse_for();
        }
        if token.is_keyword("if") {
            return self.parse_if();
        }
        if token.is_keyword("while") {
            return self.parse_while();
        }
        if token.is_keyword("def") {
            return self.parse_def();
        }
        if token.is_keyword("return") {
            return self.parse_return();
        }
        // Function call must be tried before assignment: both start with an
        // identifier, and the '(' lookahead is what disambiguates them.
        if token.kind == TokenKind::Identifier && self.peek_at(1).is_delimiter('(') {
            return self.parse_call_statement();
        }
        if token.is_keyword("print") {
            return self.parse_print();
        }
        if token.kind == TokenKind::Identifier {
            return self.parse_assignment();
        }

        Err(ParseError::new(format!(
            "Unrecognized statement starting with '{}'",
            token
        )))
    }

    /// Parse statements until `else` or `end` (not consumed).
    fn parse_block(&mut self) -> PResult<Block> {
        let mut statements = Vec::new();

        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof || token.is_keyword("else") || token.is_keyword("end")
            {
                break;
            }

            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.advance(); // 'if'
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;

        let else_block = if self.peek().is_keyword("else") {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect_keyword("end")?;

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        self.advance(); // 'while'
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        self.expect_keyword("end")?;

        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.advance(); // 'for'
        let var = self.expect_identifier()?;
        self.expect_keyword("in")?;
        let expr = self.parse_expr()?;
        let body = self.parse_block()?;
        self.expect_keyword("end")?;

        Ok(Stmt::For { var, expr, body })
    }

    fn parse_def(&mut self) -> PResult<Stmt> {
        self.advance(); // 'def'
        let name = self.expect_identifier()?;
        self.expect_delimiter('(')?;

        let mut params = Vec::new();
        if !self.peek().is_delimiter(')') {
            params.push(self.expect_identifier()?);
            while self.peek().is_delimiter(',') {
                self.advance();
                params.push(self.expect_identifier()?);
            }
        }
        self.expect_delimiter(')')?;

        let body = self.parse_block()?;
        self.expect_keyword("end")?;

        if !self.functions.contains_key(&name) && self.functions.len() >= MAX_FUNCTIONS {
            return Err(ParseError::new("Too many functions defined"));
        }

        // Functions are registered while parsing, not while executing the
        // definition statement: a later call in the same or a later
        // statement can already see it.
        self.functions.insert(
            name.clone(),
            FunctionEntry {
                params: params.clone(),
                body: body.clone(),
            },
        );

        Ok(Stmt::FunctionDef { name, params, body })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        self.advance(); // 'return'

        // A return's expression is optional; if the next token can't start
        // an expression, treat it as a bare `return`.
        let token = self.peek();
        let has_expr = !(token.kind == TokenKind::Eof
            || token.is_keyword("end")
            || token.is_keyword("else"));

        let expr = if has_expr {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Stmt::Return(expr))
    }

    fn parse_print(&mut self) -> PResult<Stmt> {
        self.advance(); // 'print'
        self.expect_delimiter('(')?;
        let expr = self.parse_expr()?;
        self.expect_delimiter(')')?;

        Ok(Stmt::Print(expr))
    }

    fn parse_call_statement(&mut self) -> PResult<Stmt> {
        let (name, args) = self.parse_call_tail()?;
        Ok(Stmt::Call { name, args })
    }

    fn parse_assignment(&mut self) -> PResult<Stmt> {
        let name = self.expect_identifier()?;

        let target = if self.peek().is_delimiter('[') {
            self.advance();
            let index = self.parse_expr()?;
            self.expect_delimiter(']')?;
            AssignTarget::ArrayAccess {
                name,
                index: Box::new(index),
            }
        } else {
            AssignTarget::Identifier(name)
        };

        if !self.peek().is_operator("=") {
            return Err(ParseError::new(format!(
                "Expected '=' after identifier, found '{}'",
                self.peek()
            )));
        }
        self.advance();

        let value = self.parse_expr()?;

        Ok(Stmt::Assignment { target, value })
    }

    // expr := comparison
    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_comparison()
    }

    /// If the current token is an operator in `allowed`, consume it and
    /// return it; otherwise leave the cursor alone.
    fn take_operator(&mut self, allowed: &[BinaryOp]) -> Option<BinaryOp> {
        if self.peek().kind != TokenKind::Operator {
            return None;
        }
        let op = self.peek().text.parse::<BinaryOp>().ok()?;
        if !allowed.contains(&op) {
            return None;
        }
        self.advance();
        Some(op)
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        use BinaryOp::*;
        let mut lhs = self.parse_additive()?;

        while let Some(op) = self.take_operator(&[
            LessThan,
            GreaterThan,
            LessEqual,
            GreaterEqual,
            Equal,
            NotEqual,
        ]) {
            let rhs = self.parse_additive()?;
            lhs = Expr::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        use BinaryOp::*;
        let mut lhs = self.parse_term()?;

        while let Some(op) = self.take_operator(&[Add, Subtract]) {
            let rhs = self.parse_term()?;
            lhs = Expr::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> PResult<Expr> {
        use BinaryOp::*;
        let mut lhs = self.parse_factor()?;

        while let Some(op) = self.take_operator(&[Multiply, Divide]) {
            let rhs = self.parse_factor()?;
            lhs = Expr::BinaryOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_factor(&mut self) -> PResult<Expr> {
        let token = self.peek().clone();

        if token.is_delimiter('(') {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect_delimiter(')')?;
            return Ok(expr);
        }

        if token.kind == TokenKind::Number || token.kind == TokenKind::String {
            self.advance();
            return Ok(Expr::Literal(token.text));
        }

        if token.kind == TokenKind::Identifier {
            if self.peek_at(1).is_delimiter('(') {
                let (name, args) = self.parse_call_tail()?;
                return Ok(Expr::FunctionCall { name, args });
            }

            if self.peek_at(1).is_delimiter('[') {
                self.advance();
                self.advance(); // '['
                let index = self.parse_expr()?;
                self.expect_delimiter(']')?;
                return Ok(Expr::ArrayAccess {
                    name: token.text,
                    index: Box::new(index),
                });
            }

            self.advance();
            return Ok(Expr::Identifier(token.text));
        }

        if token.kind == TokenKind::Eof {
            return Err(ParseError::new("Unexpected end of input in term"));
        }

        Err(ParseError::new(format!(
            "Unexpected token '{}' in term",
            token
        )))
    }

    /// Parse `IDENT '(' (expr (',' expr)*)? ')'`, cursor already on `IDENT`.
    fn parse_call_tail(&mut self) -> PResult<(String, Vec<Expr>)> {
        let name = self.expect_identifier()?;
        self.expect_delimiter('(')?;

        let mut args = Vec::new();
        if !self.peek().is_delimiter(')') {
            args.push(self.parse_expr()?);
            while self.peek().is_delimiter(',') {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect_delimiter(')')?;

        Ok((name, args))
    }
}

const EOF: Token = Token {
    kind: TokenKind::Eof,
    text: String::new(),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_all(src: &str) -> (Vec<Stmt>, FunctionTable) {
        let tokens = Lexer::new(src).lex().unwrap();
        let mut functions = FunctionTable::new();
        let mut parser = Parser::new(tokens, &mut functions);
        let mut statements = Vec::new();
        while let Some(stmt) = parser.next_statement() {
            statements.push(stmt.unwrap());
        }
        (statements, functions)
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let (stmts, _) = parse_all("print(1+2*3)");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Print(Expr::BinaryOp { op, .. }) => assert_eq!(*op, BinaryOp::Add),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn call_is_tried_before_assignment() {
        let (stmts, _) = parse_all("foo(1, 2)");
        assert_eq!(
            stmts,
            vec![Stmt::Call {
                name: "foo".into(),
                args: vec![Expr::Literal("1".into()), Expr::Literal("2".into())]
            }]
        );
    }

    #[test]
    fn def_registers_function_during_parsing() {
        let (_, functions) = parse_all("def square(n)\nreturn n*n\nend\n");
        assert!(functions.contains_key("square"));
        assert_eq!(functions["square"].params, vec!["n".to_string()]);
    }

    #[test]
    fn if_else_end_round_trips() {
        let (stmts, _) = parse_all("if 1\nprint(1)\nelse\nprint(0)\nend\n");
        match &stmts[0] {
            Stmt::If {
                then_block,
                else_block,
                ..
            } => {
                assert_eq!(then_block.len(), 1);
                assert!(else_block.is_some());
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn unrecognized_statement_is_an_error() {
        let tokens = Lexer::new("=").lex().unwrap();
        let mut functions = FunctionTable::new();
        let mut parser = Parser::new(tokens, &mut functions);
        assert!(parser.next_statement().unwrap().is_err());
    }
}
