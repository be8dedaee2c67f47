//! Single-pass, line-agnostic tokenizer.
mod token;

pub use token::*;

use std::iter::Peekable;
use std::str::Chars;

use crate::error::LexError;

const OPERATOR_CHARS: &str = "+-*/=<>!";
const VALID_OPERATORS: &[&str] = &["+", "-", "*", "/", "=", "<", ">", "<=", ">=", "==", "!="];

/// Turns a whole source buffer into a flat [`Token`] stream.
///
/// The lexer does not track line/column information: diagnostics are
/// reported with the offending lexeme alone, matching the reference.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
        }
    }

    /// Lex the whole buffer, stopping at the first error.
    ///
    /// On error the tokens collected so far are discarded along with the
    /// rest of the buffer. This is exact for an unterminated string, which
    /// the reference also aborts scanning on; an unknown operator run or
    /// character is, in the reference, merely logged and skipped before
    /// scanning continues — this lexer instead surfaces it as the one
    /// `LexError` for the whole buffer.
    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            let Some(&c) = self.chars.peek() else {
                break;
            };

            let token = match c {
                '"' | '\'' => self.lex_string(c)?,
                '0'..='9' => self.lex_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier(),
                c if OPERATOR_CHARS.contains(c) => self.lex_operator()?,
                '(' | ')' | ',' | '[' | ']' => {
                    self.chars.next();
                    Token::new(TokenKind::Delimiter, c.to_string())
                }
                other => return Err(LexError::UnknownCharacter(other)),
            };

            tokens.push(token);
        }

        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

            if self.chars.peek() == Some(&'#') {
                while self.chars.next_if(|&c| c != '\n').is_some() {}
                continue;
            }

            break;
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        self.chars.next();
        let mut text = String::new();

        loop {
            match self.chars.next() {
                Some(c) if c == quote => break,
                Some(c) => text.push(c),
                None => return Err(LexError::UnterminatedString),
            }
        }

        Ok(Token::new(TokenKind::String, text))
    }

    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_digit()) {
            text.push(c);
        }
        Token::new(TokenKind::Number, text)
    }

    fn lex_identifier(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.chars.next_if(|&c| c.is_alphanumeric() || c == '_') {
            text.push(c);
        }

        if KEYWORDS.contains(&text.as_str()) {
            Token::new(TokenKind::Keyword, text)
        } else {
            Token::new(TokenKind::Identifier, text)
        }
    }

    /// Consume the entire contiguous run of operator characters first, then
    /// validate the whole run as one token — not prefix-by-prefix, which
    /// would silently split an invalid run like `*-` into the two valid
    /// operators `*` and `-` instead of rejecting it as one lexeme.
    fn lex_operator(&mut self) -> Result<Token, LexError> {
        let mut text = String::new();

        while let Some(&c) = self.chars.peek() {
            if !OPERATOR_CHARS.contains(c) {
                break;
            }
            text.push(c);
            self.chars.next();
        }

        if VALID_OPERATORS.contains(&text.as_str()) {
            Ok(Token::new(TokenKind::Operator, text))
        } else {
            Err(LexError::UnknownOperator(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        Lexer::new(src).lex().unwrap()
    }

    #[test]
    fn lexes_identifier_and_keyword() {
        let tokens = lex("print foo");
        assert_eq!(tokens[0], Token::new(TokenKind::Keyword, "print"));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "foo"));
    }

    #[test]
    fn lexes_number() {
        let tokens = lex("1337");
        assert_eq!(tokens, vec![Token::new(TokenKind::Number, "1337")]);
    }

    #[test]
    fn lexes_string_either_quote() {
        let tokens = lex(r#" "hi" 'lo' "#);
        assert_eq!(tokens[0], Token::new(TokenKind::String, "hi"));
        assert_eq!(tokens[1], Token::new(TokenKind::String, "lo"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("\"unterminated").lex().unwrap_err();
        assert_eq!(err, LexError::UnterminatedString);
    }

    #[test]
    fn comments_are_dropped() {
        let tokens = lex("x = 1 # trailing comment\ny = 2");
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn two_char_operators_are_maximal_munch() {
        let tokens = lex("<= >= == != < >");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["<=", ">=", "==", "!=", "<", ">"]);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let err = Lexer::new("~").lex().unwrap_err();
        assert_eq!(err, LexError::UnknownCharacter('~'));
    }

    #[test]
    fn an_invalid_operator_run_is_rejected_as_a_single_token_not_split() {
        let err = Lexer::new("5*-2").lex().unwrap_err();
        assert_eq!(err, LexError::UnknownOperator("*-".to_string()));
    }
}
