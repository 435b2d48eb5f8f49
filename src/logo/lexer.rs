//! Logo lexer/tokenizer
//!
//! Works line by line: strips `;` comments, splits on whitespace, then
//! breaks each word on punctuation and operators while preserving column
//! offsets. Lexing never fails; an unrecognized lexeme becomes an ERROR
//! token so scanning can continue and later mistakes still get reported.

use crate::logo::commands;

/// Token kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    LBracket,
    RBracket,
    Colon,
    LParen,
    RParen,
    ArithOp,
    ComparisonOp,
    /// A canonical command or control word; `text` holds the canonical name.
    Command,
    To,
    End,
    /// Identifier: procedure or parameter name.
    Word,
    Eof,
    Error,
}

/// A token with position info. `text` is the lexeme, already normalized to
/// the canonical name for Command/To/End tokens.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

/// Tokenize an entire program. The stream is always EOF-terminated.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut line_count = 0;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        line_count = line_no;
        let line = match raw.find(';') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        scan_line(line, line_no, &mut tokens);
    }

    tokens.push(Token::new(TokenKind::Eof, "", line_count + 1, 1));
    tokens
}

fn scan_line(line: &str, line_no: usize, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        scan_word(&word, line_no, start + 1, tokens);
    }
}

/// Break one whitespace-delimited word into tokens. A word that is a signed
/// numeric literal stays whole; otherwise punctuation and operators split it.
fn scan_word(word: &str, line: usize, column: usize, tokens: &mut Vec<Token>) {
    if is_number(word) {
        tokens.push(Token::new(TokenKind::Number, word, line, column));
        return;
    }

    let chars: Vec<char> = word.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let at = column + i;
        match chars[i] {
            '[' => tokens.push(Token::new(TokenKind::LBracket, "[", line, at)),
            ']' => tokens.push(Token::new(TokenKind::RBracket, "]", line, at)),
            ':' => tokens.push(Token::new(TokenKind::Colon, ":", line, at)),
            '(' => tokens.push(Token::new(TokenKind::LParen, "(", line, at)),
            ')' => tokens.push(Token::new(TokenKind::RParen, ")", line, at)),
            c @ ('+' | '-' | '*' | '/') => {
                tokens.push(Token::new(TokenKind::ArithOp, c.to_string(), line, at))
            }
            c @ ('<' | '>' | '=') => {
                tokens.push(Token::new(TokenKind::ComparisonOp, c.to_string(), line, at))
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::new(TokenKind::ComparisonOp, "!=", line, at));
                    i += 2;
                    continue;
                }
                tokens.push(Token::new(TokenKind::Error, "!", line, at));
            }
            _ => {
                let run_start = i;
                while i < chars.len() && !is_break_char(chars[i]) {
                    i += 1;
                }
                let fragment: String = chars[run_start..i].iter().collect();
                tokens.push(classify(&fragment, line, column + run_start));
                continue;
            }
        }
        i += 1;
    }
}

fn is_break_char(c: char) -> bool {
    matches!(
        c,
        '[' | ']' | ':' | '(' | ')' | '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!'
    )
}

/// Classify a non-punctuation fragment, in order: number, keyword alias,
/// command alias, identifier, error.
fn classify(fragment: &str, line: usize, column: usize) -> Token {
    if is_number(fragment) {
        return Token::new(TokenKind::Number, fragment, line, column);
    }
    if let Some(keyword) = commands::lookup_keyword(fragment) {
        let kind = if keyword == "TO" {
            TokenKind::To
        } else {
            TokenKind::End
        };
        return Token::new(kind, keyword, line, column);
    }
    if let Some(canonical) = commands::lookup_command(fragment) {
        return Token::new(TokenKind::Command, canonical, line, column);
    }
    if is_identifier(fragment) {
        return Token::new(TokenKind::Word, fragment, line, column);
    }
    Token::new(TokenKind::Error, fragment, line, column)
}

/// Numeric literal: optional sign, digits, optional decimal part.
fn is_number(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let mut parts = body.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(frac) => !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()),
    }
}

/// Identifier: letter followed by letters, digits, or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn aliases_normalize_to_canonical_command() {
        for spelling in ["FORWARD", "fd", "Fd", "AVANZA", "av"] {
            let tokens = tokenize(&format!("{} 10", spelling));
            assert_eq!(tokens[0].kind, TokenKind::Command, "spelling {}", spelling);
            assert_eq!(tokens[0].text, "FORWARD", "spelling {}", spelling);
        }
    }

    #[test]
    fn keywords_and_control_words() {
        let tokens = tokenize("PARA SQ :S REPITE 4 [ FD :S ] FIN");
        assert_eq!(tokens[0].kind, TokenKind::To);
        assert_eq!(tokens[0].text, "TO");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[4].kind, TokenKind::Command);
        assert_eq!(tokens[4].text, "REPEAT");
        let last = &tokens[tokens.len() - 2];
        assert_eq!(last.kind, TokenKind::End);
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(
            kinds("FD 10 ; moves the turtle"),
            vec![TokenKind::Command, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn signed_and_decimal_numbers() {
        let tokens = tokenize("FD -90 FD 3.5");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, "-90");
        assert_eq!(tokens[3].text, "3.5");
    }

    #[test]
    fn punctuation_splits_words() {
        assert_eq!(
            kinds("(3+4)*2"),
            vec![
                TokenKind::LParen,
                TokenKind::Number,
                TokenKind::ArithOp,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::ArithOp,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comparison_operators() {
        let tokens = tokenize(":A != :B");
        let cmp: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ComparisonOp)
            .collect();
        assert_eq!(cmp.len(), 1);
        assert_eq!(cmp[0].text, "!=");
    }

    #[test]
    fn unrecognized_lexeme_becomes_error_token() {
        let tokens = tokenize("FD 10\n@@ 5\nRT 90");
        let errs: Vec<&Token> = tokens.iter().filter(|t| t.kind == TokenKind::Error).collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].text, "@@");
        assert_eq!(errs[0].line, 2);
        // Scanning continued past the error.
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Command && t.text == "RIGHT"));
    }

    #[test]
    fn eof_is_past_the_last_line() {
        let tokens = tokenize("FD 10\nRT 90");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.line, 3);
    }

    #[test]
    fn columns_are_one_based() {
        let tokens = tokenize("FD 10");
        assert_eq!(tokens[0].column, 1);
        assert_eq!(tokens[1].column, 4);
    }

    #[test]
    fn lone_bang_is_an_error_token() {
        let tokens = tokenize("FD 10 !");
        let last = &tokens[tokens.len() - 2];
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.text, "!");
    }
}
