//! Lexer + parser (§4.C): source text to a homoiconic block of values, plus a
//! location side-table so the evaluator can attach source positions to errors
//! without storing a location on every `Value`.
//!
//! Grounded on the teacher's `parse.rs`, which also tokenizes directly into the
//! runtime's own value shapes rather than an intermediate AST, since the parsed
//! result here *is* data (§3.1's homoiconicity) and not a separate syntax tree.
//! Locations are keyed by `(backing buffer identity, position within it)` rather
//! than carried on `Value` itself, since cheap `Value::clone()` throughout the
//! evaluator must not drag a location tag along for the ride.

use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    error::{self, EvalResult},
    series::Series,
    symbol::Symbols,
    value::{PathData, PathSegment, Value},
};

/// A 1-based line/column pair. Cheap to copy; attached to errors, not values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps `(buffer pointer, index within buffer)` to the source location of the
/// value parsed into that slot, so the evaluator can look one up without the
/// value itself carrying the tag (§4.C).
#[derive(Debug, Default)]
pub struct LocationTable {
    locations: HashMap<(usize, usize), SourceLoc>,
}

impl LocationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, series: &Series, index: usize, loc: SourceLoc) {
        self.locations.insert((series.buffer_key(), index), loc);
    }

    #[must_use]
    pub fn lookup(&self, series: &Series, index: usize) -> Option<SourceLoc> {
        self.locations.get(&(series.buffer_key(), index)).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Integer,
    Decimal,
    StringLit,
    Binary,
    Word,
    SetWord,
    GetWord,
    LitWord,
    Path,
    SetPath,
    GetPath,
    BlockOpen,
    BlockClose,
    ParenOpen,
    ParenClose,
}

struct Token {
    kind: TokenKind,
    text: String,
    loc: SourceLoc,
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    _marker: std::marker::PhantomData<&'a ()>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || "?!+-*/&|=<>_~%".contains(c)
}

fn is_word_start(c: char) -> bool {
    (c.is_alphabetic() || "?!+-*/&|=<>_~%".contains(c)) && !c.is_ascii_digit()
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            _marker: std::marker::PhantomData,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc { line: self.line, column: self.column }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_string(&mut self) -> EvalResult<String> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.advance() {
                None => return Err(error::syntax_error("unterminated string literal")),
                Some('"') => break,
                Some('^') => match self.advance() {
                    Some('"') => out.push('"'),
                    Some('^') => out.push('^'),
                    Some('/') => out.push('\n'),
                    Some(other) => {
                        out.push('^');
                        out.push(other);
                    }
                    None => return Err(error::syntax_error("unterminated escape in string literal")),
                },
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn lex_binary(&mut self) -> EvalResult<Vec<u8>> {
        self.advance(); // '#'
        self.advance(); // '{'
        let mut hex = String::new();
        loop {
            match self.advance() {
                None => return Err(error::syntax_error("unterminated binary literal")),
                Some('}') => break,
                Some(c) if c.is_whitespace() => {}
                Some(c) => hex.push(c),
            }
        }
        if hex.len() % 2 != 0 {
            return Err(error::syntax_error("binary literal must have an even number of hex digits"));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        let chars: Vec<char> = hex.chars().collect();
        for pair in chars.chunks(2) {
            let s: String = pair.iter().collect();
            let byte = u8::from_str_radix(&s, 16).map_err(|_| error::syntax_error("invalid hex digit in binary literal"))?;
            bytes.push(byte);
        }
        Ok(bytes)
    }

    fn lex_word_like(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if is_word_char(c) {
                out.push(c);
                self.advance();
            } else {
                break;
            }
        }
        out
    }

    fn tokenize(&mut self) -> EvalResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let loc = self.loc();
            let Some(c) = self.peek() else { break };
            match c {
                '[' => {
                    self.advance();
                    tokens.push(Token { kind: TokenKind::BlockOpen, text: String::new(), loc });
                }
                ']' => {
                    self.advance();
                    tokens.push(Token { kind: TokenKind::BlockClose, text: String::new(), loc });
                }
                '(' => {
                    self.advance();
                    tokens.push(Token { kind: TokenKind::ParenOpen, text: String::new(), loc });
                }
                ')' => {
                    self.advance();
                    tokens.push(Token { kind: TokenKind::ParenClose, text: String::new(), loc });
                }
                '"' => {
                    let text = self.lex_string()?;
                    tokens.push(Token { kind: TokenKind::StringLit, text, loc });
                }
                '#' if self.peek_at(1) == Some('{') => {
                    let bytes = self.lex_binary()?;
                    let text: String = bytes.iter().map(|b| *b as char).collect();
                    tokens.push(Token { kind: TokenKind::Binary, text, loc });
                }
                ':' if self.peek_at(1).is_some_and(is_word_start) => {
                    self.advance();
                    let word = self.lex_word_like();
                    tokens.push(Token { kind: if word.contains('.') { TokenKind::GetPath } else { TokenKind::GetWord }, text: word, loc });
                }
                '\'' if self.peek_at(1).is_some_and(is_word_start) => {
                    self.advance();
                    let word = self.lex_word_like();
                    tokens.push(Token { kind: TokenKind::LitWord, text: word, loc });
                }
                c if c.is_ascii_digit() || (c == '-' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) => {
                    let mut text = String::new();
                    if c == '-' {
                        text.push('-');
                        self.advance();
                    }
                    while let Some(d) = self.peek() {
                        if d.is_ascii_digit() {
                            text.push(d);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let mut is_decimal = false;
                    if self.peek() == Some('.') && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) {
                        is_decimal = true;
                        text.push('.');
                        self.advance();
                        while let Some(d) = self.peek() {
                            if d.is_ascii_digit() {
                                text.push(d);
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    if matches!(self.peek(), Some('e' | 'E'))
                        && (self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                            || (matches!(self.peek_at(1), Some('+' | '-')) && self.peek_at(2).is_some_and(|n| n.is_ascii_digit())))
                    {
                        is_decimal = true;
                        text.push('e');
                        self.advance();
                        if matches!(self.peek(), Some('+' | '-')) {
                            text.push(self.advance().unwrap());
                        }
                        while let Some(d) = self.peek() {
                            if d.is_ascii_digit() {
                                text.push(d);
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    tokens.push(Token { kind: if is_decimal { TokenKind::Decimal } else { TokenKind::Integer }, text, loc });
                }
                c if is_word_start(c) => {
                    let word = self.lex_word_like();
                    if self.peek() == Some(':') && !self.peek_at(1).is_some_and(is_word_char) {
                        self.advance();
                        tokens.push(Token { kind: if word.contains('.') { TokenKind::SetPath } else { TokenKind::SetWord }, text: word, loc });
                    } else {
                        tokens.push(Token { kind: if word.contains('.') { TokenKind::Path } else { TokenKind::Word }, text: word, loc });
                    }
                }
                other => return Err(error::syntax_error(format!("unexpected character '{other}' at {loc}"))),
            }
        }
        Ok(tokens)
    }
}

struct Builder<'s> {
    symbols: &'s mut Symbols,
    locations: LocationTable,
}

impl<'s> Builder<'s> {
    fn path_data(&mut self, text: &str) -> EvalResult<PathData> {
        let mut segments = Vec::new();
        for (i, part) in text.split('.').enumerate() {
            if part.is_empty() {
                return Err(error::syntax_error(format!("empty path segment in '{text}'")));
            }
            if i == 0 {
                if !part.chars().next().is_some_and(is_word_start) {
                    return Err(error::syntax_error(format!("path must start with a word: '{text}'")));
                }
                segments.push(PathSegment::Word(self.symbols.intern(part)));
            } else if part.chars().all(|c| c.is_ascii_digit()) {
                segments.push(PathSegment::Index(part.parse().map_err(|_| error::syntax_error("invalid path index"))?));
            } else {
                segments.push(PathSegment::Word(self.symbols.intern(part)));
            }
        }
        Ok(PathData { segments })
    }

    fn build(&mut self, tokens: &[Token], mut pos: usize, terminator: Option<TokenKind>) -> EvalResult<(Series, usize)> {
        let mut items = Vec::new();
        let mut locs = Vec::new();
        while pos < tokens.len() {
            if let Some(term) = terminator {
                if tokens[pos].kind == term {
                    pos += 1;
                    let series = Series::new_block(items);
                    for (i, loc) in locs.into_iter().enumerate() {
                        self.locations.record(&series, i, loc);
                    }
                    return Ok((series, pos));
                }
            }
            let token = &tokens[pos];
            let value = match token.kind {
                TokenKind::BlockOpen => {
                    let (inner, next) = self.build(tokens, pos + 1, Some(TokenKind::BlockClose))?;
                    pos = next;
                    locs.push(token.loc);
                    items.push(Value::Block(inner));
                    continue;
                }
                TokenKind::ParenOpen => {
                    let (inner, next) = self.build(tokens, pos + 1, Some(TokenKind::ParenClose))?;
                    pos = next;
                    locs.push(token.loc);
                    items.push(Value::Paren(inner));
                    continue;
                }
                TokenKind::BlockClose | TokenKind::ParenClose => {
                    return Err(error::syntax_error(format!("unmatched '{}' at {}", if token.kind == TokenKind::BlockClose { ']' } else { ')' }, token.loc)));
                }
                TokenKind::Integer => Value::Integer(token.text.parse().map_err(|_| error::syntax_error(format!("invalid integer literal '{}'", token.text)))?),
                TokenKind::Decimal => {
                    Value::Decimal(crate::decimal::Decimal::parse(&token.text).ok_or_else(|| error::syntax_error(format!("invalid decimal literal '{}'", token.text)))?)
                }
                TokenKind::StringLit => Value::String(Series::new_string(token.text.clone())),
                TokenKind::Binary => Value::Binary(Series::new_binary(token.text.bytes().collect())),
                TokenKind::Word => Value::Word(self.symbols.intern(&token.text)),
                TokenKind::SetWord => Value::SetWord(self.symbols.intern(&token.text)),
                TokenKind::GetWord => Value::GetWord(self.symbols.intern(&token.text)),
                TokenKind::LitWord => Value::LitWord(self.symbols.intern(&token.text)),
                TokenKind::Path => Value::Path(Rc::new(self.path_data(&token.text)?)),
                TokenKind::SetPath => Value::SetPath(Rc::new(self.path_data(&token.text)?)),
                TokenKind::GetPath => Value::GetPath(Rc::new(self.path_data(&token.text)?)),
            };
            locs.push(token.loc);
            items.push(value);
            pos += 1;
        }
        if terminator.is_some() {
            return Err(error::syntax_error("unexpected end of input: unclosed block or paren"));
        }
        let series = Series::new_block(items);
        for (i, loc) in locs.into_iter().enumerate() {
            self.locations.record(&series, i, loc);
        }
        Ok((series, pos))
    }
}

/// Parses `source` into a top-level block plus its location side-table.
pub fn parse(source: &str, symbols: &mut Symbols) -> EvalResult<(Series, LocationTable)> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    let mut builder = Builder { symbols, locations: LocationTable::new() };
    let (series, _) = builder.build(&tokens, 0, None)?;
    Ok((series, builder.locations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_sequence_of_literals() {
        let mut symbols = Symbols::new();
        let (block, _) = parse("1 2.5 \"hi\" word set: :get 'lit", &mut symbols).unwrap();
        assert_eq!(block.length(), 7);
        assert_eq!(block.pick(1).unwrap(), Value::Integer(1));
        assert_eq!(block.pick(3).unwrap(), Value::String(Series::new_string("hi")));
    }

    #[test]
    fn nested_blocks_and_parens_parse_recursively() {
        let mut symbols = Symbols::new();
        let (block, _) = parse("[1 (2 3)]", &mut symbols).unwrap();
        assert_eq!(block.length(), 1);
        let Value::Block(inner) = block.pick(1).unwrap() else { panic!("expected block") };
        assert_eq!(inner.length(), 2);
        assert_eq!(inner.pick(1).unwrap(), Value::Integer(2));
    }

    #[test]
    fn unmatched_bracket_is_a_syntax_error() {
        let mut symbols = Symbols::new();
        assert!(parse("[1 2", &mut symbols).is_err());
    }

    #[test]
    fn string_escape_sequences_decode() {
        let mut symbols = Symbols::new();
        let (block, _) = parse(r#""a^"b^/c""#, &mut symbols).unwrap();
        let Value::String(s) = block.pick(1).unwrap() else { panic!("expected string") };
        assert_eq!(s.with_str(|t| t.to_string()), "a\"b\nc");
    }

    #[test]
    fn path_segments_split_on_dot() {
        let mut symbols = Symbols::new();
        let (block, _) = parse("obj.field.1", &mut symbols).unwrap();
        let Value::Path(path) = block.pick(1).unwrap() else { panic!("expected path") };
        assert_eq!(path.segments.len(), 3);
        assert!(matches!(path.segments[2], PathSegment::Index(1)));
    }
}
