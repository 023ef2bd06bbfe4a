//! Hand-rolled tokenizer feeding the `lalrpop`-generated grammar.
//!
//! `lalrpop`'s built-in regex lexer cannot cleanly express that `if`/`end`/`do`
//! are keywords but otherwise-identical-looking names like `index` are plain
//! identifiers, nor that newlines are significant statement terminators. So,
//! as is common for small hand-written grammars fed into `lalrpop`, this
//! module implements the `Iterator<Item = Result<(usize, Token<'input>,
//! usize), LexError>>` contract the grammar's `extern` block expects.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token<'input> {
    Int(i64),
    Float(f64),
    Ident(&'input str),
    Global(&'input str),

    True,
    False,
    If,
    Then,
    Elsif,
    Else,
    End,
    Unless,
    While,
    For,
    In,
    Do,
    Break,
    Return,
    Def,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Le,
    Ge,
    Lt,
    Gt,
    AndAnd,
    OrOr,
    Bang,
    Eq,
    Dot,
    DotDot,
    Comma,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Newline,
    Semi,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LexError {
    pub message: String,
    pub pos: usize,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.pos)
    }
}

impl std::error::Error for LexError {}

/// Streams `(start, token, end)` triples, the shape `lalrpop`'s external
/// token contract expects.
pub struct Lexer<'input> {
    input: &'input str,
    chars: std::iter::Peekable<std::str::CharIndices<'input>>,
    /// Ruby-style: a newline only terminates a statement if the previous
    /// token wasn't itself something that obviously continues (an operator,
    /// a comma, an open paren/bracket, `do`, `then`, `|`). Tracking this
    /// avoids emitting a spurious `Newline` in the middle of a wrapped
    /// expression.
    last_significant: Option<Token<'input>>,
}

pub type Spanned<'input> = Result<(usize, Token<'input>, usize), LexError>;

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
            last_significant: None,
        }
    }

    fn continues_line(tok: &Token<'_>) -> bool {
        matches!(
            tok,
            Token::Plus
                | Token::Minus
                | Token::Star
                | Token::Slash
                | Token::Percent
                | Token::EqEq
                | Token::NotEq
                | Token::Le
                | Token::Ge
                | Token::Lt
                | Token::Gt
                | Token::AndAnd
                | Token::OrOr
                | Token::Bang
                | Token::Eq
                | Token::Dot
                | Token::DotDot
                | Token::Comma
                | Token::Pipe
                | Token::LParen
                | Token::LBracket
                | Token::Do
                | Token::Then
                | Token::In
        )
    }

    fn skip_trivia(&mut self) -> Option<Spanned<'input>> {
        loop {
            match self.chars.peek().copied() {
                Some((_, ' ')) | Some((_, '\t')) | Some((_, '\r')) => {
                    self.chars.next();
                }
                Some((_, '#')) => {
                    while let Some((_, ch)) = self.chars.peek().copied() {
                        if ch == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                Some((i, '\n')) => {
                    self.chars.next();
                    let emit = !matches!(self.last_significant, None)
                        && !self
                            .last_significant
                            .as_ref()
                            .is_some_and(Self::continues_line);
                    if emit {
                        self.last_significant = Some(Token::Newline);
                        return Some(Ok((i, Token::Newline, i + 1)));
                    }
                }
                _ => return None,
            }
        }
    }

    fn ident_like(&mut self, start: usize) -> Spanned<'input> {
        let mut end = start;
        while let Some((i, ch)) = self.chars.peek().copied() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                end = i + ch.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.input[start..end];
        let tok = match text {
            "true" => Token::True,
            "false" => Token::False,
            "if" => Token::If,
            "then" => Token::Then,
            "elsif" => Token::Elsif,
            "else" => Token::Else,
            "end" => Token::End,
            "unless" => Token::Unless,
            "while" => Token::While,
            "for" => Token::For,
            "in" => Token::In,
            "do" => Token::Do,
            "break" => Token::Break,
            "return" => Token::Return,
            "def" => Token::Def,
            _ => Token::Ident(text),
        };
        Ok((start, tok, end))
    }

    fn number(&mut self, start: usize) -> Spanned<'input> {
        let mut end = start;
        let mut is_float = false;
        while let Some((i, ch)) = self.chars.peek().copied() {
            if ch.is_ascii_digit() {
                end = i + 1;
                self.chars.next();
            } else if ch == '.' && !is_float {
                // Don't eat a `..` range operator as a decimal point.
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if lookahead.peek().map(|(_, c)| *c) == Some('.') {
                    break;
                }
                is_float = true;
                end = i + 1;
                self.chars.next();
            } else {
                break;
            }
        }
        let text = &self.input[start..end];
        if is_float {
            text.parse::<f64>()
                .map(|v| (start, Token::Float(v), end))
                .map_err(|e| LexError {
                    message: format!("invalid float literal `{text}`: {e}"),
                    pos: start,
                })
        } else {
            text.parse::<i64>()
                .map(|v| (start, Token::Int(v), end))
                .map_err(|e| LexError {
                    message: format!("invalid integer literal `{text}`: {e}"),
                    pos: start,
                })
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(tok) = self.skip_trivia() {
            return Some(tok);
        }

        let (start, ch) = self.chars.next()?;

        let result = match ch {
            '+' => Ok((start, Token::Plus, start + 1)),
            '-' => Ok((start, Token::Minus, start + 1)),
            '*' => Ok((start, Token::Star, start + 1)),
            '/' => Ok((start, Token::Slash, start + 1)),
            '%' => Ok((start, Token::Percent, start + 1)),
            '(' => Ok((start, Token::LParen, start + 1)),
            ')' => Ok((start, Token::RParen, start + 1)),
            '[' => Ok((start, Token::LBracket, start + 1)),
            ']' => Ok((start, Token::RBracket, start + 1)),
            ',' => Ok((start, Token::Comma, start + 1)),
            '|' => Ok((start, Token::Pipe, start + 1)),
            ';' => Ok((start, Token::Semi, start + 1)),
            '.' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('.') {
                    self.chars.next();
                    Ok((start, Token::DotDot, start + 2))
                } else {
                    Ok((start, Token::Dot, start + 1))
                }
            }
            '=' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('=') {
                    self.chars.next();
                    Ok((start, Token::EqEq, start + 2))
                } else {
                    Ok((start, Token::Eq, start + 1))
                }
            }
            '!' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('=') {
                    self.chars.next();
                    Ok((start, Token::NotEq, start + 2))
                } else {
                    Ok((start, Token::Bang, start + 1))
                }
            }
            '<' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('=') {
                    self.chars.next();
                    Ok((start, Token::Le, start + 2))
                } else {
                    Ok((start, Token::Lt, start + 1))
                }
            }
            '>' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('=') {
                    self.chars.next();
                    Ok((start, Token::Ge, start + 2))
                } else {
                    Ok((start, Token::Gt, start + 1))
                }
            }
            '&' => {
                if self.chars.peek().map(|(_, c)| *c) == Some('&') {
                    self.chars.next();
                    Ok((start, Token::AndAnd, start + 2))
                } else {
                    Err(LexError {
                        message: "unexpected `&` (did you mean `&&`?)".to_string(),
                        pos: start,
                    })
                }
            }
            '$' => {
                let name_start = start + 1;
                let mut end = name_start;
                while let Some((i, c)) = self.chars.peek().copied() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = i + 1;
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                Ok((start, Token::Global(&self.input[name_start..end]), end))
            }
            c if c.is_ascii_digit() => self.number(start),
            c if c.is_ascii_alphabetic() || c == '_' => self.ident_like(start),
            other => Err(LexError {
                message: format!("unexpected character `{other}`"),
                pos: start,
            }),
        };

        // `||` arrives as two single `Pipe` tokens from the match above;
        // fold them into one `OrOr` when adjacent. A lone `|` (block param
        // delimiter, e.g. `|i|`) is left alone.
        if let Ok((s, Token::Pipe, _)) = result {
            if self.chars.peek().map(|(_, c)| *c) == Some('|') {
                self.chars.next();
                self.last_significant = Some(Token::OrOr);
                return Some(Ok((s, Token::OrOr, s + 2)));
            }
        }

        if let Ok((_, ref tok, _)) = result {
            self.last_significant = Some(*tok);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Token<'_>> {
        Lexer::new(src)
            .map(|r| r.unwrap().1)
            .collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            toks("1 + 2.5 * x"),
            vec![
                Token::Int(1),
                Token::Plus,
                Token::Float(2.5),
                Token::Star,
                Token::Ident("x"),
            ]
        );
    }

    #[test]
    fn lexes_keywords_and_globals() {
        assert_eq!(
            toks("if $speed > 0"),
            vec![Token::If, Token::Global("speed"), Token::Gt, Token::Int(0)]
        );
    }

    #[test]
    fn folds_double_pipe_but_keeps_single() {
        assert_eq!(toks("a || b"), vec![Token::Ident("a"), Token::OrOr, Token::Ident("b")]);
        assert_eq!(
            toks("|i|"),
            vec![Token::Pipe, Token::Ident("i"), Token::Pipe]
        );
    }

    #[test]
    fn range_dots_not_confused_with_float() {
        assert_eq!(
            toks("0..10"),
            vec![Token::Int(0), Token::DotDot, Token::Int(10)]
        );
    }

    #[test]
    fn newline_terminates_unless_continuation() {
        assert_eq!(
            toks("a = 1\nb = 2"),
            vec![
                Token::Ident("a"),
                Token::Eq,
                Token::Int(1),
                Token::Newline,
                Token::Ident("b"),
                Token::Eq,
                Token::Int(2),
            ]
        );
        assert_eq!(
            toks("a = 1 +\n2"),
            vec![Token::Ident("a"), Token::Eq, Token::Int(1), Token::Plus, Token::Int(2)]
        );
    }
}
