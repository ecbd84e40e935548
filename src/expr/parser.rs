//! Lexer and parser for the expression grammar.
//!
//! The grammar is deliberately small. Precedence, loosest to tightest:
//!
//! ```text
//! ||  &&  ==/!=  </<=/>/>=  +/-  */ //%  unary !,-  postfix . [] ()
//! ```
//!
//! Calls are only permitted on bare identifiers; which names exist is
//! decided at evaluation time against the builtin whitelist.

use smallvec::SmallVec;

use super::eval::EvalError;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Context lookup by name.
    Ident(String),
    /// Property access: `base.name`.
    Member(Box<Expr>, String),
    /// Index access: `base[expr]`.
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// Builtin call: `name(args...)`. Some builtins evaluate an argument
    /// lazily per collection element, so arguments stay unevaluated here.
    Call(String, Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    True,
    False,
    Null,
    Dot,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "`{name}`"),
            Token::Int(n) => write!(f, "`{n}`"),
            Token::Float(n) => write!(f, "`{n}`"),
            Token::Str(s) => write!(f, "string `{s}`"),
            Token::True => write!(f, "`true`"),
            Token::False => write!(f, "`false`"),
            Token::Null => write!(f, "`null`"),
            Token::Dot => write!(f, "`.`"),
            Token::Comma => write!(f, "`,`"),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::Bang => write!(f, "`!`"),
            Token::Plus => write!(f, "`+`"),
            Token::Minus => write!(f, "`-`"),
            Token::Star => write!(f, "`*`"),
            Token::Slash => write!(f, "`/`"),
            Token::Percent => write!(f, "`%`"),
            Token::Lt => write!(f, "`<`"),
            Token::Le => write!(f, "`<=`"),
            Token::Gt => write!(f, "`>`"),
            Token::Ge => write!(f, "`>=`"),
            Token::EqEq => write!(f, "`==`"),
            Token::NotEq => write!(f, "`!=`"),
            Token::AndAnd => write!(f, "`&&`"),
            Token::OrOr => write!(f, "`||`"),
        }
    }
}

fn lex(input: &str) -> Result<SmallVec<[Token; 16]>, EvalError> {
    let mut tokens = SmallVec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match name.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    _ => Token::Ident(name),
                });
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                let mut is_float = false;
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        literal.push(c);
                        chars.next();
                    } else if c == '.' {
                        // A digit must follow; `1.foo` is member access on 1,
                        // which the parser will reject downstream.
                        let mut ahead = chars.clone();
                        ahead.next();
                        match ahead.peek() {
                            Some(&(_, d)) if d.is_ascii_digit() => {
                                is_float = true;
                                literal.push('.');
                                chars.next();
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                if is_float {
                    let value = literal
                        .parse::<f64>()
                        .map_err(|_| EvalError::BadNumber(literal.clone()))?;
                    tokens.push(Token::Float(value));
                } else {
                    let value = literal
                        .parse::<i64>()
                        .map_err(|_| EvalError::BadNumber(literal.clone()))?;
                    tokens.push(Token::Int(value));
                }
            }
            '\'' | '"' => {
                let quote = ch;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    if c == quote {
                        closed = true;
                        break;
                    }
                    if c == '\\' {
                        match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        }
                    } else {
                        value.push(c);
                    }
                }
                if !closed {
                    return Err(EvalError::UnterminatedString);
                }
                tokens.push(Token::Str(value));
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '<' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    tokens.push(Token::EqEq);
                } else {
                    return Err(EvalError::UnexpectedChar('=', pos));
                }
            }
            '&' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '&'))) {
                    chars.next();
                    tokens.push(Token::AndAnd);
                } else {
                    return Err(EvalError::UnexpectedChar('&', pos));
                }
            }
            '|' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '|'))) {
                    chars.next();
                    tokens.push(Token::OrOr);
                } else {
                    return Err(EvalError::UnexpectedChar('|', pos));
                }
            }
            other => return Err(EvalError::UnexpectedChar(other, pos)),
        }
    }

    Ok(tokens)
}

/// Recursion cap for pathological inputs like `((((((...`.
const MAX_DEPTH: u32 = 64;

struct Parser {
    tokens: SmallVec<[Token; 16]>,
    pos: usize,
    depth: u32,
}

impl Parser {
    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            Err(EvalError::TooDeep)
        } else {
            Ok(())
        }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, EvalError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(EvalError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> Result<(), EvalError> {
        let token = self.next()?;
        if &token == expected {
            Ok(())
        } else {
            Err(EvalError::UnexpectedToken(token.to_string()))
        }
    }

    fn binary_op(token: &Token) -> Option<(BinaryOp, u8)> {
        let op = match token {
            Token::OrOr => (BinaryOp::Or, 1),
            Token::AndAnd => (BinaryOp::And, 2),
            Token::EqEq => (BinaryOp::Eq, 3),
            Token::NotEq => (BinaryOp::Ne, 3),
            Token::Lt => (BinaryOp::Lt, 4),
            Token::Le => (BinaryOp::Le, 4),
            Token::Gt => (BinaryOp::Gt, 4),
            Token::Ge => (BinaryOp::Ge, 4),
            Token::Plus => (BinaryOp::Add, 5),
            Token::Minus => (BinaryOp::Sub, 5),
            Token::Star => (BinaryOp::Mul, 6),
            Token::Slash => (BinaryOp::Div, 6),
            Token::Percent => (BinaryOp::Rem, 6),
            _ => return None,
        };
        Some(op)
    }

    fn expr(&mut self, min_bp: u8) -> Result<Expr, EvalError> {
        self.enter()?;
        let result = self.expr_inner(min_bp);
        self.leave();
        result
    }

    fn expr_inner(&mut self, min_bp: u8) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;

        while let Some(token) = self.peek() {
            let Some((op, bp)) = Self::binary_op(token) else {
                break;
            };
            if bp < min_bp {
                break;
            }
            self.next()?;
            // All binary operators are left-associative.
            let rhs = self.expr(bp + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let result = match self.peek() {
            Some(Token::Bang) => {
                self.next().and_then(|_| self.unary()).map(|inner| {
                    Expr::Unary(UnaryOp::Not, Box::new(inner))
                })
            }
            Some(Token::Minus) => {
                self.next().and_then(|_| self.unary()).map(|inner| {
                    Expr::Unary(UnaryOp::Neg, Box::new(inner))
                })
            }
            _ => self.postfix(),
        };
        self.leave();
        result
    }

    fn postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.primary()?;

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.next()?;
                    match self.next()? {
                        Token::Ident(name) => {
                            expr = Expr::Member(Box::new(expr), name);
                        }
                        other => return Err(EvalError::UnexpectedToken(other.to_string())),
                    }
                }
                Some(Token::LBracket) => {
                    self.next()?;
                    let index = self.expr(1)?;
                    self.expect(&Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                Some(Token::LParen) => {
                    // Calls attach to bare identifiers only; there are no
                    // callable values in the language.
                    let Expr::Ident(name) = expr else {
                        return Err(EvalError::NotCallable);
                    };
                    self.next()?;
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RParen) {
                        loop {
                            args.push(self.expr(1)?);
                            match self.peek() {
                                Some(Token::Comma) => {
                                    self.next()?;
                                }
                                _ => break,
                            }
                        }
                    }
                    self.expect(&Token::RParen)?;
                    expr = Expr::Call(name, args);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.next()? {
            Token::Null => Ok(Expr::Null),
            Token::True => Ok(Expr::Bool(true)),
            Token::False => Ok(Expr::Bool(false)),
            Token::Int(n) => Ok(Expr::Int(n)),
            Token::Float(n) => Ok(Expr::Float(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) => Ok(Expr::Ident(name)),
            Token::LParen => {
                let expr = self.expr(1)?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(EvalError::UnexpectedToken(other.to_string())),
        }
    }
}

/// Parse an expression string into an [`Expr`] tree.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr(1)?;
    if let Some(extra) = parser.peek() {
        return Err(EvalError::UnexpectedToken(extra.to_string()));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_path() {
        let expr = parse("player.attrs.score").unwrap();
        assert_eq!(
            expr,
            Expr::Member(
                Box::new(Expr::Member(
                    Box::new(Expr::Ident("player".into())),
                    "attrs".into()
                )),
                "score".into()
            )
        );
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Int(1)),
                Box::new(Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(Expr::Int(2)),
                    Box::new(Expr::Int(3))
                ))
            )
        );
    }

    #[test]
    fn test_call_requires_identifier() {
        assert!(matches!(parse("(a.b)(1)"), Err(EvalError::NotCallable)));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse("1 + 2 2").is_err());
        assert!(parse("").is_err());
        assert!(parse("a ~ b").is_err());
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(parse("'hi'").unwrap(), Expr::Str("hi".into()));
        assert_eq!(parse("\"hi\"").unwrap(), Expr::Str("hi".into()));
        assert!(parse("'unterminated").is_err());
    }
}
