//! Tokenizer and recursive-descent parser for ratio formulas.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | NAME | '(' expr ')'
//! ```
//!
//! A bare NAME is a run of characters up to the next operator, parenthesis or
//! quote, with surrounding whitespace trimmed. Names containing those
//! characters are written in double quotes. A NUMBER may carry a signed
//! exponent such as `1e-3`.

use super::{BinaryOp, Expr, FormulaError};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Name(name) => name.clone(),
            Self::Op(op) => op.symbol().to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    position: usize,
}

const fn is_delimiter(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '"')
}

/// True when `run` is a number literal cut off right after its `e`.
fn awaits_exponent(run: &str) -> bool {
    run.trim_start()
        .strip_suffix(['e', 'E'])
        .is_some_and(|mantissa| {
            mantissa.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                && mantissa.parse::<f64>().is_ok()
        })
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        let token = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => Token::Op(BinaryOp::Add),
            '-' => Token::Op(BinaryOp::Sub),
            '*' => Token::Op(BinaryOp::Mul),
            '/' => Token::Op(BinaryOp::Div),
            '(' => Token::LParen,
            ')' => Token::RParen,
            '"' => {
                chars.next();
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(FormulaError::UnterminatedQuote(position));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(FormulaError::UnexpectedToken {
                        found: "\"\"".to_string(),
                        position,
                    });
                }
                tokens.push(Spanned {
                    token: Token::Name(name.to_string()),
                    position,
                });
                continue;
            }
            _ => {
                let mut run = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    let exponent_sign = matches!(c, '+' | '-') && awaits_exponent(&run) && {
                        let mut ahead = chars.clone();
                        ahead.next();
                        ahead.peek().is_some_and(|&(_, d)| d.is_ascii_digit())
                    };
                    if is_delimiter(c) && !exponent_sign {
                        break;
                    }
                    run.push(c);
                    chars.next();
                }
                let run = run.trim();
                let token = if run.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                    && let Ok(value) = run.parse::<f64>()
                {
                    Token::Number(value)
                } else {
                    Token::Name(run.to_string())
                };
                tokens.push(Spanned { token, position });
                continue;
            }
        };
        chars.next();
        tokens.push(Spanned { token, position });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ (BinaryOp::Add | BinaryOp::Sub))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ (BinaryOp::Mul | BinaryOp::Div))) = self.peek() {
            let op = *op;
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek() {
            Some(Token::Op(BinaryOp::Sub)) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Op(BinaryOp::Add)) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let Some(Spanned { token, position }) = self.advance() else {
            return Err(FormulaError::UnexpectedEnd);
        };
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::Name(name) => Ok(Expr::Field(name)),
            Token::LParen => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken {
                        found: other.token.describe(),
                        position: other.position,
                    }),
                    None => Err(FormulaError::UnclosedParen(position)),
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.describe(),
                position,
            }),
        }
    }
}

/// Parse a formula into an expression tree.
pub(super) fn parse(source: &str) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    if let Some(extra) = parser.advance() {
        return Err(FormulaError::UnexpectedToken {
            found: extra.token.describe(),
            position: extra.position,
        });
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Expr {
        Expr::Field(name.to_string())
    }

    #[test]
    fn test_names_with_spaces() {
        let expr = parse("Current Assets / Current Liabilities").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Div,
                field("Current Assets"),
                field("Current Liabilities")
            )
        );
    }

    #[test]
    fn test_precedence_and_parentheses() {
        let expr = parse("(A - B) / C * 2").unwrap();
        let expected = Expr::binary(
            BinaryOp::Mul,
            Expr::binary(
                BinaryOp::Div,
                Expr::binary(BinaryOp::Sub, field("A"), field("B")),
                field("C"),
            ),
            Expr::Number(2.0),
        );
        assert_eq!(expr, expected);

        let expr = parse("A + B * C").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                field("A"),
                Expr::binary(BinaryOp::Mul, field("B"), field("C"))
            )
        );
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse("-Capital Expenditure").unwrap();
        assert_eq!(expr, Expr::Neg(Box::new(field("Capital Expenditure"))));
    }

    #[test]
    fn test_signed_exponent() {
        assert_eq!(
            parse("X * 1e-3").unwrap(),
            Expr::binary(BinaryOp::Mul, field("X"), Expr::Number(0.001))
        );
        assert_eq!(parse("2.5E+2").unwrap(), Expr::Number(250.0));
        // Without a digit after the sign it stays a subtraction.
        assert_eq!(
            parse("1e - 3").unwrap(),
            Expr::binary(BinaryOp::Sub, field("1e"), Expr::Number(3.0))
        );
    }

    #[test]
    fn test_quoted_names() {
        let expr = parse(r#""Long-Term Debt" / "Stockholders Equity""#).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Div,
                field("Long-Term Debt"),
                field("Stockholders Equity")
            )
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("   "), Err(FormulaError::Empty));
        assert_eq!(parse("A /"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse("(A + B"), Err(FormulaError::UnclosedParen(0)));
        assert_eq!(parse("\"A"), Err(FormulaError::UnterminatedQuote(0)));
        assert!(matches!(
            parse("A B)"),
            Err(FormulaError::UnexpectedToken { position: 3, .. })
        ));
        assert!(matches!(
            parse("* A"),
            Err(FormulaError::UnexpectedToken { position: 0, .. })
        ));
    }
}
