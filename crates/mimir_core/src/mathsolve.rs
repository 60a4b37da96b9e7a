//! Arithmetic detection and evaluation for utterances.
//!
//! Filler phrases are stripped, the shorthand letter `x` becomes `*`, and
//! anything left containing an operator is evaluated as arithmetic. The
//! `x` substitution is blind to word boundaries and will mangle alphabetic
//! tokens containing an `x`; that behavior is pinned by tests.

use once_cell::sync::Lazy;
use regex::Regex;

/// Returned whenever an utterance looks like math but won't evaluate.
pub const APOLOGY: &str = "Sorry, I couldn't solve that math problem.";

static FILLER_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)what is|calculate|do|find|solve|compute|work out|answer")
        .expect("filler pattern compiles")
});

/// Try to treat `utterance` as a math query.
///
/// Returns `None` when no operator survives cleanup (not a math query).
/// Otherwise always returns a response: the formatted result, or the fixed
/// apology when the expression won't parse or evaluates to a non-finite
/// value.
pub fn solve(utterance: &str) -> Option<String> {
    let cleaned = FILLER_PHRASES.replace_all(utterance, "");
    let cleaned = cleaned.trim().replace('x', "*");

    if !cleaned
        .chars()
        .any(|c| matches!(c, '+' | '-' | '*' | '/' | '^'))
    {
        return None;
    }

    match evaluate(&cleaned) {
        Ok(value) => Some(format!("The answer is: {}", format_value(value))),
        Err(_) => Some(APOLOGY.to_string()),
    }
}

/// Integral results print without a fractional part.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, PartialEq)]
enum EvalError {
    UnexpectedEnd,
    UnexpectedChar(char),
    BadNumber,
    NotFinite,
}

fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let mut parser = Parser {
        input: expr.as_bytes(),
        pos: 0,
    };
    let value = parser.expr()?;
    parser.skip_whitespace();
    if parser.pos != parser.input.len() {
        return Err(EvalError::UnexpectedChar(parser.input[parser.pos] as char));
    }
    if !value.is_finite() {
        return Err(EvalError::NotFinite);
    }
    Ok(value)
}

/// Recursive-descent parser over `+ - * / ^`, unary minus and parentheses.
/// `^` is exponentiation and binds tighter than unary minus, so `-2 ^ 2`
/// is `-4`.
struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        loop {
            match self.peek_operator() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.unary()?;
        loop {
            match self.peek_operator() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.peek_operator() == Some(b'-') {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.atom()?;
        if self.peek_operator() == Some(b'^') {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        match self.input.get(self.pos) {
            None => Err(EvalError::UnexpectedEnd),
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                self.skip_whitespace();
                match self.input.get(self.pos) {
                    Some(b')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(&c) => Err(EvalError::UnexpectedChar(c as char)),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || *c == b'.' => self.number(),
            Some(&c) => Err(EvalError::UnexpectedChar(c as char)),
        }
    }

    fn number(&mut self) -> Result<f64, EvalError> {
        let start = self.pos;
        while let Some(c) = self.input.get(self.pos) {
            if c.is_ascii_digit() || *c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or(EvalError::BadNumber)
    }

    fn peek_operator(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self
            .input
            .get(self.pos)
            .map_or(false, |c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_shorthand() {
        assert_eq!(
            solve("what is 2 x 3 + 1"),
            Some("The answer is: 7".to_string())
        );
    }

    #[test]
    fn division_keeps_fraction() {
        assert_eq!(
            solve("calculate 10 / 4"),
            Some("The answer is: 2.5".to_string())
        );
    }

    #[test]
    fn caret_is_exponentiation() {
        assert_eq!(solve("2 ^ 3"), Some("The answer is: 8".to_string()));
        assert_eq!(solve("2 ^ 3 ^ 2"), Some("The answer is: 512".to_string()));
    }

    #[test]
    fn exponent_binds_tighter_than_negation() {
        assert_eq!(solve("0 - 2 ^ 2"), Some("The answer is: -4".to_string()));
    }

    #[test]
    fn parentheses_and_precedence() {
        assert_eq!(
            solve("(2 + 3) * 4"),
            Some("The answer is: 20".to_string())
        );
        assert_eq!(solve("2 + 3 * 4"), Some("The answer is: 14".to_string()));
    }

    #[test]
    fn plain_text_is_not_math() {
        assert_eq!(solve("hello there"), None);
        assert_eq!(solve("what is the weather"), None);
    }

    #[test]
    fn malformed_expression_apologizes() {
        assert_eq!(solve("2 + * 3"), Some(APOLOGY.to_string()));
        assert_eq!(solve("2 +"), Some(APOLOGY.to_string()));
    }

    #[test]
    fn division_by_zero_apologizes() {
        assert_eq!(solve("1 / 0"), Some(APOLOGY.to_string()));
    }

    #[test]
    fn bare_x_becomes_an_operator() {
        // "what is x" strips to "x", which the shorthand turns into "*".
        // Carried over from the reference behavior.
        assert_eq!(solve("what is x"), Some(APOLOGY.to_string()));
    }

    #[test]
    fn filler_stripping_ignores_case() {
        assert_eq!(solve("SOLVE 6 x 7"), Some("The answer is: 42".to_string()));
    }
}
