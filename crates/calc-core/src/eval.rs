//! Two-pass precedence evaluation over a finalized token sequence.
//!
//! Pass 1 folds `×`/`÷` triplets left to right, pass 2 folds `+`/`-` into a
//! running total. There are no parentheses and no unary operators: a negative
//! literal is an operand whose text starts with `-`.

use crate::error::{CalcError, CalcResult};
use crate::token::{Operator, Token};

/// Evaluate `tokens` and render the result as display text.
pub fn evaluate(tokens: &[Token]) -> CalcResult<String> {
    evaluate_value(tokens).map(format_number)
}

/// Evaluate `tokens` to a finite `f64`.
///
/// The sequence must alternate operand/operator and start and end with an
/// operand; anything else is a [`CalcError::ParseFailure`].
pub fn evaluate_value(tokens: &[Token]) -> CalcResult<f64> {
    let (first, rest) = split_terms(tokens)?;

    // Pass 1: collapse multiplicative triplets into their left operand.
    let mut head = first;
    let mut additive: Vec<(Operator, f64)> = Vec::with_capacity(rest.len());
    for (op, right) in rest {
        if !op.is_multiplicative() {
            additive.push((op, right));
            continue;
        }
        let target = match additive.last_mut() {
            Some((_, value)) => value,
            None => &mut head,
        };
        if op == Operator::Divide {
            if right == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            *target = checked(*target / right)?;
        } else {
            *target = checked(*target * right)?;
        }
    }

    // Pass 2: left-associative additive fold.
    additive.into_iter().try_fold(head, |total, (op, value)| {
        let next = match op {
            Operator::Add => total + value,
            Operator::Subtract => total - value,
            Operator::Multiply | Operator::Divide => unreachable!("folded in pass 1"),
        };
        checked(next)
    })
}

/// Parse a decimal literal as typed on the keypad.
pub fn parse_operand(text: &str) -> CalcResult<f64> {
    let trimmed = text.trim();
    // `f64::from_str` also accepts "inf"/"nan"; keypad literals are digits only.
    let well_formed = trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && c == '-'));
    if !well_formed {
        return Err(CalcError::ParseFailure(text.to_string()));
    }
    // A literal past f64 range parses to infinity.
    trimmed
        .parse::<f64>()
        .map_err(|_| CalcError::ParseFailure(text.to_string()))
        .and_then(checked)
}

/// Render a value for display.
///
/// Integral values print without a fractional part, everything else uses the
/// default shortest round-trip decimal form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Covers -0.0 as well.
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return (value as i64).to_string();
    }
    value.to_string()
}

/// Apply `transform` to the numeric value of `text` and render the result.
pub fn transform_operand(text: &str, transform: impl Fn(f64) -> f64) -> CalcResult<String> {
    let value = parse_operand(text)?;
    checked(transform(value)).map(format_number)
}

fn checked(value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NumericOverflow)
    }
}

fn split_terms(tokens: &[Token]) -> CalcResult<(f64, Vec<(Operator, f64)>)> {
    let mut iter = tokens.iter();
    let first = match iter.next() {
        Some(Token::Operand(text)) => parse_operand(text)?,
        Some(Token::Operator(op)) => {
            return Err(CalcError::ParseFailure(format!("leading operator {op}")))
        }
        None => return Err(CalcError::ParseFailure("empty expression".into())),
    };

    let mut rest = Vec::with_capacity(tokens.len() / 2);
    while let Some(token) = iter.next() {
        let op = match token {
            Token::Operator(op) => *op,
            Token::Operand(text) => {
                return Err(CalcError::ParseFailure(format!("unexpected operand {text}")))
            }
        };
        let right = match iter.next() {
            Some(Token::Operand(text)) => parse_operand(text)?,
            Some(Token::Operator(next)) => {
                return Err(CalcError::ParseFailure(format!("{op} followed by {next}")))
            }
            None => return Err(CalcError::ParseFailure(format!("missing operand after {op}"))),
        };
        rest.push((op, right));
    }
    Ok((first, rest))
}
