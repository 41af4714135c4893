use std::fmt;

/// Binary operators available on the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Glyph used in the expression preview.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }

    /// Multiply and divide bind tighter than add and subtract.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Self::Multiply | Self::Divide)
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' | '−' => Some(Self::Subtract),
            '*' | 'x' | 'X' | '×' => Some(Self::Multiply),
            '/' | '÷' => Some(Self::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| format!("invalid operator: {s}")),
            _ => Err(format!("invalid operator: {s}")),
        }
    }
}

/// One unit of the expression sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Decimal literal, possibly still being typed (`"0."`, `"-"`).
    Operand(String),
    Operator(Operator),
}

impl Token {
    pub fn operand(text: impl Into<String>) -> Self {
        Self::Operand(text.into())
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    pub fn as_operand(&self) -> Option<&str> {
        match self {
            Self::Operand(text) => Some(text),
            Self::Operator(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(text) => f.write_str(text),
            Self::Operator(op) => op.fmt(f),
        }
    }
}

/// Split a rendered preview (`"7 + 3"`) back into tokens.
///
/// Words that are a single operator glyph become operators; anything else is
/// kept verbatim as an operand and validated only when evaluated.
pub fn split_expression(expression: &str) -> Vec<Token> {
    expression
        .split_whitespace()
        .map(|word| match word.parse::<Operator>() {
            Ok(op) => Token::Operator(op),
            Err(_) => Token::operand(word),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_ascii_and_glyph() {
        assert_eq!("*".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("×".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("÷".parse::<Operator>().unwrap(), Operator::Divide);
        assert_eq!(" - ".parse::<Operator>().unwrap(), Operator::Subtract);
        assert!("++".parse::<Operator>().is_err());
        assert!("7".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(Operator::Divide.to_string(), "÷");
        assert_eq!(Token::Operator(Operator::Add).to_string(), "+");
        assert_eq!(Token::operand("0.5").to_string(), "0.5");
    }

    #[test]
    fn test_split_expression() {
        let tokens = split_expression("12 × -3 + 0.5");
        assert_eq!(
            tokens,
            vec![
                Token::operand("12"),
                Token::Operator(Operator::Multiply),
                Token::operand("-3"),
                Token::Operator(Operator::Add),
                Token::operand("0.5"),
            ]
        );
    }

    #[test]
    fn test_split_expression_empty() {
        assert!(split_expression("   ").is_empty());
    }
}
