use std::fmt;

use crate::token::Operator;

/// A single keypad tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Decimal digit `0..=9`.
    Digit(u8),
    Decimal,
    Operator(Operator),
    SignToggle,
    Percent,
    Backspace,
    Clear,
    Equals,
}

impl Key {
    pub fn digit(d: u8) -> Option<Self> {
        (d <= 9).then_some(Self::Digit(d))
    }

    pub fn from_char(c: char) -> Option<Self> {
        if let Some(d) = c.to_digit(10) {
            return Some(Self::Digit(d as u8));
        }
        if let Some(op) = Operator::from_char(c) {
            return Some(Self::Operator(op));
        }
        match c {
            '.' | ',' => Some(Self::Decimal),
            '%' => Some(Self::Percent),
            '=' => Some(Self::Equals),
            'n' | 'N' | '±' => Some(Self::SignToggle),
            '<' | '⌫' => Some(Self::Backspace),
            'c' | 'C' => Some(Self::Clear),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{d}"),
            Self::Decimal => write!(f, "."),
            Self::Operator(op) => write!(f, "{op}"),
            Self::SignToggle => write!(f, "±"),
            Self::Percent => write!(f, "%"),
            Self::Backspace => write!(f, "⌫"),
            Self::Clear => write!(f, "C"),
            Self::Equals => write!(f, "="),
        }
    }
}

/// Parse a run of keypad glyphs, ignoring whitespace.
pub fn parse_keys(line: &str) -> Result<Vec<Key>, String> {
    line.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Key::from_char(c).ok_or_else(|| format!("unknown key: '{c}'")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        let keys = parse_keys("7 + 3 =").unwrap();
        assert_eq!(
            keys,
            vec![
                Key::Digit(7),
                Key::Operator(Operator::Add),
                Key::Digit(3),
                Key::Equals
            ]
        );
    }

    #[test]
    fn test_parse_keys_glyphs() {
        let keys = parse_keys("6÷0n%<c.").unwrap();
        assert_eq!(
            keys,
            vec![
                Key::Digit(6),
                Key::Operator(Operator::Divide),
                Key::Digit(0),
                Key::SignToggle,
                Key::Percent,
                Key::Backspace,
                Key::Clear,
                Key::Decimal,
            ]
        );
    }

    #[test]
    fn test_parse_keys_unknown() {
        let err = parse_keys("7 ^ 2").unwrap_err();
        assert!(err.contains('^'));
    }

    #[test]
    fn test_digit_bounds() {
        assert_eq!(Key::digit(9), Some(Key::Digit(9)));
        assert_eq!(Key::digit(10), None);
    }

    #[test]
    fn test_display_roundtrips_through_from_char() {
        for key in [Key::Digit(4), Key::Percent, Key::Equals, Key::SignToggle, Key::Backspace] {
            let glyph = key.to_string().chars().next().unwrap();
            assert_eq!(Key::from_char(glyph), Some(key));
        }
    }
}
