use crate::engine::EngineState;
use crate::token::Token;

/// Preview line for the display: every token so far, space separated.
///
/// The live operand is the trailing operand token while it is open, so it is
/// included automatically. The untouched initial state renders as `""`.
pub fn preview(state: &EngineState) -> String {
    render_tokens(state.tokens())
}

pub fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::apply_all;
    use crate::key::parse_keys;
    use crate::token::Operator;

    #[test]
    fn test_initial_state_is_empty() {
        assert_eq!(preview(&EngineState::default()), "");
    }

    #[test]
    fn test_render_tokens() {
        let tokens = vec![
            Token::operand("7"),
            Token::Operator(Operator::Add),
            Token::operand("3"),
        ];
        assert_eq!(render_tokens(&tokens), "7 + 3");
    }

    #[test]
    fn test_preview_tracks_open_operand() {
        let state = apply_all(EngineState::default(), parse_keys("12*3.5").unwrap());
        assert_eq!(preview(&state), "12 × 3.5");

        let state = apply_all(state, parse_keys("-").unwrap());
        assert_eq!(preview(&state), "12 × 3.5 -");
    }
}
