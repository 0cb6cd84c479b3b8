use monitor_core::{TokenCounts, model_matches_pattern};

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_1m: f64,
    pub output_per_1m: f64,
    pub cache_write_per_1m: f64,
    pub cache_read_per_1m: f64,
}

const fn price(input: f64, output: f64, cache_write: f64, cache_read: f64) -> ModelPrice {
    ModelPrice {
        input_per_1m: input,
        output_per_1m: output,
        cache_write_per_1m: cache_write,
        cache_read_per_1m: cache_read,
    }
}

// Most specific patterns first; the first match wins.
const PRICING_TABLE: &[(&str, ModelPrice)] = &[
    ("*opus-4-5*", price(5.0, 25.0, 6.25, 0.5)),
    ("*opus-4*", price(15.0, 75.0, 18.75, 1.5)),
    ("*3-opus*", price(15.0, 75.0, 18.75, 1.5)),
    ("*sonnet-4*", price(3.0, 15.0, 3.75, 0.3)),
    ("*3-7-sonnet*", price(3.0, 15.0, 3.75, 0.3)),
    ("*3-5-sonnet*", price(3.0, 15.0, 3.75, 0.3)),
    ("*haiku-4-5*", price(1.0, 5.0, 1.25, 0.1)),
    ("*3-5-haiku*", price(0.8, 4.0, 1.0, 0.08)),
    ("*3-haiku*", price(0.25, 1.25, 0.3, 0.03)),
];

pub fn price_for_model(model: &str) -> Option<ModelPrice> {
    PRICING_TABLE
        .iter()
        .find(|(pattern, _)| model_matches_pattern(model, pattern))
        .map(|(_, price)| *price)
}

/// Cost from the built-in table; unknown or missing models cost nothing.
pub fn calculate_cost(model: Option<&str>, tokens: &TokenCounts) -> f64 {
    let Some(price) = model.and_then(price_for_model) else {
        return 0.0;
    };
    let per_token = |count: u64, per_1m: f64| count as f64 * per_1m / 1_000_000.0;
    per_token(tokens.input_tokens, price.input_per_1m)
        + per_token(tokens.output_tokens, price.output_per_1m)
        + per_token(tokens.cache_creation_input_tokens, price.cache_write_per_1m)
        + per_token(tokens.cache_read_input_tokens, price.cache_read_per_1m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_opus_pattern_wins() {
        let price = price_for_model("claude-opus-4-5-20251101").expect("price");
        assert_eq!(price.input_per_1m, 5.0);
        let price = price_for_model("claude-opus-4-1-20250805").expect("price");
        assert_eq!(price.input_per_1m, 15.0);
    }

    #[test]
    fn cost_sums_every_token_kind() {
        let tokens = TokenCounts {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
            cache_creation_input_tokens: 1_000_000,
            cache_read_input_tokens: 1_000_000,
        };
        let cost = calculate_cost(Some("claude-sonnet-4-20250514"), &tokens);
        assert!((cost - (3.0 + 15.0 + 3.75 + 0.3)).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_costs_nothing() {
        let tokens = TokenCounts {
            input_tokens: 10,
            ..TokenCounts::default()
        };
        assert_eq!(calculate_cost(Some("gpt-5"), &tokens), 0.0);
        assert_eq!(calculate_cost(None, &tokens), 0.0);
    }
}
