/// Cost estimation for the embed stage (§4.2 "Cost estimation").
///
/// `estimatedTokens = Σ estimate_tokens(chunk.text)`; `rate(model)` is not
/// specified by the source, so this exposes a small per-model table with a
/// conservative fallback rate (documented in DESIGN.md).
const CHARS_PER_TOKEN: usize = 4;
const DEFAULT_RATE_USD_PER_1K_TOKENS: f64 = 0.0001;

pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN) as u64
}

pub fn rate_usd_per_1k_tokens(model_id: &str) -> f64 {
    match model_id {
        "text-embedding-3-small" => 0.00002,
        "text-embedding-3-large" => 0.00013,
        _ => DEFAULT_RATE_USD_PER_1K_TOKENS,
    }
}

pub fn estimate_cost_usd(total_tokens: u64, model_id: &str) -> f64 {
    (total_tokens as f64 / 1000.0) * rate_usd_per_1k_tokens(model_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn cost_scales_with_tokens_and_rate() {
        let cost = estimate_cost_usd(1000, "text-embedding-3-small");
        assert!((cost - 0.00002).abs() < 1e-9);
    }
}
