//! The column balancer: find the word-level split of a run list that
//! leaves two columns of nearly equal measured height.
//!
//! Hosts do not offer "balance these two columns" for rich per-run
//! styling, so balance is approximated by search: start from the naive
//! midpoint, probe a bounded neighborhood of candidate splits through the
//! metrics oracle, and keep the candidate with the smallest height delta.

use log::debug;

use quaderno_content::StyledRun;
use quaderno_style::FontCatalog;
use quaderno_surface::LayoutSurface;

use crate::config::LayoutConfig;
use crate::oracle;

/// Result of a balance search. `converged` reports whether the early-exit
/// threshold was met; when false the full probe range was exhausted and
/// the best candidate found is returned anyway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceOutcome {
    pub split_index: usize,
    pub left_height: f32,
    pub right_height: f32,
    pub probes: usize,
    pub converged: bool,
}

/// Find the token index that splits `tokens` into two columns of minimal
/// height difference at `column_width`.
#[allow(clippy::too_many_arguments)]
pub fn balance_tokens<S: LayoutSurface>(
    surface: &mut S,
    fonts: &FontCatalog,
    config: &LayoutConfig,
    tokens: &[StyledRun],
    column_width: f32,
    font_size: f32,
    family: Option<&str>,
    probe_height: f32,
) -> BalanceOutcome {
    let total = tokens.len();
    let midpoint = total / 2;
    let mut best = BalanceOutcome {
        split_index: midpoint,
        left_height: f32::INFINITY,
        right_height: 0.0,
        probes: 0,
        converged: false,
    };
    if total < 2 {
        return best;
    }

    // Probe the midpoint first, then walk outward in both directions.
    let reach = ((total as f32 * config.balance_search_fraction) as usize).max(5);
    let mut candidates = Vec::with_capacity(reach * 2 + 1);
    candidates.push(midpoint);
    for delta in 1..=reach {
        if midpoint >= delta && midpoint - delta > 0 {
            candidates.push(midpoint - delta);
        }
        if midpoint + delta < total {
            candidates.push(midpoint + delta);
        }
    }

    let mut best_delta = f32::INFINITY;
    let mut probes = 0;
    for split in candidates {
        if probes >= config.balance_probe_cap {
            break;
        }
        let left: String = tokens[..split].iter().map(|t| t.text.as_str()).collect();
        let right: String = tokens[split..].iter().map(|t| t.text.as_str()).collect();
        if left.trim().is_empty() || right.trim().is_empty() {
            continue;
        }

        let left_height = oracle::measure_height(
            surface,
            fonts,
            &left,
            column_width,
            font_size,
            family,
            probe_height,
        );
        let right_height = oracle::measure_height(
            surface,
            fonts,
            &right,
            column_width,
            font_size,
            family,
            probe_height,
        );
        probes += 1;

        let delta = (left_height - right_height).abs();
        if delta < best_delta {
            best_delta = delta;
            best = BalanceOutcome {
                split_index: split,
                left_height,
                right_height,
                probes,
                converged: delta < config.balance_threshold,
            };
        }
        if delta < config.balance_threshold {
            break;
        }
    }
    best.probes = probes;
    debug!(
        "balanced {} tokens at {} after {} probe(s), delta {:.1}pt",
        total,
        best.split_index,
        probes,
        (best.left_height - best.right_height).abs()
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use quaderno_surface::HeadlessSurface;

    fn tokens(words: usize) -> Vec<StyledRun> {
        (0..words)
            .map(|i| StyledRun::plain(format!("word{i} ")))
            .collect()
    }

    fn run_balance(tokens: &[StyledRun]) -> (BalanceOutcome, LayoutConfig) {
        let mut surface = HeadlessSurface::new();
        let config = LayoutConfig::default();
        let outcome = balance_tokens(
            &mut surface,
            &FontCatalog::default(),
            &config,
            tokens,
            200.0,
            9.0,
            None,
            300.0,
        );
        (outcome, config)
    }

    #[test]
    fn uniform_text_balances_near_the_midpoint() {
        let tokens = tokens(100);
        let (outcome, config) = run_balance(&tokens);
        assert!(outcome.split_index.abs_diff(50) <= 10);
        let delta = (outcome.left_height - outcome.right_height).abs();
        // Either converged under the threshold or the search ran its full
        // probe budget.
        assert!(delta <= config.balance_threshold || outcome.probes >= config.balance_probe_cap);
    }

    #[test]
    fn probe_count_respects_the_cap() {
        let tokens = tokens(400);
        let (outcome, config) = run_balance(&tokens);
        assert!(outcome.probes <= config.balance_probe_cap);
    }

    #[test]
    fn never_returns_an_empty_side() {
        let tokens = tokens(3);
        let (outcome, _) = run_balance(&tokens);
        assert!(outcome.split_index > 0);
        assert!(outcome.split_index < 3);
    }

    #[test]
    fn tiny_inputs_fall_back_to_the_midpoint() {
        let (outcome, _) = run_balance(&tokens(1));
        assert_eq!(outcome.split_index, 0);
        assert_eq!(outcome.probes, 0);
    }
}
