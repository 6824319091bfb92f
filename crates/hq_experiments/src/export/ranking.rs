use crate::balance::{calculate_balance_scores, summarize_designs, BalanceWeights, DesignBalance};
use crate::metrics::ZoneResult;

pub(crate) fn find_best_index_by_balance(
    designs: &[DesignBalance],
    weights: &BalanceWeights,
) -> Option<usize> {
    let scores = calculate_balance_scores(designs, weights);
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(index, _)| index)
}

pub(crate) fn find_most_balanced_design_impl(
    results: &[ZoneResult],
    weights: &BalanceWeights,
) -> Option<DesignBalance> {
    let mut designs = summarize_designs(results);
    let best_idx = find_best_index_by_balance(&designs, weights)?;
    Some(designs.swap_remove(best_idx))
}
