//! Expert query selection.
use crate::RolloutEntry;

/// Returns the most uncertain `floor(len * alpha)` entries of `log`.
///
/// The sort is stable and descending in uncertainty, so ties keep their
/// original step order. `alpha` is expected in `(0, 1]`; with `alpha == 1`
/// every logged step is selected. A prefix length of zero yields an empty
/// vector: that round contributes no new examples.
pub fn select_queries(mut log: Vec<RolloutEntry>, alpha: f64) -> Vec<RolloutEntry> {
    let n_queries = (log.len() as f64 * alpha).floor() as usize;
    log.sort_by(|a, b| b.uncertainty.total_cmp(&a.uncertainty));
    log.truncate(n_queries);
    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frame;

    fn log_with_uncertainties(scores: &[f32]) -> Vec<RolloutEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(t, u)| RolloutEntry {
                uncertainty: *u,
                frame: Frame::zeros(1, 1, 3),
                t,
                expert_steer: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_prefix_length_is_floor_of_len_times_alpha() {
        let scores = [0.3, 0.1, 0.9, 0.5, 0.7, 0.2, 0.4];
        for (alpha, expected) in [(1.0, 7), (0.5, 3), (0.3, 2), (0.1, 0)].iter() {
            let selected = select_queries(log_with_uncertainties(&scores), *alpha);
            assert_eq!(selected.len(), *expected);
        }
    }

    #[test]
    fn test_selection_keeps_the_highest_scores() {
        let selected = select_queries(log_with_uncertainties(&[0.3, 0.1, 0.9, 0.5, 0.7]), 0.5);
        let ts: Vec<usize> = selected.iter().map(|e| e.t).collect();
        assert_eq!(ts, vec![2, 4]);
    }

    #[test]
    fn test_uniform_scores_keep_step_order() {
        let selected = select_queries(log_with_uncertainties(&[0.5; 6]), 0.5);
        let ts: Vec<usize> = selected.iter().map(|e| e.t).collect();
        assert_eq!(ts, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_log_yields_empty_selection() {
        assert!(select_queries(Vec::new(), 1.0).is_empty());
    }
}
