//! Ranking metrics for binary scores.

/// Average precision: sum over thresholds of `(R_k - R_{k-1}) * P_k`.
///
/// Missing when `y` has no positives.
pub fn average_precision(y: &[u8], scores: &[f64]) -> Option<f64> {
    let total_pos = y.iter().filter(|&&v| v == 1).count();
    if total_pos == 0 || y.len() != scores.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..y.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let (mut tp, mut fp) = (0usize, 0usize);
    let mut prev_recall = 0.0;
    let mut ap = 0.0;
    for (k, &i) in order.iter().enumerate() {
        if y[i] == 1 {
            tp += 1;
        } else {
            fp += 1;
        }
        // Only close a threshold where the score changes.
        let last_of_tie = order
            .get(k + 1)
            .is_none_or(|&j| scores[j] != scores[i]);
        if !last_of_tie {
            continue;
        }
        let recall = tp as f64 / total_pos as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }
    Some(ap)
}

/// Area under the ROC curve via the rank statistic, ties averaged.
///
/// Missing unless both classes are present.
pub fn roc_auc(y: &[u8], scores: &[f64]) -> Option<f64> {
    if y.len() != scores.len() {
        return None;
    }
    let pos = y.iter().filter(|&&v| v == 1).count();
    let neg = y.len() - pos;
    if pos == 0 || neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..y.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; y.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        let avg = (start + end) as f64 / 2.0 + 1.0;
        for &i in &order[start..=end] {
            ranks[i] = avg;
        }
        start = end + 1;
    }

    let rank_sum: f64 = y
        .iter()
        .zip(&ranks)
        .filter(|(label, _)| **label == 1)
        .map(|(_, r)| r)
        .sum();
    let p = pos as f64;
    Some((rank_sum - p * (p + 1.0) / 2.0) / (p * neg as f64))
}
