//! Fuzzy matching of abbreviation fragments against known names.

/// How well `abbr` matches `target`, from 0 (no match) to 1 (exact).
///
/// Every abbreviation character must be found in order in the target; a
/// character found early scores more than one found late, and a character
/// right after a `-` in the target counts double. With `partial`, matching
/// stops at the first missing character instead of failing.
pub fn score_match(abbr: &str, target: &str, partial: bool) -> f64 {
    let abbr: Vec<char> = abbr.to_lowercase().chars().collect();
    let target: Vec<char> = target.to_lowercase().chars().collect();

    if abbr == target && !abbr.is_empty() {
        return 1.0;
    }
    if abbr.is_empty() || target.is_empty() || abbr[0] != target[0] {
        return 0.0;
    }

    let abbr_len = abbr.len();
    let target_len = target.len();
    let mut i = 1;
    let mut j = 1;
    let mut score = target_len as f64;

    while i < abbr_len {
        let mut found = false;
        let mut acronym = false;

        while j < target_len {
            if abbr[i] == target[j] {
                found = true;
                let weight = if acronym { 2.0 } else { 1.0 };
                score += (target_len - j) as f64 * weight;
                j += 1;
                break;
            }
            acronym = target[j] == '-';
            j += 1;
        }

        if !found {
            if !partial {
                return 0.0;
            }
            break;
        }
        i += 1;
    }

    let ratio = i as f64 / abbr_len as f64;
    let delta = target_len.saturating_sub(abbr_len);
    score * ratio / (sum(target_len) - sum(delta))
}

fn sum(n: usize) -> f64 {
    (n * (n + 1)) as f64 / 2.0
}

/// Best-scoring item whose key matches `abbr`. An exact match wins
/// immediately; among equal scores the last one wins.
pub fn find_best_match<T>(
    items: impl IntoIterator<Item = T>,
    abbr: &str,
    key: impl Fn(&T) -> &str,
    min_score: f64,
    partial: bool,
) -> Option<(T, f64)> {
    let mut best: Option<(T, f64)> = None;
    let mut max_score = 0.0;

    for item in items {
        let score = score_match(abbr, key(&item), partial);
        if score == 1.0 {
            return Some((item, score));
        }
        if score > 0.0 && score >= max_score {
            max_score = score;
            best = Some((item, score));
        }
    }

    best.filter(|(_, score)| *score >= min_score)
}
