//! Edit-distance helpers for typo-tolerant suggestions.

/// Optimal-string-alignment distance between two strings.
///
/// Counts insertions, deletions, substitutions, and adjacent transpositions
/// as one edit each, so `gti` is one edit away from `git`.
#[must_use]
pub fn edit_distance(left: &str, right: &str) -> usize {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    if left_chars.is_empty() {
        return right_chars.len();
    }
    if right_chars.is_empty() {
        return left_chars.len();
    }

    let width = right_chars.len() + 1;
    let mut before_previous = vec![0; width];
    let mut previous: Vec<usize> = (0..width).collect();
    let mut current = vec![0; width];

    for (row, left_char) in left_chars.iter().enumerate() {
        if let Some(first) = current.first_mut() {
            *first = row + 1;
        }
        for (column, right_char) in right_chars.iter().enumerate() {
            let cost = usize::from(left_char != right_char);
            let deletion = cell(&previous, column + 1).saturating_add(1);
            let insertion = cell(&current, column).saturating_add(1);
            let substitution = cell(&previous, column).saturating_add(cost);
            let mut best = deletion.min(insertion).min(substitution);

            let transposed = row > 0
                && column > 0
                && left_chars.get(row - 1) == Some(right_char)
                && right_chars.get(column - 1) == Some(left_char);
            if transposed {
                best = best.min(cell(&before_previous, column - 1).saturating_add(1));
            }
            if let Some(slot) = current.get_mut(column + 1) {
                *slot = best;
            }
        }
        std::mem::swap(&mut before_previous, &mut previous);
        std::mem::swap(&mut previous, &mut current);
    }

    previous.last().copied().unwrap_or_default()
}

fn cell(row: &[usize], column: usize) -> usize {
    row.get(column).copied().unwrap_or(usize::MAX)
}

/// Normalized similarity in `[0, 1]`: `1 - distance / longest length`.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "command names are short; the ratio is a ranking heuristic"
)]
pub fn similarity(left: &str, right: &str) -> f64 {
    let longest = left.chars().count().max(right.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(left, right) as f64 / longest as f64
}
