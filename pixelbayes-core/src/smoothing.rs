use crate::Float;

/// Pseudo-count added to every category.
pub const LAPLACE_SMOOTHING: Float = 1.0;

/// Computes an **additively smoothed** (Laplace) probability from a category count.
///
/// Smoothing keeps every estimate strictly positive, so a shade or label that never
/// appeared in training does not zero out a whole log-likelihood.
///
/// # Definition
///
/// For a category observed `c` times out of `n` trials over `k` categories:
///
/// ```text
/// P = (α + c) / (k·α + n)        with α = 1
/// ```
///
/// Because every category shares the same denominator and the counts partition the
/// `n` trials, the `k` smoothed probabilities sum to exactly `1`.
///
/// # Parameters
///
/// - `count`: Number of trials that fell in this category.
/// - `total`: Number of trials overall.
/// - `categories`: Number of categories `k`. Feature probabilities use the number of
///   shades; priors use the number of labels.
///
/// # Examples
///
/// ```rust
/// use pixelbayes_core::smoothing::laplace_from_counts;
///
/// // 2 of 4 images of a label have a shaded pixel here, 3 shade categories
/// let p = laplace_from_counts(2, 4, 3);
///
/// assert!((p - 3.0 / 7.0).abs() < 1e-6);
/// ```
///
/// # Notes
///
/// - With `total == 0` every category gets `1 / k`.
/// - Returns `inf` only when both `categories` and `total` are zero; callers reject
///   that case before computing.
pub fn laplace_from_counts(count: usize, total: usize, categories: usize) -> Float {
    (LAPLACE_SMOOTHING + count as Float)
        / (categories as Float * LAPLACE_SMOOTHING + total as Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laplace_empty_category_is_uniform() {
        let p = laplace_from_counts(0, 0, 3);
        assert!((p - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_laplace_partition_sums_to_one() {
        let counts = [5usize, 0, 2];
        let total: usize = counts.iter().sum();
        let sum: Float = counts
            .iter()
            .map(|&c| laplace_from_counts(c, total, counts.len()))
            .sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_laplace_never_zero() {
        assert!(laplace_from_counts(0, 1_000_000, 3) > 0.0);
    }
}
