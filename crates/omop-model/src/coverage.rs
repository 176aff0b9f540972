/// Decimal places kept in coverage fractions.
const COVERAGE_PRECISION: f64 = 100_000.0;

/// `matched / (matched + missed)` rounded to five decimal places.
///
/// A field with no misses is fully covered, including one that was never looked up.
pub fn coverage_fraction(matched: usize, missed: usize) -> f64 {
    if missed == 0 {
        return 1.0;
    }
    let total = (matched + missed) as f64;
    ((matched as f64 / total) * COVERAGE_PRECISION).round() / COVERAGE_PRECISION
}

#[cfg(test)]
mod tests {
    use super::coverage_fraction;

    #[test]
    fn rounds_to_five_places() {
        assert_eq!(coverage_fraction(1, 2), 0.33333);
        assert_eq!(coverage_fraction(2, 1), 0.66667);
        assert_eq!(coverage_fraction(0, 3), 0.0);
    }

    #[test]
    fn no_misses_is_full_coverage() {
        assert_eq!(coverage_fraction(5, 0), 1.0);
        assert_eq!(coverage_fraction(0, 0), 1.0);
    }
}
