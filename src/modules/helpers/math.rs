pub struct Math {}
impl Math {
    pub fn round_float_to_n_decimals(number: f64, decimals: i32) -> f64 {
        let multiplier = 10.0_f64.powi(decimals);
        (number * multiplier).round() / multiplier
    }

    /// mean of the values, `None` for an empty slice
    pub fn mean(nums: &[f64]) -> Option<f64> {
        if nums.is_empty() {
            return None;
        }

        let sum: f64 = nums.iter().sum();
        Some(sum / nums.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds() {
        assert_eq!(Math::round_float_to_n_decimals(1.23456, 2), 1.23);
        assert_eq!(Math::round_float_to_n_decimals(2.5, 0), 3.0);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(Math::mean(&[]), None);
        assert_eq!(Math::mean(&[1.0, 2.0, 4.5]), Some(2.5));
    }
}
