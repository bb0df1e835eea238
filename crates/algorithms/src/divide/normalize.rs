//! Min-max normalization of per-cell attributes

/// Minimum and maximum of the defined (non-NaN) values, in one pass.
///
/// Returns `None` when no value is defined.
pub fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rescale `values` to [0, 1] with `(v - min) / (max - min)`.
///
/// NaN stays NaN. A zero range maps every defined value to 0.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let Some((lo, hi)) = value_range(values) else {
        return values.to_vec();
    };
    let range = hi - lo;

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if range > 0.0 {
                (v - lo) / range
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_basic() {
        let out = normalize(&[10.0, 20.0, 15.0, 30.0]);
        assert_relative_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 0.5);
        assert_relative_eq!(out[2], 0.25);
        assert_relative_eq!(out[3], 1.0);
    }

    #[test]
    fn test_normalize_keeps_nan() {
        let out = normalize(&[f64::NAN, 1.0, 3.0]);
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 0.0);
        assert_relative_eq!(out[2], 1.0);
    }

    #[test]
    fn test_normalize_zero_range() {
        let out = normalize(&[4.0, 4.0, f64::NAN]);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert!(out[2].is_nan());
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[3.0, f64::NAN, -1.0]), Some((-1.0, 3.0)));
        assert_eq!(value_range(&[f64::NAN]), None);
        assert!(normalize(&[]).is_empty());
    }
}
