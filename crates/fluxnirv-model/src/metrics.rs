//! Regression metrics over parallel actual/predicted slices. All of them
//! return 0.0 for empty input rather than dividing by zero.

pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let actual = [1.0, 2.0, 3.0];
        assert_eq!(mse(&actual, &actual), 0.0);
        assert_eq!(rmse(&actual, &actual), 0.0);
        assert_eq!(mae(&actual, &actual), 0.0);
        assert_eq!(r2_score(&actual, &actual), 1.0);
    }

    #[test]
    fn known_values() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [2.0, 2.0, 3.0, 3.0];

        assert_eq!(mse(&actual, &predicted), 0.5);
        assert!((rmse(&actual, &predicted) - 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(mae(&actual, &predicted), 0.5);
    }

    #[test]
    fn r2_of_mean_prediction_is_zero() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        assert!(r2_score(&actual, &predicted).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(mse(&[], &[]), 0.0);
        assert_eq!(r2_score(&[], &[]), 0.0);
    }
}
