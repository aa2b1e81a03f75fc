use super::*;

#[test]
fn test_levene_median_two_groups() {
    let a = [1.0, 2.0, 3.0, 4.0, 5.0];
    let b = [10.0, 20.0, 30.0, 40.0, 50.0];
    let result = levene_median(&[&a, &b]).unwrap();
    assert!((result.statistic - 8.2489391796).abs() < 1e-6);
    assert!(result.p_value > 0.015 && result.p_value < 0.03);
}

#[test]
fn test_levene_identical_groups() {
    let a = [1.0, 2.0, 3.0];
    let result = levene_median(&[&a, &a]).unwrap();
    assert_eq!(result.statistic, 0.0);
    assert_eq!(result.p_value, 1.0);
}

#[test]
fn test_levene_rejects_short_groups() {
    let a = [1.0, 2.0];
    let single = [1.0];
    assert!(matches!(
        levene_median(&[&a]),
        Err(StatError::TooFewValues(..))
    ));
    assert!(matches!(
        levene_median(&[&a, &single]),
        Err(StatError::TooFewValues(..))
    ));
}

#[test]
fn test_levene_zero_spread() {
    let a = [5.0, 5.0, 5.0, 5.0];
    let b = [7.0, 7.0, 7.0, 7.0];
    assert!(matches!(
        levene_median(&[&a, &b]),
        Err(StatError::ZeroSpread)
    ));
}
