//! Binary classification scores used by cross-validation.

/// Recall of the positive class. Returns 0.0 when there are no
/// positive truths (zero-division convention, never NaN).
pub fn recall(y_true: &[i32], y_pred: &[i32]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    let mut tp = 0usize;
    let mut fn_ = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t == 1 {
            if p == 1 {
                tp += 1;
            } else {
                fn_ += 1;
            }
        }
    }
    if tp + fn_ == 0 {
        0.0
    } else {
        tp as f64 / (tp + fn_) as f64
    }
}

/// F1 of the positive class, 0.0 when precision + recall is zero.
pub fn f1(y_true: &[i32], y_pred: &[i32]) -> f64 {
    debug_assert_eq!(y_true.len(), y_pred.len());
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t, p) {
            (1, 1) => tp += 1,
            (0, 1) => fp += 1,
            (1, 0) => fn_ += 1,
            _ => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        2.0 * tp as f64 / denom as f64
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0).
pub fn std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}
