use argminmax::ArgMinMax;
use statrs::statistics::{Data, Median};

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// Even-length input returns the average of the two middle values
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Data::new(values.to_vec()).median()
}

/// Absolute value of `pct` percent of `price`
pub fn pct_of(price: f64, pct: f64) -> f64 {
    (price * pct / 100.0).abs()
}
