pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 0 => {
            let variance = data
                .iter()
                .map(|value| {
                    let diff = data_mean - *value;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
        _ => None,
    }
}

/// `std_dev / mean`; `None` for empty input or a zero mean.
pub fn coefficient_of_variation(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    if data_mean == 0.0 {
        return None;
    }
    std_dev(data).map(|sd| sd / data_mean)
}
