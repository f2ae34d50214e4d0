use crate::arrayops::gridspace;

pub fn gaussian(x: f64, center: f64, height: f64, sigma: f64) -> f64 {
    height * (-(x - center).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// Two well separated gaussian peaks at x = 3 and x = 7 sampled every 0.05 over `0..10`
pub fn two_peaks() -> (Vec<f64>, Vec<f64>) {
    let x = gridspace(0.0, 10.0, 0.05);
    let y = x
        .iter()
        .map(|x| gaussian(*x, 3.0, 100.0, 0.3) + gaussian(*x, 7.0, 40.0, 0.4))
        .collect();
    (x, y)
}

/// Deterministic small amplitude noise in `[-amplitude, amplitude]`
pub fn noise(n: usize, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let v = (i as f64 * 12.9898).sin() * 43758.5453;
            (v - v.floor()) * 2.0 * amplitude - amplitude
        })
        .collect()
}

/// [`two_peaks`] with [`noise`] added
pub fn noisy_two_peaks(amplitude: f64) -> (Vec<f64>, Vec<f64>) {
    let (x, y) = two_peaks();
    let e = noise(y.len(), amplitude);
    let y = y.iter().zip(e.iter()).map(|(y, e)| y + e).collect();
    (x, y)
}
