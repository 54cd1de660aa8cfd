/// Gaussian envelope of one reflector, evaluated at `range_m`.
pub fn reflector_envelope(range_m: f64, center_m: f64, width_m: f64, amplitude: f64) -> f64 {
    let offset = (range_m - center_m) / width_m;
    amplitude * (-0.5 * offset * offset).exp()
}
