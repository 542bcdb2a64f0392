use std::f32::consts::TAU;

/// Maps an angle to `[0, 2π)` so accumulated rotations can be compared
pub fn wrap_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Angular equality modulo 2π
pub fn angles_equivalent(a: f32, b: f32, epsilon: f32) -> bool {
    let diff = wrap_angle(a - b);
    diff < epsilon || TAU - diff < epsilon
}
