//! Column-major 4×4 matrix helpers, laid out the way `uniformMatrix4fv`
//! expects them with `transpose = false`.

pub const MATRIX_FLOATS: usize = 16;

pub type Matrix4 = [f32; MATRIX_FLOATS];

pub fn identity_matrix() -> Matrix4 {
    let mut out = [0.0; MATRIX_FLOATS];
    out[0] = 1.0;
    out[5] = 1.0;
    out[10] = 1.0;
    out[15] = 1.0;
    out
}

pub fn perspective_matrix(
    fov_y_radians: f32,
    aspect: f32,
    near: f32,
    far: f32,
) -> Result<Matrix4, &'static str> {
    if !fov_y_radians.is_finite() || fov_y_radians <= 0.0 {
        return Err("fov_y_radians must be positive");
    }
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err("aspect ratio must be positive");
    }
    if !near.is_finite() || !far.is_finite() || near <= 0.0 || far <= near {
        return Err("near/far planes must satisfy 0 < near < far");
    }

    let f = 1.0 / (fov_y_radians * 0.5).tan();
    let nf = 1.0 / (near - far);
    let mut out = [0.0; MATRIX_FLOATS];
    out[0] = f / aspect;
    out[5] = f;
    out[10] = (far + near) * nf;
    out[11] = -1.0;
    out[14] = 2.0 * far * near * nf;
    Ok(out)
}

/// `m` post-multiplied by a translation, i.e. the translation is applied in
/// `m`'s local frame.
pub fn translate(m: &Matrix4, offset: [f32; 3]) -> Matrix4 {
    let [x, y, z] = offset;
    let mut out = *m;
    for row in 0..4 {
        out[12 + row] = m[row] * x + m[4 + row] * y + m[8 + row] * z + m[12 + row];
    }
    out
}

pub fn transpose(m: &Matrix4) -> Matrix4 {
    let mut out = [0.0; MATRIX_FLOATS];
    for col in 0..4 {
        for row in 0..4 {
            out[row * 4 + col] = m[col * 4 + row];
        }
    }
    out
}

/// General inverse by cofactor expansion; `None` for singular matrices.
pub fn invert(m: &Matrix4) -> Option<Matrix4> {
    let b00 = m[0] * m[5] - m[1] * m[4];
    let b01 = m[0] * m[6] - m[2] * m[4];
    let b02 = m[0] * m[7] - m[3] * m[4];
    let b03 = m[1] * m[6] - m[2] * m[5];
    let b04 = m[1] * m[7] - m[3] * m[5];
    let b05 = m[2] * m[7] - m[3] * m[6];
    let b06 = m[8] * m[13] - m[9] * m[12];
    let b07 = m[8] * m[14] - m[10] * m[12];
    let b08 = m[8] * m[15] - m[11] * m[12];
    let b09 = m[9] * m[14] - m[10] * m[13];
    let b10 = m[9] * m[15] - m[11] * m[13];
    let b11 = m[10] * m[15] - m[11] * m[14];

    let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let inv_det = det.recip();

    Some([
        (m[5] * b11 - m[6] * b10 + m[7] * b09) * inv_det,
        (m[2] * b10 - m[1] * b11 - m[3] * b09) * inv_det,
        (m[13] * b05 - m[14] * b04 + m[15] * b03) * inv_det,
        (m[10] * b04 - m[9] * b05 - m[11] * b03) * inv_det,
        (m[6] * b08 - m[4] * b11 - m[7] * b07) * inv_det,
        (m[0] * b11 - m[2] * b08 + m[3] * b07) * inv_det,
        (m[14] * b02 - m[12] * b05 - m[15] * b01) * inv_det,
        (m[8] * b05 - m[10] * b02 + m[11] * b01) * inv_det,
        (m[4] * b10 - m[5] * b08 + m[7] * b06) * inv_det,
        (m[1] * b08 - m[0] * b10 - m[3] * b06) * inv_det,
        (m[12] * b04 - m[13] * b02 + m[15] * b00) * inv_det,
        (m[9] * b02 - m[8] * b04 - m[11] * b00) * inv_det,
        (m[5] * b07 - m[4] * b09 - m[6] * b06) * inv_det,
        (m[0] * b09 - m[1] * b07 + m[2] * b06) * inv_det,
        (m[13] * b01 - m[12] * b03 - m[14] * b00) * inv_det,
        (m[8] * b03 - m[9] * b01 + m[10] * b00) * inv_det,
    ])
}

pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut out = [0.0; MATRIX_FLOATS];
    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_matrix_eq(actual: &Matrix4, expected: &Matrix4) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-5);
        }
    }

    #[test]
    fn perspective_rejects_bad_parameters() {
        assert!(perspective_matrix(0.0, 1.0, 0.1, 10.0).is_err());
        assert!(perspective_matrix(1.0, f32::INFINITY, 0.1, 10.0).is_err());
        assert!(perspective_matrix(1.0, 1.0, 0.0, 10.0).is_err());
        assert!(perspective_matrix(1.0, 1.0, 10.0, 1.0).is_err());
    }

    #[test]
    fn perspective_scales_by_aspect() {
        let fov = 45f32.to_radians();
        let m = perspective_matrix(fov, 2.0, 0.1, 10000.0).unwrap();
        let f = 1.0 / (fov / 2.0).tan();
        assert_abs_diff_eq!(m[0], f / 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(m[5], f, epsilon = 1e-6);
        assert_eq!(m[11], -1.0);
        assert_eq!(m[15], 0.0);
    }

    #[test]
    fn translate_writes_last_column() {
        let m = translate(&identity_matrix(), [1.0, -2.0, -1.5]);
        assert_eq!(&m[12..], &[1.0, -2.0, -1.5, 1.0]);
        assert_eq!(&m[..12], &identity_matrix()[..12]);
    }

    #[test]
    fn inverse_of_translation_negates_offset() {
        let m = translate(&identity_matrix(), [0.5, 0.0, -3.0]);
        let inv = invert(&m).unwrap();
        assert_matrix_eq(&inv, &translate(&identity_matrix(), [-0.5, 0.0, 3.0]));
        assert_matrix_eq(&multiply(&m, &inv), &identity_matrix());
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(invert(&[0.0; MATRIX_FLOATS]).is_none());
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m: Matrix4 = std::array::from_fn(|i| i as f32);
        let t = transpose(&m);
        assert_eq!(t[1], m[4]);
        assert_eq!(t[12], m[3]);
        assert_eq!(transpose(&t), m);
    }
}
