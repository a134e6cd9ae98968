use cgmath::Matrix4;

/// Builds a matrix from 16 entries listed row by row.
pub fn matrix4_from_row_major(m: &[f32; 16]) -> Matrix4<f32> {
    Matrix4::new(
        m[0], m[4], m[8], m[12], //
        m[1], m[5], m[9], m[13], //
        m[2], m[6], m[10], m[14], //
        m[3], m[7], m[11], m[15],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_row_major_translation() {
        let m = matrix4_from_row_major(&[
            1.0, 0.0, 0.0, 5.0, //
            0.0, 1.0, 0.0, 6.0, //
            0.0, 0.0, 1.0, 7.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        assert_eq!(m, Matrix4::from_translation(Vector3::new(5.0, 6.0, 7.0)));
    }
}
