//! 3x3 matrices (column-major), used for normal transforms

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

use crate::Vec3;

/// Column-major 3x3 matrix
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Mat3(pub [f32; 9]);

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ]);

    pub const ZERO: Self = Self([0.0; 9]);

    /// Element at `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 3 + row]
    }

    /// Inverse, or the zero matrix when singular
    pub fn inverse(&self) -> Self {
        let te = &self.0;
        let (n11, n21, n31) = (te[0], te[1], te[2]);
        let (n12, n22, n32) = (te[3], te[4], te[5]);
        let (n13, n23, n33) = (te[6], te[7], te[8]);

        let t11 = n33 * n22 - n32 * n23;
        let t12 = n32 * n13 - n33 * n12;
        let t13 = n23 * n12 - n22 * n13;

        let det = n11 * t11 + n21 * t12 + n31 * t13;
        if det == 0.0 {
            return Self::ZERO;
        }

        let inv = 1.0 / det;
        Self([
            t11 * inv,
            (n31 * n23 - n33 * n21) * inv,
            (n32 * n21 - n31 * n22) * inv,
            t12 * inv,
            (n33 * n11 - n31 * n13) * inv,
            (n31 * n12 - n32 * n11) * inv,
            t13 * inv,
            (n21 * n13 - n23 * n11) * inv,
            (n22 * n11 - n21 * n12) * inv,
        ])
    }

    /// Transpose
    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self([
            m[0], m[3], m[6],
            m[1], m[4], m[7],
            m[2], m[5], m[8],
        ])
    }

    /// Multiply a vector
    #[inline]
    pub fn mul_vec3(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0] * v.x + m[3] * v.y + m[6] * v.z,
            m[1] * v.x + m[4] * v.y + m[7] * v.z,
            m[2] * v.x + m[5] * v.y + m[8] * v.z,
        )
    }

    /// Columns padded to vec4 stride, matching GPU uniform layout rules
    pub fn to_padded_cols(&self) -> [[f32; 4]; 3] {
        let m = &self.0;
        [
            [m[0], m[1], m[2], 0.0],
            [m[3], m[4], m[5], 0.0],
            [m[6], m[7], m[8], 0.0],
        ]
    }
}

impl std::ops::Mul for Mat3 {
    type Output = Self;

    fn mul(self, b: Self) -> Self {
        let mut out = [0.0f32; 9];
        for col in 0..3 {
            for row in 0..3 {
                out[col * 3 + row] = (0..3).map(|k| self.0[k * 3 + row] * b.0[col * 3 + k]).sum();
            }
        }
        Self(out)
    }
}
