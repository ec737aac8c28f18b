use core::ops;

use bytemuck::{Pod, Zeroable};

use crate::vec::*;

/// Column major 4x4 matrix, `e[column][row]`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Mat4 {
    pub e: [[f32; 4]; 4],
}

impl Mat4 {
    #[inline]
    pub fn new() -> Mat4 {
        Mat4::default()
    }

    #[inline]
    pub fn from_columns(v: &[Vec4; 4]) -> Mat4 {
        let mut m = Mat4::new();
        for i in 0..4 {
            m.e[i] = v[i].to_slice();
        }
        m
    }

    #[inline]
    pub fn identity() -> Mat4 {
        let mut m = Mat4::new();
        for i in 0..4 {
            m.e[i][i] = 1.0;
        }
        m
    }

    #[inline]
    pub fn transpose(&self) -> Mat4 {
        let mut m = Mat4::new();
        for j in 0..4 {
            for i in 0..4 {
                m.e[j][i] = self.e[i][j];
            }
        }
        m
    }

    #[inline]
    pub fn to_columns(&self) -> [Vec4; 4] {
        self.e.map(|c| Vec4::from_slice(&c))
    }

    #[inline]
    pub fn to_rows(&self) -> [Vec4; 4] {
        self.transpose().to_columns()
    }

    pub fn translation(v: Vec3) -> Self {
        let mut m = Mat4::identity();
        m.e[3][0..3].copy_from_slice(&v.to_slice());

        m
    }

    #[inline]
    pub fn get_translation(&self) -> Vec3 {
        Vec3::new(self.e[3][0], self.e[3][1], self.e[3][2])
    }
}

impl ops::Mul<Mat4> for Mat4 {
    type Output = Mat4;

    #[inline]
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut m = Mat4::new();

        let a = self.to_rows();
        let b = rhs.to_columns();

        for j in 0..4 {
            for i in 0..4 {
                m.e[j][i] = Vec4::dot(a[i], b[j]);
            }
        }
        m
    }
}

impl ops::Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        let a = self.to_rows();
        Vec4::new(a[0].dot(rhs), a[1].dot(rhs), a[2].dot(rhs), a[3].dot(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_neutral() {
        let t = Mat4::translation(Vec3::new(4.0, 5.0, 6.0));

        assert_eq!(Mat4::identity() * t, t);
        assert_eq!(t * Mat4::identity(), t);
    }

    #[test]
    fn translations_compose() {
        let a = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        let b = Mat4::translation(Vec3::new(0.0, 2.0, 0.0));

        assert_eq!((a * b).get_translation(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(a.transpose().e[0][3], 1.0);
    }
}
