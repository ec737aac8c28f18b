use crate::vec::Vec3;

/// Axis aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds3 {
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Vec3::from_scalar(f32::INFINITY),
            max: Vec3::from_scalar(f32::NEG_INFINITY),
        }
    }

    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn extend(&mut self, p: Vec3) {
        self.min = Vec3::min(self.min, p);
        self.max = Vec3::max(self.max, p);
    }

    #[inline]
    pub fn union(&mut self, other: &Bounds3) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min);
        self.extend(other.max);
    }

    /// Midpoint of the box, the origin for an empty box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::default();
        }
        (self.max - self.min) * 0.5 + self.min
    }

    #[inline]
    pub fn extents(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::default();
        }
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box() {
        let b = Bounds3::empty();
        assert!(b.is_empty());
        assert_eq!(b.center(), Vec3::default());
        assert_eq!(b.extents(), Vec3::default());
    }

    #[test]
    fn union_skips_empty() {
        let mut a = Bounds3::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        a.union(&Bounds3::empty());
        assert_eq!(a.max, Vec3::new(1.0, 1.0, 1.0));

        a.union(&Bounds3::new(Vec3::new(-1.0, 0.5, 0.5), Vec3::new(0.0, 3.0, 0.5)));
        assert_eq!(a.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(a.max, Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(a.center(), Vec3::new(0.0, 1.5, 0.5));
    }
}
