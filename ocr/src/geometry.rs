use serde::{Deserialize, Serialize};

/// Pixel-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect {
            x,
            y,
            w: right - x,
            h: bottom - y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both() {
        let a = Rect::new(10, 10, 20, 10);
        let b = Rect::new(40, 5, 10, 10);
        assert_eq!(a.union(&b), Rect::new(10, 5, 40, 15));
    }

    #[test]
    fn intersection_of_overlap() {
        let a = Rect::new(0, 0, 30, 20);
        let b = Rect::new(20, 10, 30, 20);
        assert_eq!(a.intersection(&b), Some(Rect::new(20, 10, 10, 10)));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 0, 10, 10);
        assert_eq!(a.intersection(&b), None);
        // Touching edges count as disjoint.
        let c = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersection(&c), None);
    }
}
