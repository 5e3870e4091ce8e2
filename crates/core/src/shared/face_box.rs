/// A detected face bounding box in `top, right, bottom, left` pixel order.
///
/// `right` and `bottom` are exclusive, so the box covers rows
/// `top..bottom` and columns `left..right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from `[x1, y1, x2, y2]` float corners, rounding outward.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            top: y1.floor() as i32,
            right: x2.ceil() as i32,
            bottom: y2.ceil() as i32,
            left: x1.floor() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Intersects the box with a `frame_width` x `frame_height` frame.
    ///
    /// The result never has negative extent; an empty intersection collapses
    /// to a zero-sized box at the nearest edge.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> FaceBox {
        let fw = frame_width as i32;
        let fh = frame_height as i32;
        let left = self.left.clamp(0, fw);
        let top = self.top.clamp(0, fh);
        FaceBox {
            top,
            right: self.right.clamp(left, fw),
            bottom: self.bottom.clamp(top, fh),
            left,
        }
    }
}
