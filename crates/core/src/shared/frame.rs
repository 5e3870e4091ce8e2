use ndarray::ArrayView3;

use crate::shared::face_box::FaceBox;

/// A decoded raster: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the domain layer
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the rows `top..bottom` and columns `left..right` of the box.
    ///
    /// The box is clamped to the frame first, so a box hanging off an edge
    /// yields the visible part and a box entirely outside yields a 0x0 frame.
    pub fn crop(&self, face_box: &FaceBox) -> Frame {
        let clamped = face_box.clamp_to(self.width, self.height);
        let crop_w = clamped.width() as usize;
        let crop_h = clamped.height() as usize;
        let channels = self.channels as usize;
        let row_len = self.width as usize * channels;

        let mut data = Vec::with_capacity(crop_w * crop_h * channels);
        for row in clamped.top as usize..clamped.bottom as usize {
            let start = row * row_len + clamped.left as usize * channels;
            data.extend_from_slice(&self.data[start..start + crop_w * channels]);
        }

        Frame::new(data, crop_w as u32, crop_h as u32, self.channels)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x3 frame where each pixel's R value encodes `row * 10 + col`.
    fn numbered_frame() -> Frame {
        let (w, h) = (4u32, 3u32);
        let mut data = Vec::new();
        for row in 0..h {
            for col in 0..w {
                data.extend_from_slice(&[(row * 10 + col) as u8, 0, 0]);
            }
        }
        Frame::new(data, w, h, 3)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let frame = numbered_frame();
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[3, 4, 3]);
        assert_eq!(arr[[2, 1, 0]], 21);
    }

    #[test]
    fn test_crop_slices_rows_and_columns() {
        let frame = numbered_frame();
        let crop = frame.crop(&FaceBox::new(1, 3, 3, 1));
        assert_eq!((crop.width(), crop.height()), (2, 2));
        let arr = crop.as_ndarray();
        assert_eq!(arr[[0, 0, 0]], 11);
        assert_eq!(arr[[0, 1, 0]], 12);
        assert_eq!(arr[[1, 0, 0]], 21);
        assert_eq!(arr[[1, 1, 0]], 22);
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let frame = numbered_frame();
        let crop = frame.crop(&FaceBox::new(-5, 10, 2, 2));
        assert_eq!((crop.width(), crop.height()), (2, 2));
        assert_eq!(crop.as_ndarray()[[0, 0, 0]], 2);
    }

    #[test]
    fn test_crop_outside_frame_is_empty() {
        let frame = numbered_frame();
        let crop = frame.crop(&FaceBox::new(50, 60, 70, 55));
        assert!(crop.is_empty());
        assert!(crop.data().is_empty());
    }
}
