use super::ImageF64;

/// Borrowed 8-bit grayscale view, e.g. over a decoded PNG buffer.
#[derive(Clone, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Intensities normalized to `[0, 1]` by dividing by 255.
    pub fn to_normalized(&self) -> ImageF64 {
        let mut out = ImageF64::new(self.w, self.h);
        for y in 0..self.h {
            let src = crate::image::ImageView::row(self, y);
            let dst = crate::image::ImageViewMut::row_mut(&mut out, y);
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = s as f64 / 255.0;
            }
        }
        out
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strided_view_normalizes_only_visible_pixels() {
        // 2x2 image padded to a stride of 3; the padding byte must be ignored.
        let data = [0u8, 255, 7, 51, 102, 9];
        let view = ImageU8 {
            w: 2,
            h: 2,
            stride: 3,
            data: &data,
        };
        let img = view.to_normalized();
        assert_eq!(img.get(1, 0), 1.0);
        assert!((img.get(0, 1) - 0.2).abs() < 1e-12);
        assert!((img.get(1, 1) - 0.4).abs() < 1e-12);
    }
}
