//! Row-oriented access shared by the borrowed 8-bit view and the owned
//! floating-point fields. Rows are `stride` samples apart; only the first
//! `width` of each are visible.

pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    /// Visible samples of row `y`.
    fn row(&self, y: usize) -> &[Self::Pixel];

    /// `(height, width)`, the order in which fields are compared for shape.
    fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}
