use crate::error::{Error, Result};
use nalgebra::Point2;
use rayon::prelude::*;

/// An axis-aligned rectangle in image space.
///
/// `x` runs along columns and `y` along rows. The bottom-right corner is
/// exclusive. A box may reach outside any given image; cropping with such a
/// box fails instead of clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropBox {
    pub top_left: Point2<i32>,
    pub bottom_right: Point2<i32>,
}

impl CropBox {
    pub fn new(top_left: Point2<i32>, bottom_right: Point2<i32>) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// A square of side `2 * half_width` centred on `center`.
    ///
    /// Corners saturate at the `i32` limits, so a centre far off screen gives
    /// a box that never fits an image.
    pub fn centered(center: Point2<i32>, half_width: i32) -> Self {
        Self {
            top_left: Point2::new(
                center.x.saturating_sub(half_width),
                center.y.saturating_sub(half_width),
            ),
            bottom_right: Point2::new(
                center.x.saturating_add(half_width),
                center.y.saturating_add(half_width),
            ),
        }
    }

    pub fn width(&self) -> i32 {
        self.bottom_right.x.saturating_sub(self.top_left.x)
    }

    pub fn height(&self) -> i32 {
        self.bottom_right.y.saturating_sub(self.top_left.y)
    }

    /// Returns `true` if the box is non-empty and lies within a `rows` x `cols` image.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.top_left.x >= 0
            && self.top_left.y >= 0
            && self.width() > 0
            && self.height() > 0
            && self.bottom_right.x as i64 <= cols as i64
            && self.bottom_right.y as i64 <= rows as i64
    }
}

/// A row-major buffer of pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

/// Rendered RGB image.
pub type ColorImage = Grid<[u8; 3]>;

/// Rendered depth buffer.
pub type DepthGrid = Grid<f32>;

impl<T> Grid<T> {
    /// Wraps `values`, which must hold exactly `rows * cols` entries.
    pub fn from_values(rows: usize, cols: usize, values: Vec<T>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::Configuration(format!(
                "expected {} values for a {rows}x{cols} grid but got {}",
                rows * cols,
                values.len()
            )));
        }

        Ok(Self { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }

        self.values.get(row * self.cols + col)
    }

    /// The box covering the whole grid.
    pub fn full_box(&self) -> CropBox {
        CropBox::new(
            Point2::new(0, 0),
            Point2::new(self.cols as i32, self.rows as i32),
        )
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            values: vec![value; rows * cols],
        }
    }
}

impl<T: Copy + Send + Sync> Grid<T> {
    /// Copies out the region covered by `crop_box`.
    pub fn crop(&self, crop_box: &CropBox) -> Result<Self> {
        if !crop_box.fits(self.rows, self.cols) {
            return Err(Error::CropOutsideImage {
                left: crop_box.top_left.x,
                top: crop_box.top_left.y,
                right: crop_box.bottom_right.x,
                bottom: crop_box.bottom_right.y,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let (left, right) = (
            crop_box.top_left.x as usize,
            crop_box.bottom_right.x as usize,
        );
        let (top, bottom) = (
            crop_box.top_left.y as usize,
            crop_box.bottom_right.y as usize,
        );

        let values: Vec<T> = self
            .values
            .par_chunks(self.cols)
            .skip(top)
            .take(bottom - top)
            .flat_map_iter(|row| row[left..right].iter().copied())
            .collect();

        Ok(Self {
            rows: bottom - top,
            cols: right - left,
            values,
        })
    }
}

impl ColorImage {
    /// Flattens the pixels into interleaved RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.values
            .par_iter()
            .flat_map_iter(|pixel| pixel.iter().copied())
            .collect()
    }
}
