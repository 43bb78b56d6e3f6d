use crate::error::{SketchError, SketchResult};

/// Luma weights applied to R, G and B
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Anything laid out as a row-major `width x height` grid
pub trait Dimensions {
    fn dimensions(&self) -> (usize, usize);
}

/// Fails with `DimensionMismatch` unless both grids have the same shape
pub fn ensure_same_dims<A: Dimensions, B: Dimensions>(a: &A, b: &B) -> SketchResult<()> {
    if a.dimensions() != b.dimensions() {
        return Err(SketchError::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        });
    }
    Ok(())
}

/// Row-major luminance samples in [0, 255]
#[derive(Debug, Clone, PartialEq)]
pub struct GrayBuffer {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl GrayBuffer {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> SketchResult<Self> {
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(SketchError::InvalidBuffer {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// Uniform buffer, mostly useful for blank canvases
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build from interleaved RGB triples (alpha already flattened)
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> SketchResult<Self> {
        let expected_len = width * height * 3;
        if rgb.len() != expected_len {
            return Err(SketchError::InvalidBuffer {
                expected_len,
                actual_len: rgb.len(),
            });
        }
        let data = rgb
            .chunks_exact(3)
            .map(|px| {
                LUMA_WEIGHTS[0] * px[0] as f32
                    + LUMA_WEIGHTS[1] * px[1] as f32
                    + LUMA_WEIGHTS[2] * px[2] as f32
            })
            .collect();
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Edge map of every sample strictly above `threshold`
    pub fn threshold_above(&self, threshold: f32) -> EdgeMap {
        EdgeMap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| v > threshold).collect(),
        }
    }
}

impl Dimensions for GrayBuffer {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Binary "is-edge" flags, same layout as the buffer they came from
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMap {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl EdgeMap {
    pub fn new(width: usize, height: usize, data: Vec<bool>) -> SketchResult<Self> {
        let expected_len = width * height;
        if data.len() != expected_len {
            return Err(SketchError::InvalidBuffer {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    /// Number of edge pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&e| e).count()
    }
}

impl Dimensions for EdgeMap {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Corner-like feature point with its Harris response
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keypoint {
    pub x: u32,
    pub y: u32,
    pub strength: f32,
}

impl Keypoint {
    pub fn distance_sq(&self, other: &Keypoint) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx * dx + dy * dy
    }
}
