use crate::error::{SketchError, SketchResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Every tunable constant of the scoring pipeline.
///
/// All server instances must run with identical values, otherwise the same
/// drawing scores differently depending on where it lands. Thresholds and
/// patch sizes are empirical; treat them as configuration rather than protocol.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringConfig {
    /// Both images are resampled to `canonical_size x canonical_size`
    pub canonical_size: usize,
    /// Sobel magnitude above which a pixel counts as an edge (0-255 scale)
    pub edge_threshold: f32,
    /// Half-width of the square contour matching window, in pixels
    pub contour_tolerance: usize,
    /// Harris sensitivity `k`
    pub harris_k: f32,
    /// Radius of the second-moment summation window
    pub harris_window_radius: usize,
    /// Candidate spacing of the corner detector
    pub keypoint_stride: usize,
    /// Minimum Harris response to keep a candidate
    pub keypoint_threshold: f32,
    pub max_keypoints: usize,
    /// Keypoint match radius as a fraction of `canonical_size`
    pub keypoint_tolerance_ratio: f64,
    pub similarity_patch: usize,
    /// Intensities below this are ink
    pub ink_threshold: f32,
    pub spatial_patch: usize,
    /// Reference patch ink ratio below which it counts as empty
    pub empty_patch_ratio: f64,
    /// Submission patch ink ratio above which it counts as drawn on
    pub meaningful_patch_ratio: f64,
    /// Submission opacity in the overlay artifact
    pub overlay_alpha: f32,
    /// Gap between the two panels of the side-by-side artifact
    pub gutter: u32,
    pub n_threads: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            canonical_size: 512,
            edge_threshold: 30.0,
            contour_tolerance: 3,
            harris_k: 0.04,
            harris_window_radius: 2,
            keypoint_stride: 3,
            keypoint_threshold: 1.0e8,
            max_keypoints: 200,
            keypoint_tolerance_ratio: 0.05,
            similarity_patch: 16,
            ink_threshold: 200.0,
            spatial_patch: 32,
            empty_patch_ratio: 0.02,
            meaningful_patch_ratio: 0.05,
            overlay_alpha: 0.5,
            gutter: 16,
            n_threads: num_cpus::get().max(1),
        }
    }
}

impl ScoringConfig {
    /// Distance within which a submission keypoint matches a reference keypoint
    pub fn keypoint_tolerance(&self) -> f64 {
        self.keypoint_tolerance_ratio * self.canonical_size as f64
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "ScoringConfig: {0}x{0}, edge>{1}, contour_tol={2}px, harris(k={3}, stride={4}, max={5}), patches=[ssim:{6}, spatial:{7}]",
            self.canonical_size,
            self.edge_threshold,
            self.contour_tolerance,
            self.harris_k,
            self.keypoint_stride,
            self.max_keypoints,
            self.similarity_patch,
            self.spatial_patch
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> SketchResult<()> {
        let fail = |msg: String| Err(SketchError::InvalidConfig(msg));

        // Sobel and the Harris window both need a full neighbourhood somewhere
        let min_size = 2 * (self.harris_window_radius + 1) + 1;
        if self.canonical_size < min_size.max(3) {
            return fail(format!(
                "canonical_size {} too small (minimum {})",
                self.canonical_size,
                min_size.max(3)
            ));
        }
        if !(0.0..255.0).contains(&self.edge_threshold) {
            return fail(format!("edge_threshold {} outside [0, 255)", self.edge_threshold));
        }
        if !(self.harris_k > 0.0 && self.harris_k < 0.25) {
            return fail(format!("harris_k {} outside (0, 0.25)", self.harris_k));
        }
        if self.harris_window_radius == 0 || self.keypoint_stride == 0 || self.max_keypoints == 0 {
            return fail("harris window radius, stride and max_keypoints must be positive".into());
        }
        if !(self.keypoint_tolerance_ratio > 0.0 && self.keypoint_tolerance_ratio <= 1.0) {
            return fail(format!(
                "keypoint_tolerance_ratio {} outside (0, 1]",
                self.keypoint_tolerance_ratio
            ));
        }
        if self.similarity_patch == 0 || self.spatial_patch == 0 {
            return fail("patch sizes must be positive".into());
        }
        if !(0.0..=255.0).contains(&self.ink_threshold) {
            return fail(format!("ink_threshold {} outside [0, 255]", self.ink_threshold));
        }
        if self.empty_patch_ratio >= self.meaningful_patch_ratio {
            return fail(format!(
                "empty_patch_ratio {} must be below meaningful_patch_ratio {}",
                self.empty_patch_ratio, self.meaningful_patch_ratio
            ));
        }
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return fail(format!("overlay_alpha {} outside [0, 1]", self.overlay_alpha));
        }
        if self.n_threads == 0 {
            return fail("n_threads must be positive".into());
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from a `.json` or `.toml` file, picked by extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            Some("toml") => Self::load_toml(path),
            _ => Err(format!("unsupported config format: {}", path.display()).into()),
        }
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
