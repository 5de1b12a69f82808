/// Ceiling applied to the device pixel ratio.
///
/// High-density displays report ratios of 3.0 and above; rendering at that
/// density multiplies fragment work for little visible gain.
pub const DEFAULT_MAX_PIXEL_RATIO: f32 = 2.0;

/// Output surface dimensions.
///
/// `width`/`height` are logical pixels; `pixel_ratio` is the device pixel ratio
/// after clamping. Only the resize path should write this value; everyone else
/// reads it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

impl ViewportState {
    #[inline]
    pub const fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Overwrites the state with a new logical size and an already-clamped ratio.
    #[inline]
    pub fn update(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
    }

    /// Logical width / height, or `None` for a degenerate (e.g. minimized) surface.
    #[inline]
    pub fn aspect(&self) -> Option<f32> {
        self.is_valid().then(|| self.width / self.height)
    }

    /// Size in device pixels: `(width × ratio, height × ratio)`.
    #[inline]
    pub fn device_size(&self) -> [f32; 2] {
        [self.width * self.pixel_ratio, self.height * self.pixel_ratio]
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Clamps a platform-reported device pixel ratio to `(0, max]`.
///
/// Non-finite or non-positive ratios fall back to `1.0`.
#[inline]
pub fn clamp_pixel_ratio(ratio: f32, max: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 { ratio.min(max) } else { 1.0 }
}
