/// RGBA8 pixels produced by a decoder.
#[derive(Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// A `width × height` image filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = (width as usize) * (height as usize);
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }

    /// Bytes per row.
    pub fn stride(&self) -> u32 {
        self.width * 4
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Texture coordinate wrapping outside `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

impl WrapMode {
    pub fn address_mode(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }
}

/// A decoded image plus its sampling setup, as bound to a shader parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub label: String,
    pub image: DecodedImage,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    /// Color images are stored sRGB-encoded; data textures are sampled raw.
    pub srgb: bool,
}

impl Texture {
    pub fn new(label: impl Into<String>, image: DecodedImage) -> Self {
        Self {
            label: label.into(),
            image,
            wrap_u: WrapMode::default(),
            wrap_v: WrapMode::default(),
            srgb: true,
        }
    }

    /// Marks the texture as data (sampled without sRGB decoding).
    pub fn as_data(mut self) -> Self {
        self.srgb = false;
        self
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        if self.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap_u = wrap;
        self.wrap_v = wrap;
        self
    }
}
