// THEORY:
// The `Pixel` module is the most fundamental unit of the detector. It is a "dumb"
// data container for a single RGBA sample plus the single-pixel color transforms
// the skin-tone classifier needs. Nothing here knows about neighbors, windows or
// clusters; anything spatial belongs to the scanner and the layers above it.
//
// Color transforms (all Rec. 601, computed in f64 on the 0..255 byte scale):
// - luma (Y):         0.299 R + 0.587 G + 0.114 B
// - blue chroma (Cb): 128 - 0.169 R - 0.331 G + 0.5 B
// - red chroma (Cr):  128 + 0.5 R - 0.419 G - 0.081 B
//
// The chroma coefficients are the rounded, offset form used by the skin heuristic.
// They are not bit-exact with JPEG's YCbCr but the thresholds were tuned on them.

pub mod pixel {
    pub type Channel = u8;
    pub type Luma = f64;
    pub type Chroma = f64;

    /// Bytes per interleaved RGBA sample.
    pub const CHANNELS: usize = 4;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255). Ignored by every heuristic.
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Self {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Reads the pixel starting at `byte_index` of an RGBA buffer.
        ///
        /// Only the R, G and B bytes have to be in bounds; a truncated final
        /// sample with a missing alpha byte still decodes with alpha 255.
        pub fn at(buffer: &[u8], byte_index: usize) -> Option<Self> {
            let rgb = buffer.get(byte_index..byte_index.checked_add(3)?)?;
            let alpha = buffer.get(byte_index + 3).copied().unwrap_or(u8::MAX);
            Some(Self::new(rgb[0], rgb[1], rgb[2], alpha))
        }

        /// Luminance estimate (Rec. 601 luma).
        pub fn luma(&self) -> Luma {
            0.299 * self.red as f64 + 0.587 * self.green as f64 + 0.114 * self.blue as f64
        }

        /// Blue-difference chroma, offset to be centered on 128.
        pub fn chroma_blue(&self) -> Chroma {
            128.0 - 0.169 * self.red as f64 - 0.331 * self.green as f64 + 0.5 * self.blue as f64
        }

        /// Red-difference chroma, offset to be centered on 128.
        pub fn chroma_red(&self) -> Chroma {
            128.0 + 0.5 * self.red as f64 - 0.419 * self.green as f64 - 0.081 * self.blue as f64
        }

        /// The (Y, Cb, Cr) triple in one call.
        pub fn ycbcr(&self) -> (Luma, Chroma, Chroma) {
            (self.luma(), self.chroma_blue(), self.chroma_red())
        }
    }
}
