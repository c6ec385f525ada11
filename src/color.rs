//! Layer fill colors handed to the rendering shell.

use std::fmt;

/// RGBA color; alpha in [0.0, 1.0].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self { Self { r, g, b, a } }
}

impl fmt::Display for Rgba {
    /// Format as CSS: rgba(r,g,b,a)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = if self.a.is_finite() { self.a.clamp(0.0, 1.0) } else { 1.0 };
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, a)
    }
}

/// Half-transparent fills cycled through as documents are loaded.
pub const LOAD_PALETTE: [Rgba; 5] = [
    Rgba::new(255,   0,   0, 0.5),
    Rgba::new(  0, 255,   0, 0.5),
    Rgba::new(  0,   0, 255, 0.5),
    Rgba::new(255, 255,   0, 0.5),
    Rgba::new(255,   0, 255, 0.5),
];

/// Fill for union, intersection and clip results.
pub const OVERLAY: Rgba = Rgba::new(0, 0, 0, 0.5);

/// Fill for buffer results.
pub const BUFFERED: Rgba = Rgba::new(128, 0, 128, 0.5);

/// CSS `lightgray`, used for dissolve results.
pub const DISSOLVED: Rgba = Rgba::new(211, 211, 211, 1.0);

/// Pick the palette color for the `n`-th loaded document.
#[inline]
pub fn palette(n: usize) -> Rgba { LOAD_PALETTE[n % LOAD_PALETTE.len()] }
