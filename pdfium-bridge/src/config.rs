//! Bridge configuration

/// Tunables shared by every operation of a [`PdfBridge`](crate::PdfBridge).
///
/// # Example
///
/// ```
/// use pdfium_bridge::BridgeConfig;
///
/// let config = BridgeConfig::new()
///     .set_background_color([0x20, 0x20, 0x20])
///     .set_max_bookmarks(1000);
/// assert_eq!(config.max_bookmarks(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    background: [u8; 3],
    page_fill: [u8; 3],
    char_tolerance: (f64, f64),
    max_bookmarks: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            background: [0x84, 0x84, 0x84],
            page_fill: [0xFF, 0xFF, 0xFF],
            char_tolerance: (1.0, 1.0),
            max_bookmarks: 65_536,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color of surface pixels not covered by the page when the draw size is
    /// smaller than the surface.
    pub fn set_background_color(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    /// Color painted under the page before rendering into RGB_565 targets.
    pub fn set_page_fill_color(mut self, rgb: [u8; 3]) -> Self {
        self.page_fill = rgb;
        self
    }

    /// Hit-test tolerance for [`char_index_at`](crate::PdfBridge::char_index_at),
    /// in points.
    pub fn set_char_tolerance(mut self, x: f64, y: f64) -> Self {
        self.char_tolerance = (x, y);
        self
    }

    /// Upper bound on flattened outline entries.
    pub fn set_max_bookmarks(mut self, max: usize) -> Self {
        self.max_bookmarks = max;
        self
    }

    pub fn background_color(&self) -> [u8; 3] {
        self.background
    }

    pub fn page_fill_color(&self) -> [u8; 3] {
        self.page_fill
    }

    pub fn char_tolerance(&self) -> (f64, f64) {
        self.char_tolerance
    }

    pub fn max_bookmarks(&self) -> usize {
        self.max_bookmarks
    }
}
