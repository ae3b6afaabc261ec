//! Shared colors for the static renderer and the chart window.

/// Categorical colors, one per location.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (121, 85, 72),   // Brown
];

/// Fill for regions without a value.
pub const NO_DATA: (u8, u8, u8) = (200, 200, 200);

pub fn series_color(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

const PLASMA: [(u8, u8, u8); 5] = [
    (13, 8, 135),
    (126, 3, 168),
    (204, 71, 120),
    (248, 149, 64),
    (240, 249, 33),
];

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Continuous color scale for choropleths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Plasma,
    Viridis,
}

impl ColorScale {
    fn anchors(self) -> &'static [(u8, u8, u8)] {
        match self {
            ColorScale::Plasma => &PLASMA,
            ColorScale::Viridis => &VIRIDIS,
        }
    }

    /// Color at position `t`, clamped to `[0, 1]`.
    pub fn color_at(self, t: f64) -> (u8, u8, u8) {
        let anchors = self.anchors();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * (anchors.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = (lower + 1).min(anchors.len() - 1);
        let frac = pos - lower as f64;

        let (a, b) = (anchors[lower], anchors[upper]);
        let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * frac).round() as u8;
        (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    /// Whether text drawn on `color_at(t)` should be light.
    pub fn is_dark_at(self, t: f64) -> bool {
        let (r, g, b) = self.color_at(t);
        let luminance = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
        luminance < 140.0
    }
}
