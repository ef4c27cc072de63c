//! # Colour classification
//!
//! Maps raw three channel readings from the colour sensors to discrete
//! labels, and provides the luma scalar used by line control.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Order in which the classification rules are tried.
pub const PRIORITY: [ColorLabel; 5] = [
    ColorLabel::Red,
    ColorLabel::Green,
    ColorLabel::Blue,
    ColorLabel::Black,
    ColorLabel::White,
];

/// Luma weights of the R, G and B channels, in thousandths.
const LUMA_WEIGHTS_PERMILLE: [i32; 3] = [299, 587, 114];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single reading from a colour sensor.
///
/// Channels are nominally in the range 0-255 but are not validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorReading {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Discrete colour labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorLabel {
    Red,
    Green,
    Blue,
    Black,
    White,
    Unknown,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ColorReading {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    /// Classify this reading, see [`classify`].
    pub fn label(&self) -> ColorLabel {
        classify(self)
    }

    /// Luma of this reading, see [`luma`].
    pub fn luma(&self) -> i32 {
        luma(self)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Return the first label in [`PRIORITY`] whose rule matches the reading, or
/// `Unknown` if none do.
pub fn classify(reading: &ColorReading) -> ColorLabel {
    PRIORITY
        .iter()
        .copied()
        .find(|label| matches(reading, *label))
        .unwrap_or(ColorLabel::Unknown)
}

/// Test a reading against the rule of a single label.
///
/// All bounds are strict. `Unknown` has no rule and never matches.
pub fn matches(reading: &ColorReading, label: ColorLabel) -> bool {
    let ColorReading { r, g, b } = *reading;

    match label {
        ColorLabel::Red => r > 160 && g < 60 && b < 30,
        ColorLabel::Green => r < 40 && g > 130 && b < 60,
        ColorLabel::Blue => r < 40 && g < 30 && b > 150,
        ColorLabel::Black => r < 50 && g < 50 && b < 50,
        ColorLabel::White => r > 150 && g > 150 && b > 150,
        ColorLabel::Unknown => false,
    }
}

/// Brightness of a reading, `0.299R + 0.587G + 0.114B` truncated toward zero.
///
/// Computed in integer thousandths so that e.g. a grey of 50 gives exactly 50.
/// Channels are not range checked, so the sum is widened and the result
/// saturates at the `i32` bounds.
pub fn luma(reading: &ColorReading) -> i32 {
    let weighted = LUMA_WEIGHTS_PERMILLE[0] as i64 * reading.r as i64
        + LUMA_WEIGHTS_PERMILLE[1] as i64 * reading.g as i64
        + LUMA_WEIGHTS_PERMILLE[2] as i64 * reading.b as i64;

    (weighted / 1000).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_rules() {
        assert_eq!(classify(&ColorReading::new(180, 20, 10)), ColorLabel::Red);
        assert_eq!(classify(&ColorReading::new(20, 150, 30)), ColorLabel::Green);
        assert_eq!(classify(&ColorReading::new(10, 10, 200)), ColorLabel::Blue);
        assert_eq!(classify(&ColorReading::new(20, 20, 20)), ColorLabel::Black);
        assert_eq!(classify(&ColorReading::new(200, 200, 200)), ColorLabel::White);
        assert_eq!(classify(&ColorReading::new(100, 100, 100)), ColorLabel::Unknown);
    }

    #[test]
    fn test_raised_green_is_unknown() {
        // Fails the red bound on G and the green bound on R
        assert_eq!(classify(&ColorReading::new(180, 70, 10)), ColorLabel::Unknown);
    }

    #[test]
    fn test_bounds_are_strict() {
        assert_eq!(classify(&ColorReading::new(161, 59, 29)), ColorLabel::Red);
        assert_eq!(classify(&ColorReading::new(160, 59, 29)), ColorLabel::Unknown);
        assert_eq!(classify(&ColorReading::new(39, 131, 59)), ColorLabel::Green);
        assert_eq!(classify(&ColorReading::new(39, 130, 59)), ColorLabel::Unknown);
        assert_eq!(classify(&ColorReading::new(49, 49, 49)), ColorLabel::Black);
        assert_eq!(classify(&ColorReading::new(50, 49, 49)), ColorLabel::Unknown);
        assert_eq!(classify(&ColorReading::new(151, 151, 151)), ColorLabel::White);
        assert_eq!(classify(&ColorReading::new(150, 151, 151)), ColorLabel::Unknown);
    }

    #[test]
    fn test_classify_agrees_with_first_matching_rule() {
        // Sweep a coarse grid of the colour cube and check the label is the
        // first rule in priority order that matches, or unknown if none do.
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(15) {
                for b in (0..=255).step_by(15) {
                    let reading = ColorReading::new(r, g, b);
                    let matching: Vec<ColorLabel> = PRIORITY
                        .iter()
                        .copied()
                        .filter(|l| matches(&reading, *l))
                        .collect();

                    let expected = matching.first().copied().unwrap_or(ColorLabel::Unknown);
                    assert_eq!(classify(&reading), expected, "reading {:?}", reading);
                }
            }
        }
    }

    #[test]
    fn test_unknown_never_matches() {
        assert!(!matches(&ColorReading::new(100, 100, 100), ColorLabel::Unknown));
        assert!(!matches(&ColorReading::default(), ColorLabel::Unknown));
    }

    #[test]
    fn test_luma() {
        assert_eq!(luma(&ColorReading::new(50, 50, 50)), 50);
        assert_eq!(luma(&ColorReading::new(200, 200, 200)), 200);
        assert_eq!(luma(&ColorReading::new(255, 255, 255)), 255);
        assert_eq!(luma(&ColorReading::new(0, 0, 0)), 0);
        // 0.299 * 100 = 29.9 truncates to 29
        assert_eq!(luma(&ColorReading::new(100, 0, 0)), 29);
        assert_eq!(ColorReading::new(100, 0, 0).luma(), 29);
    }

    #[test]
    fn test_luma_of_out_of_range_channels() {
        assert_eq!(luma(&ColorReading::new(10_000_000, 0, 0)), 2_990_000);
        assert_eq!(
            luma(&ColorReading::new(i32::MAX, i32::MAX, i32::MAX)),
            i32::MAX
        );
        assert_eq!(
            luma(&ColorReading::new(i32::MIN, i32::MIN, i32::MIN)),
            i32::MIN
        );
        assert!(luma(&ColorReading::new(i32::MAX, i32::MIN, 0)) < 0);
    }

    #[test]
    fn test_label_deserialises_from_lowercase() {
        #[derive(Deserialize)]
        struct P {
            color: ColorLabel,
        }

        let p: P = toml::from_str("color = \"green\"").unwrap();
        assert_eq!(p.color, ColorLabel::Green);
    }
}
