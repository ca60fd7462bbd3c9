//! Rounding modes, named for scripts and mapped onto `bigdecimal`'s.

use std::fmt;
use std::str::FromStr;

/// How digits beyond the requested precision are discarded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundingMode {
    /// Nearest, ties to the even neighbour.
    #[default]
    HalfEven,
    /// Nearest, ties away from zero.
    HalfUp,
    /// Nearest, ties toward zero.
    HalfDown,
    /// Truncate.
    TowardZero,
    AwayFromZero,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 7] = [
        RoundingMode::HalfEven,
        RoundingMode::HalfUp,
        RoundingMode::HalfDown,
        RoundingMode::TowardZero,
        RoundingMode::AwayFromZero,
        RoundingMode::Ceiling,
        RoundingMode::Floor,
    ];

    /// Name used by scripts to select the mode.
    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::HalfEven => "half_even",
            RoundingMode::HalfUp => "half_up",
            RoundingMode::HalfDown => "half_down",
            RoundingMode::TowardZero => "toward_zero",
            RoundingMode::AwayFromZero => "away_from_zero",
            RoundingMode::Ceiling => "ceiling",
            RoundingMode::Floor => "floor",
        }
    }
}

impl From<RoundingMode> for bigdecimal::RoundingMode {
    fn from(mode: RoundingMode) -> Self {
        match mode {
            RoundingMode::HalfEven => bigdecimal::RoundingMode::HalfEven,
            RoundingMode::HalfUp => bigdecimal::RoundingMode::HalfUp,
            RoundingMode::HalfDown => bigdecimal::RoundingMode::HalfDown,
            RoundingMode::TowardZero => bigdecimal::RoundingMode::Down,
            RoundingMode::AwayFromZero => bigdecimal::RoundingMode::Up,
            RoundingMode::Ceiling => bigdecimal::RoundingMode::Ceiling,
            RoundingMode::Floor => bigdecimal::RoundingMode::Floor,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a rounding mode name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownRoundingMode(pub String);

impl fmt::Display for UnknownRoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rounding mode: {}", self.0)
    }
}

impl std::error::Error for UnknownRoundingMode {}

impl FromStr for RoundingMode {
    type Err = UnknownRoundingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoundingMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRoundingMode(s.to_string()))
    }
}
