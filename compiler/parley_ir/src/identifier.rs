//! Compound identifiers.
//!
//! A compound identifier is a name split into ordered segments on
//! [`SCOPE_SEPARATOR`]. A leading empty segment marks an absolute identifier
//! that starts from the global scope: `:Intro:greeting` splits into
//! `["", "Intro", "greeting"]`.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Separator between the segments of a compound identifier.
pub const SCOPE_SEPARATOR: char = ':';

/// A qualified name, split into segments.
///
/// Most identifiers have one to three segments, so they stay inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identifier {
    segments: SmallVec<[String; 4]>,
}

impl Identifier {
    /// Split `text` on the scope separator.
    ///
    /// The empty string yields an identifier with no segments.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Identifier {
            segments: text.split(SCOPE_SEPARATOR).map(str::to_owned).collect(),
        }
    }

    /// Build an identifier from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Identifier {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// All segments, including a leading empty one for absolute identifiers.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when there are no segments at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when resolution must start from the global scope.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.segments.len() > 1 && self.segments[0].is_empty()
    }

    /// Segments with the absolute marker stripped.
    pub fn relative_segments(&self) -> &[String] {
        if self.is_absolute() {
            &self.segments[1..]
        } else {
            &self.segments
        }
    }

    /// The last segment: the simple name of whatever this identifier names.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Append a segment.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SCOPE_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Identifier::parse(s))
    }
}

impl From<&str> for Identifier {
    fn from(text: &str) -> Self {
        Identifier::parse(text)
    }
}

#[cfg(test)]
mod tests;
