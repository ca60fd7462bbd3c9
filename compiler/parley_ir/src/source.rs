//! Source positions.
//!
//! Script files are identified by an opaque [`FileId`] handed out by the
//! loader. A [`SourcePos`] records where something was defined so the
//! statement executor can later resume parsing there, and so failures can
//! point back at the script.

use std::fmt;

/// Opaque identifier of a loaded script file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for objects created by the host rather than by a script.
    pub const HOST: FileId = FileId(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        FileId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_host(self) -> bool {
        self == Self::HOST
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_host() {
            f.write_str("<host>")
        } else {
            write!(f, "file#{}", self.0)
        }
    }
}

/// A byte offset and line within a script file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourcePos {
    pub file: FileId,
    /// Byte offset from the start of the file.
    pub offset: u32,
    /// 1-based line number.
    pub line: u32,
}

impl SourcePos {
    pub const fn new(file: FileId, offset: u32, line: u32) -> Self {
        SourcePos { file, offset, line }
    }

    /// Position for objects created by the host.
    pub const fn host() -> Self {
        SourcePos {
            file: FileId::HOST,
            offset: 0,
            line: 0,
        }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
