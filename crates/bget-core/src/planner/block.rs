//! Block descriptor: ordinal index plus inclusive byte range.

use std::fmt;

/// An inclusive HTTP byte range. `end == None` means open-ended ("to end of
/// file"), which also tolerates a server reporting a slightly different
/// exact size for the final block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset (inclusive).
    pub start: u64,
    /// Last byte offset (inclusive), or `None` for "rest of file".
    pub end: Option<u64>,
}

impl ByteRange {
    /// Value for the `Range` request header.
    pub fn header_value(&self) -> String {
        format!("bytes={}", self)
    }

    /// Expected byte count, when the range is bounded.
    pub fn len_hint(&self) -> Option<u64> {
        self.end.map(|e| e.saturating_sub(self.start) + 1)
    }

    /// Parses the `start-` / `start-end` form used in the shared store.
    pub fn parse(s: &str) -> Option<Self> {
        let (a, b) = s.split_once('-')?;
        let start = a.parse().ok()?;
        let end = if b.is_empty() {
            None
        } else {
            Some(b.parse().ok()?)
        };
        Some(ByteRange { start, end })
    }
}

impl fmt::Display for ByteRange {
    /// `start-end` with the end omitted for open-ended ranges, matching both
    /// HTTP range syntax and the shared-store encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// One unit of fetch/write/resume granularity. The index is the block's
/// ordinal position in the file and names its temp file (`<index>.dat`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub index: usize,
    pub range: ByteRange,
}

impl BlockDescriptor {
    /// Temp filename for this block.
    pub fn file_name(&self) -> String {
        format!("{}.dat", self.index)
    }

    /// Shared-store member encoding: `"<index> <start>-[<end>]"`.
    pub fn encode(&self) -> String {
        format!("{} {}", self.index, self.range)
    }

    /// Inverse of [`encode`](Self::encode).
    pub fn decode(s: &str) -> Option<Self> {
        let (index, range) = s.split_once(' ')?;
        Some(BlockDescriptor {
            index: index.parse().ok()?,
            range: ByteRange::parse(range)?,
        })
    }
}
