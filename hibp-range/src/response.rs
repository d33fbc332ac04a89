//! Parsing of range API responses.
//!
//! A response body is a list of `SUFFIX:COUNT` lines, one per hash sharing the
//! queried prefix, e.g. `1E4C9B93F3F0682250B6CF8331B7EE68FD8:10434004`. Lines
//! may end in `\n` or `\r\n`.

use crate::{Error, SUFFIX_LEN};

/// Shortest line that can hold a suffix, the separator and a one digit count.
pub const MIN_LINE_LEN: usize = SUFFIX_LEN + 2;

/// One `SUFFIX:COUNT` line of a range response, borrowed from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeEntry<'a> {
    pub suffix: &'a str,
    /// Raw count text; only parsed for the entry that matches.
    pub count: &'a str,
}

impl<'a> RangeEntry<'a> {
    /// Splits a response line. Returns `None` for lines too short to carry a
    /// count or whose suffix is not exactly 35 characters.
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.len() < MIN_LINE_LEN {
            return None;
        }
        let (suffix, count) = line.split_once(':')?;
        (suffix.len() == SUFFIX_LEN).then_some(Self { suffix, count })
    }

    #[inline]
    pub fn matches(&self, suffix: &str) -> bool {
        self.suffix.eq_ignore_ascii_case(suffix)
    }

    pub fn occurrences(&self) -> Result<u64, Error> {
        self.count.parse().map_err(|source| Error::InvalidCount {
            suffix: self.suffix.to_string(),
            count: self.count.to_string(),
            source,
        })
    }
}

/// Iterates the well-formed entries of a response body in order.
pub fn entries(body: &str) -> impl Iterator<Item = RangeEntry<'_>> {
    body.lines().filter_map(RangeEntry::parse)
}

/// Scans `body` for `suffix` (case-insensitive).
///
/// Returns the occurrence count of the first matching entry, `None` if no entry
/// matches, or an error if the matching entry's count is not a valid integer.
pub fn find_suffix(body: &str, suffix: &str) -> Result<Option<u64>, Error> {
    match entries(body).find(|entry| entry.matches(suffix)) {
        Some(entry) => entry.occurrences().map(Some),
        None => Ok(None),
    }
}
