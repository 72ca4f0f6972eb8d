//! Page range parsing.
//!
//! A page range is what a user types to pick pages out of a document:
//! comma-separated page numbers and inclusive hyphenated intervals.
//!
//! - `"5"` - a single page
//! - `"1-5"` - pages 1 through 5
//! - `"1-3,5,8-10"` - a combination
//!
//! Parsing only checks syntax. Bounds are checked against a concrete page
//! count by [`PageRange::resolve`], which produces a sorted, deduplicated
//! [`PageSet`].
//!
//! # Examples
//!
//! ```
//! use pdfsmith::range::PageRange;
//!
//! let range = PageRange::parse("1-3,5").unwrap();
//! let pages = range.resolve(6).unwrap();
//! assert_eq!(pages.to_vec(), vec![1, 2, 3, 5]);
//!
//! assert!(PageRange::parse("7").unwrap().resolve(5).is_err());
//! assert!(PageRange::parse("3-1").is_err());
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRangeItem {
    Single(u32),
    Range(u32, u32),
}

/// A parsed, not yet bounds-checked page range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    source: String,
    items: Vec<PageRangeItem>,
}

impl PageRange {
    /// Parse a page range string.
    ///
    /// Whitespace around items and numbers is ignored and empty items (such
    /// as the one after a trailing comma) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPageRange`] if the string holds no items, an
    /// item is not a number, a page is `0`, an interval runs backwards, or an
    /// item has more than one hyphen.
    pub fn parse(s: &str) -> Result<Self> {
        let mut items = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let item = match part.split_once('-') {
                Some((start, end)) => {
                    if end.contains('-') {
                        return Err(Error::invalid_page_range(
                            s,
                            format!("'{part}' has more than one '-'. Expected format like '1-5'"),
                        ));
                    }
                    let start = parse_page_number(s, start)?;
                    let end = parse_page_number(s, end)?;
                    if start > end {
                        return Err(Error::invalid_page_range(
                            s,
                            format!("interval {start}-{end} starts after it ends"),
                        ));
                    }
                    PageRangeItem::Range(start, end)
                }
                None => PageRangeItem::Single(parse_page_number(s, part)?),
            };
            items.push(item);
        }

        if items.is_empty() {
            return Err(Error::invalid_page_range(s, "no pages given"));
        }

        Ok(Self {
            source: s.trim().to_string(),
            items,
        })
    }

    /// Check if a page number is named by this range.
    pub fn contains(&self, page: u32) -> bool {
        self.items.iter().any(|item| match *item {
            PageRangeItem::Single(p) => p == page,
            PageRangeItem::Range(start, end) => (start..=end).contains(&page),
        })
    }

    /// Highest page number the range names.
    pub fn max_page(&self) -> u32 {
        self.items
            .iter()
            .map(|item| match *item {
                PageRangeItem::Single(p) => p,
                PageRangeItem::Range(_, end) => end,
            })
            .max()
            .unwrap_or(0)
    }

    /// Check the range against a document with `total_pages` pages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PageOutOfBounds`] naming the first page above
    /// `total_pages`.
    pub fn resolve(&self, total_pages: usize) -> Result<PageSet> {
        let max = self.max_page();
        if max as usize > total_pages {
            return Err(Error::PageOutOfBounds {
                page: self.first_page_above(total_pages),
                total_pages,
            });
        }

        let mut pages = BTreeSet::new();
        for item in &self.items {
            match *item {
                PageRangeItem::Single(p) => {
                    pages.insert(p);
                }
                PageRangeItem::Range(start, end) => pages.extend(start..=end),
            }
        }

        Ok(PageSet { pages })
    }

    fn first_page_above(&self, total_pages: usize) -> u32 {
        self.items
            .iter()
            .map(|item| match *item {
                PageRangeItem::Single(p) => p,
                PageRangeItem::Range(start, end) => {
                    if start as usize > total_pages {
                        start
                    } else {
                        end.min(total_pages as u32 + 1)
                    }
                }
            })
            .find(|p| *p as usize > total_pages)
            .unwrap_or(total_pages as u32 + 1)
    }
}

impl FromStr for PageRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_page_number(range: &str, token: &str) -> Result<u32> {
    let token = token.trim();
    let page: u32 = token
        .parse()
        .map_err(|_| Error::invalid_page_range(range, format!("invalid page number '{token}'")))?;

    if page == 0 {
        return Err(Error::invalid_page_range(
            range,
            "page numbers start at 1",
        ));
    }

    Ok(page)
}

/// A sorted, deduplicated set of 1-based page numbers known to exist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSet {
    pages: BTreeSet<u32>,
}

impl PageSet {
    /// Every page of a document with `total_pages` pages.
    pub fn all(total_pages: usize) -> Self {
        Self {
            pages: (1..=total_pages as u32).collect(),
        }
    }

    /// Number of pages in the set.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Whether `page` is selected.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Iterate pages in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }

    /// Pages in ascending order.
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Group the pages into maximal runs of consecutive numbers.
    ///
    /// ```
    /// use pdfsmith::range::PageRange;
    ///
    /// let set = PageRange::parse("1-3,5,7-8").unwrap().resolve(10).unwrap();
    /// assert_eq!(set.runs(), vec![1..=3, 5..=5, 7..=8]);
    /// ```
    pub fn runs(&self) -> Vec<RangeInclusive<u32>> {
        let mut runs: Vec<RangeInclusive<u32>> = Vec::new();

        for page in self.iter() {
            match runs.last_mut() {
                Some(run) if *run.end() + 1 == page => *run = *run.start()..=page,
                _ => runs.push(page..=page),
            }
        }

        runs
    }
}

impl FromIterator<u32> for PageSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}
