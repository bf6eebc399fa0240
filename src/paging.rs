//! Fixed-size pagination over named sequences.
//!
//! Used by the item listings (`/next`, `/prev`, `/backpack`) and by `/showrotation`.
//! Pages are 1-based everywhere a player can see them. A page past the end is not an
//! error; it simply renders an empty list.
//!
//! ```
//! use milsim_toolbox::paging::{PageRequest, Paginator, Scroll};
//!
//! let names = ["Rifle", "Bandage", "Splint", "Compass"];
//! let pager = Paginator::new(3);
//! let page = pager.resolve(names, &PageRequest::Query("comp".into()), 1);
//! assert_eq!(page, 2);
//! assert_eq!(pager.format_page(page, names, |n| n.to_string()), "2) Compass");
//! ```

use std::ops::Range;

/// Page size of item listings.
pub const ITEMS_PER_PAGE: usize = 3;
/// Page size of the map rotation listing.
pub const ROTATION_PAGE_SIZE: usize = 5;

/// Anything that can be searched by a substring query.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for str {
    fn name(&self) -> &str {
        self
    }
}

impl Named for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl<T: Named + ?Sized> Named for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Direction of a relative page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    Next,
    Previous,
}

/// How a player asked for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// Explicit page number.
    Absolute(usize),
    /// One page forward or back from the stored page.
    Relative(Scroll),
    /// Case-insensitive substring of an element's name.
    Query(String),
}

impl PageRequest {
    /// Classify a raw command argument: nothing scrolls, digits jump, anything else searches.
    pub fn parse(arg: Option<&str>, scroll: Scroll) -> Self {
        match arg.map(str::trim).filter(|a| !a.is_empty()) {
            None => PageRequest::Relative(scroll),
            Some(a) if a.chars().all(|c| c.is_ascii_digit()) => {
                // Overlong digit strings still mean "far past the end".
                PageRequest::Absolute(a.parse().unwrap_or(usize::MAX))
            }
            Some(a) => PageRequest::Query(a.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// A zero page size is bumped to one.
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages needed for `len` elements (0 for an empty sequence).
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// 1-based page holding the element at `index`.
    pub fn page_of(&self, index: usize) -> usize {
        index / self.page_size + 1
    }

    /// Index window covered by a 1-based page. Page 0 is treated as page 1.
    pub fn window(&self, page: usize) -> Range<usize> {
        let start = page.saturating_sub(1).saturating_mul(self.page_size);
        start..start.saturating_add(self.page_size)
    }

    /// Page of the first element whose name contains `query`, ignoring case.
    pub fn find_page<I>(&self, items: I, query: &str) -> Option<usize>
    where
        I: IntoIterator,
        I::Item: Named,
    {
        let needle = query.to_lowercase();
        items
            .into_iter()
            .position(|item| item.name().to_lowercase().contains(&needle))
            .map(|index| self.page_of(index))
    }

    /// Turn a request into a page number (always >= 1). `stored` is the caller's current page,
    /// 0 meaning "none yet".
    pub fn resolve<I>(&self, items: I, request: &PageRequest, stored: usize) -> usize
    where
        I: IntoIterator,
        I::Item: Named,
    {
        match request {
            PageRequest::Absolute(page) => (*page).max(1),
            PageRequest::Relative(Scroll::Next) => stored.saturating_add(1).max(1),
            PageRequest::Relative(Scroll::Previous) => stored.saturating_sub(1).max(1),
            PageRequest::Query(query) => self
                .find_page(items, query)
                .unwrap_or_else(|| stored.max(1)),
        }
    }

    /// Render the elements of one page joined by `", "`. Elements outside the window are
    /// skipped lazily, so one-shot iterators are fine.
    pub fn render_window<I, F>(&self, page: usize, items: I, mut render: F) -> String
    where
        I: IntoIterator,
        F: FnMut(&I::Item) -> String,
    {
        let window = self.window(page);
        items
            .into_iter()
            .skip(window.start)
            .take(self.page_size)
            .map(|item| render(&item))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render `"<page>) a, b, c"`.
    pub fn format_page<I, F>(&self, page: usize, items: I, render: F) -> String
    where
        I: IntoIterator,
        F: FnMut(&I::Item) -> String,
    {
        format!("{}) {}", page.max(1), self.render_window(page, items, render))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 7] = [
        "Rifle",
        "Bandage",
        "Splint",
        "Compass",
        "Grenade",
        "Tourniquet",
        "Shovel",
    ];

    #[test]
    fn parse_classifies_arguments() {
        assert_eq!(PageRequest::parse(None, Scroll::Next), PageRequest::Relative(Scroll::Next));
        assert_eq!(PageRequest::parse(Some("  "), Scroll::Previous), PageRequest::Relative(Scroll::Previous));
        assert_eq!(PageRequest::parse(Some("4"), Scroll::Next), PageRequest::Absolute(4));
        assert_eq!(PageRequest::parse(Some("nade"), Scroll::Next), PageRequest::Query("nade".into()));
        assert_eq!(
            PageRequest::parse(Some("99999999999999999999999999"), Scroll::Next),
            PageRequest::Absolute(usize::MAX)
        );
    }

    #[test]
    fn last_page_holds_remainder_and_next_is_empty() {
        for k in 1..=5 {
            let pager = Paginator::new(k);
            let last = pager.page_count(NAMES.len());
            let tail = match NAMES.len() % k {
                0 => k,
                r => r,
            };
            let expected = NAMES[NAMES.len() - tail..].join(", ");
            assert_eq!(
                pager.format_page(last, NAMES, |n| n.to_string()),
                format!("{last}) {expected}")
            );
            assert_eq!(
                pager.format_page(last + 1, NAMES, |n| n.to_string()),
                format!("{}) ", last + 1)
            );
        }
    }

    #[test]
    fn relative_never_drops_below_one() {
        let pager = Paginator::new(3);
        let mut page = 0;
        for _ in 0..5 {
            page = pager.resolve(NAMES, &PageRequest::Relative(Scroll::Previous), page);
            assert_eq!(page, 1);
        }
        page = pager.resolve(NAMES, &PageRequest::Relative(Scroll::Next), page);
        assert_eq!(page, 2);
        page = pager.resolve(NAMES, &PageRequest::Relative(Scroll::Previous), page);
        page = pager.resolve(NAMES, &PageRequest::Relative(Scroll::Previous), page);
        assert_eq!(page, 1);
    }

    #[test]
    fn absolute_has_no_upper_clamp() {
        let pager = Paginator::new(3);
        assert_eq!(pager.resolve(NAMES, &PageRequest::Absolute(0), 4), 1);
        assert_eq!(pager.resolve(NAMES, &PageRequest::Absolute(40), 1), 40);
        assert_eq!(pager.format_page(40, NAMES, |n| n.to_string()), "40) ");
        assert_eq!(
            pager.format_page(usize::MAX, NAMES, |n| n.to_string()),
            format!("{}) ", usize::MAX)
        );
    }

    #[test]
    fn query_maps_index_to_page() {
        let pager = Paginator::new(3);
        for (i, name) in NAMES.iter().enumerate() {
            let q = PageRequest::Query(name.to_uppercase());
            assert_eq!(pager.resolve(NAMES, &q, 1), i / 3 + 1);
        }
        // Miss falls back to the stored page, never below one
        let miss = PageRequest::Query("howitzer".into());
        assert_eq!(pager.resolve(NAMES, &miss, 2), 2);
        assert_eq!(pager.resolve(NAMES, &miss, 0), 1);
    }

    #[test]
    fn query_matches_first_element_too() {
        let pager = Paginator::new(5);
        assert_eq!(pager.find_page(NAMES, "rif"), Some(1));
        assert_eq!(pager.find_page(NAMES, "shov"), Some(2));
        assert_eq!(pager.find_page(NAMES, "zzz"), None);
    }
}
