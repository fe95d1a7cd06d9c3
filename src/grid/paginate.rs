//! Page request parsing and slicing.

use serde::Serialize;

use crate::models::Term;

/// Page size used when none (or a non-positive one) is given.
pub const DEFAULT_PER_PAGE: u32 = 6;

/// Parse a loosely formatted integer the way form handlers read numbers:
/// optional whitespace and sign, then leading digits; trailing junk is ignored.
///
/// Returns `None` when there are no leading digits at all.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate instead of failing on absurdly long inputs
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Clamp a raw page parameter to a 1-based page number.
pub fn page_number(raw: Option<&str>) -> u32 {
    let value = raw.and_then(parse_int).unwrap_or(1);
    value.clamp(1, u32::MAX as i64) as u32
}

/// Read a raw page-size parameter, falling back to the given default when
/// missing, invalid or not positive.
pub fn page_size(raw: Option<&str>, default: u32) -> u32 {
    match raw.and_then(parse_int) {
        Some(value) if value > 0 => value.min(u32::MAX as i64) as u32,
        _ => default.max(1),
    }
}

/// A request for one page of a taxonomy grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested taxonomy; grids with a fixed taxonomy ignore it.
    pub taxonomy: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(taxonomy: Option<String>, page: u32, per_page: u32) -> Self {
        Self {
            taxonomy: taxonomy.filter(|t| !t.trim().is_empty()),
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Build a request from raw form or query values.
    pub fn from_params(
        taxonomy: Option<&str>,
        page: Option<&str>,
        per_page: Option<&str>,
        default_per_page: u32,
    ) -> Self {
        Self::new(
            taxonomy.map(|t| t.trim().to_string()),
            page_number(page),
            page_size(per_page, default_per_page),
        )
    }

    /// Offset of the first term on this page.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.per_page as usize)
    }
}

/// One page of sorted terms.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub taxonomy: String,
    pub terms: Vec<Term>,
    pub page: u32,
    pub per_page: u32,
    pub total_terms: usize,
    pub total_pages: u32,
}

impl PageResult {
    pub fn has_pagination(&self) -> bool {
        self.total_pages > 1
    }
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: usize, per_page: u32) -> u32 {
    let pages = total.div_ceil(per_page.max(1) as usize);
    pages.min(u32::MAX as usize) as u32
}

/// Slice an already sorted term list into the requested page.
///
/// Pages past the end yield an empty slice.
pub fn paginate(taxonomy: &str, sorted: Vec<Term>, request: &PageRequest) -> PageResult {
    let total_terms = sorted.len();
    let terms: Vec<Term> = sorted
        .into_iter()
        .skip(request.offset())
        .take(request.per_page as usize)
        .collect();

    PageResult {
        taxonomy: taxonomy.to_string(),
        terms,
        page: request.page,
        per_page: request.per_page,
        total_terms,
        total_pages: total_pages(total_terms, request.per_page),
    }
}
