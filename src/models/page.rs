//! Paged query result envelope

use serde::Serialize;

/// One page of rows plus the unfiltered total, matching the admin console's
/// table contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub rows: Vec<T>,
}

/// Clamp raw pagination input: page at least 1, page size within 1..=100.
pub fn clamp_pagination(page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(10).clamp(1, 100);
    (page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(clamp_pagination(None, None), (1, 10));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(clamp_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_pagination(Some(-3), Some(1000)), (1, 100));
    }

    #[test]
    fn in_range_values_pass_through() {
        assert_eq!(clamp_pagination(Some(4), Some(25)), (4, 25));
    }
}
