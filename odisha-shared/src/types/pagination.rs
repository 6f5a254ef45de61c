use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;
/// Offsets are handed to SQL as `BIGINT`.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// `?page=&per_page=` query. Pages are 1-based; `page=0` is treated as 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    /// Saturates instead of overflowing; a page past the end is just empty.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit()).min(MAX_OFFSET)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let per_page = params.limit();
        Self {
            items,
            total,
            page: params.page(),
            per_page,
            total_pages: total.div_ceil(per_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_behaves_like_first_page() {
        let params = PaginationParams { page: 0, per_page: 10 };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn per_page_is_capped() {
        let params = PaginationParams { page: 2, per_page: 500 };
        assert_eq!(params.limit(), 100);
        assert_eq!(params.offset(), 100);
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page":18446744073709551615,"per_page":20}"#).unwrap();
        assert_eq!(params.offset(), i64::MAX as u64);
        assert!(i64::try_from(params.offset()).is_ok());
    }

    #[test]
    fn total_pages_round_up() {
        let params = PaginationParams { page: 2, per_page: 2 };
        let page = Paginated::new(vec![3, 4], 5, &params);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);

        let empty = Paginated::<u8>::new(vec![], 0, &PaginationParams::default());
        assert_eq!(empty.total_pages, 0);
    }
}
