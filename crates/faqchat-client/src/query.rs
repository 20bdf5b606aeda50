/// Filter and paging parameters for `GET /api/faq`.
///
/// Unset fields are left out of the query string so the service applies its
/// own defaults (page 1, 50 entries per page).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CatalogQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(page_size) = self.page_size {
            params.push(("page_size", page_size.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_term_sends_no_params() {
        assert!(CatalogQuery::search("").params().is_empty());
    }

    #[test]
    fn paging_params_follow_search() {
        let params = CatalogQuery::search("precios")
            .with_page(2)
            .with_page_size(10)
            .params();
        assert_eq!(
            params,
            vec![
                ("search", "precios".to_string()),
                ("page", "2".to_string()),
                ("page_size", "10".to_string()),
            ]
        );
    }
}
