use serde::{Deserialize, Serialize};

/// One page of a list endpoint.
///
/// List endpoints either paginate (`{count, next, previous, results}`) or
/// return a bare array; the latter is treated as a single complete page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPage<T>")]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Paged {
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> From<RawPage<T>> for Page<T> {
    fn from(raw: RawPage<T>) -> Self {
        match raw {
            RawPage::Paged {
                count,
                next,
                previous,
                results,
            } => Self {
                count: count.unwrap_or(results.len() as u64),
                next,
                previous,
                results,
            },
            RawPage::Bare(results) => Self {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

impl<T> Page<T> {
    /// Number of pages at `page_size` rows each; never less than one.
    pub fn total_pages(&self, page_size: u32) -> u32 {
        let page_size = u64::from(page_size.max(1));
        self.count.div_ceil(page_size).max(1) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Query-string parameters for a list endpoint. Empty values are left out.
pub trait QueryPairs {
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    /// The pairs, form-encoded for a link.
    fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

/// Push `value` under `key` unless it is blank.
pub(crate) fn push_pair(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        pairs.push((key, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated() {
        let page: Page<u32> = serde_json::from_str(
            r#"{"count": 45, "next": "http://api/x?page=2", "previous": null, "results": [1, 2]}"#,
        )
        .unwrap();
        assert_eq!(page.count, 45);
        assert_eq!(page.results, vec![1, 2]);
        assert_eq!(page.total_pages(20), 3);
        assert_eq!(page.total_pages(25), 2);
    }

    #[test]
    fn bare_list() {
        let page: Page<u32> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.next, None);
        assert_eq!(page.total_pages(10), 1);
    }

    #[test]
    fn empty_has_one_page() {
        let page: Page<u32> = serde_json::from_str("[]").unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_pages(10), 1);
    }

    #[test]
    fn survives_a_round_trip() {
        let page: Page<u32> = serde_json::from_str("[4]").unwrap();
        let json = serde_json::to_string(&page).unwrap();
        assert_eq!(serde_json::from_str::<Page<u32>>(&json).unwrap(), page);
    }
}
