use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub article_count: u32,
}

/// Per-category article counts, largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub categories: Vec<Category>,
    pub total: u32,
}

impl CategoryCounts {
    pub fn new(categories: Vec<Category>) -> Self {
        let total = categories.iter().map(|c| c.article_count).sum();
        Self { categories, total }
    }
}
