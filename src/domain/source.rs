use serde::{Deserialize, Serialize};

/// A publisher that articles can be grouped under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub remote_id: i64,
    pub category_name: String,
    pub category_id: Option<i64>,
}

impl Source {
    pub fn new(
        name: impl Into<String>,
        image_url: impl Into<String>,
        remote_id: i64,
        category_name: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            image_url: image_url.into(),
            remote_id,
            category_name: category_name.into(),
            category_id: None,
        }
    }
}
