pub mod article;
pub mod category;
pub mod source;

pub use article::Article;
pub use category::{Category, CategoryCounts};
pub use source::Source;
