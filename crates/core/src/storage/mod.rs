mod error;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use traits::{ArticleSearch, NaturalKeyLookup, Repository};
pub use types::{Page, PageRequest, MAX_PAGE_SIZE};
