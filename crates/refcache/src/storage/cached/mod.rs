//! Cache-aside decorators over the base repositories.
//!
//! Reads check the cache first and populate it on a miss. Writes go to the
//! base repository first and then invalidate every key family the row can be
//! reached under. A failing cache never fails a caller; it only costs
//! latency.

mod article;
mod aside;
mod classification;
mod color;
mod company;
mod customer;
mod depstore;
mod division;
mod policy;
mod repository;
mod user;

#[cfg(test)]
mod test_support;

pub use article::CachedArticleRepository;
pub use aside::CacheAside;
pub use classification::CachedClassificationRepository;
pub use color::CachedColorRepository;
pub use company::CachedCompanyRepository;
pub use customer::CachedCustomerRepository;
pub use depstore::CachedDepstoreRepository;
pub use division::CachedDivisionRepository;
pub use policy::{CachePolicy, CachedEntity};
pub use repository::CachedRepository;
pub use user::CachedUserRepository;
