mod entity;
mod types;

pub use entity::{contains_ignore_case, Entity, NaturalKey};
pub use types::{Article, Classification, Color, Company, Customer, Depstore, Division, User};
