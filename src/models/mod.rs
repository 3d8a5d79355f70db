pub mod product;

pub use product::{ProductRecord, SourceDocument};
