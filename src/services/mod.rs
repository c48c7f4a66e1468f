pub mod catalog;
pub mod recommendations;
pub mod similarity;

pub use catalog::CatalogService;
pub use recommendations::RecommendationEngine;
