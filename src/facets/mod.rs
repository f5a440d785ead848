pub mod counts;
pub mod filter;
pub mod options;
pub mod predicates;

pub use counts::{compute_facet_counts, CountOptions};
pub use filter::{filter, filter_displayed, is_mappable};
pub use options::options_for;
pub use predicates::{matches_dimension, FilterPlan};
