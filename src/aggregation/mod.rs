pub mod dedupe;
pub mod rate;
pub mod representative;

pub use dedupe::{aggregate, group_records, resolve_all, PropertyGroup};
pub use rate::{categorize, rough_rate_label, RATE_CATEGORIES};
pub use representative::select_representative;
