pub mod country;
pub mod geofence;

pub use country::{classify_country, plausibly_north_american, Country};
