pub mod name;
pub mod state;

pub use name::{canonical_key_for, canonicalize};
pub use state::{matches_any_state, state_variants, StateMatcher};
