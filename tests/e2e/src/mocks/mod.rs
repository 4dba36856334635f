
pub use fixtures::{TestDataFactory, JAPANESE_DECK};
