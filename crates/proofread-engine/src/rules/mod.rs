//! Deterministic house-style checks
//!
//! Each checker is a pure function of the input text (plus the year range for
//! dates), so checkers can run in any order and from any thread.

pub mod accents;
pub mod capitalization;
pub mod dates;
pub mod style;

pub use accents::{check_accents, check_accents_with};
pub use capitalization::{check_capitalization, check_capitalization_with};
pub use dates::{check_dates, find_date_mentions, DateMention};
pub use style::{check_style, check_style_with};
