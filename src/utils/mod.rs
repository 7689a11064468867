//! Utility functions and helpers.

pub mod nullable;
pub mod slug;
pub mod validation;

pub use nullable::nullable;
pub use slug::{slug_or, slugify};
pub use validation::{PHONE_REGEX, TIME_REGEX};
