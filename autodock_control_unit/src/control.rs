//! Control laws.

pub mod line_follow;
