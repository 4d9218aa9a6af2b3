//! Helper items to assist the working of `latsym`.

pub mod geometry;
pub(crate) mod misc;
pub mod tolerance;
