//! Rigid motions, their classification, and their action on points.

pub mod operation_analysis;
pub mod projection;
pub mod rigid_motion;
