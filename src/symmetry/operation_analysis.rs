//! Classification of rigid motions into identities, rotations, inversions and rotoinversions.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry::{is_orthogonal, rotation_vector, ROTATION_VECTOR_SQNORM_THRESHOLD};
use crate::auxiliary::misc::{all_close, clean_zero};
use crate::periodic::{PeriodicFlags, PeriodicFold};
use crate::symmetry::rigid_motion::RigidMotion;

#[cfg(test)]
#[path = "operation_analysis_tests.rs"]
mod operation_analysis_tests;

/// Default element-wise tolerance for the orthogonality test of linear parts.
pub const ORTHOGONALITY_TOLERANCE: f64 = 1e-3;

/// Default tolerance of [`find_order`].
pub const ORDER_TOLERANCE: f64 = 1e-2;

/// Largest order searched by [`find_order`].
pub const MAX_ORDER: u32 = 60;

/// Determinants smaller in magnitude than this are treated as zero.
pub const DEGENERACY_THRESHOLD: f64 = 1e-8;

/// Tolerance on the ratio of angles of two conjugate operations.
pub const CONJUGACY_TOLERANCE: f64 = 1e-2;

// ================
// Enum definitions
// ================

/// An enumerated type for the order of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationOrder {
    /// A finite positive order.
    Finite(u32),

    /// No order up to [`MAX_ORDER`] was found.
    Irrational,
}

impl fmt::Display for OperationOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::Irrational => write!(f, "irrational"),
        }
    }
}

/// An enumerated type for the kinds of operations, without any associated data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    /// See [`OperationKind::Identity`].
    Identity,

    /// See [`OperationKind::Rotation`].
    Rotation,

    /// See [`OperationKind::Inversion`].
    Inversion,

    /// See [`OperationKind::Rotoinversion`].
    Rotoinversion,

    /// See [`OperationKind::Degenerate`].
    Degenerate,

    /// See [`OperationKind::General`].
    General,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identity => "identity",
            Self::Rotation => "rotation",
            Self::Inversion => "inversion",
            Self::Rotoinversion => "rotoinversion",
            Self::Degenerate => "degenerate",
            Self::General => "general",
        };
        write!(f, "{name}")
    }
}

/// An enumerated type for classified operations together with their derived geometric data.
///
/// Derived data exist only for the kinds in which they are defined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    /// The identity.
    Identity,

    /// A proper rotation by a non-zero angle.
    Rotation {
        /// The unit rotation axis.
        axis: Vector3<f64>,

        /// The rotation angle in $`(0, \pi]`$.
        angle: f64,

        /// The order of the rotation.
        order: OperationOrder,
    },

    /// The inversion through a point.
    Inversion,

    /// A rotation followed by an inversion. Mirror planes are twofold rotoinversions.
    Rotoinversion {
        /// The unit axis of the rotoinversion, opposite to the axis of the proper rotation
        /// $`-\mathbf{M}`$.
        axis: Vector3<f64>,

        /// The angle of the proper rotation $`-\mathbf{M}`$ in $`(0, \pi]`$.
        angle: f64,

        /// The order of the whole operation.
        order: OperationOrder,

        /// The order of the proper rotation part.
        rotation_order: OperationOrder,
    },

    /// An orthogonal-within-tolerance linear part with vanishing determinant.
    Degenerate,

    /// A linear part that is not orthogonal.
    General,
}

impl OperationKind {
    /// Returns the type of this kind of operation.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::Identity => OperationType::Identity,
            Self::Rotation { .. } => OperationType::Rotation,
            Self::Inversion => OperationType::Inversion,
            Self::Rotoinversion { .. } => OperationType::Rotoinversion,
            Self::Degenerate => OperationType::Degenerate,
            Self::General => OperationType::General,
        }
    }
}

// ======================================
// Struct definitions and implementations
// ======================================

/// An immutable classification of a rigid motion.
///
/// All derived quantities are computed once in [`Self::new`]. The translation of the motion does
/// not take part in the classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationAnalysis {
    /// The motion being classified.
    motion: RigidMotion,

    /// The determinant of the linear part.
    determinant: f64,

    /// The classified kind.
    kind: OperationKind,
}

impl OperationAnalysis {
    /// Classifies a rigid motion with the default orthogonality tolerance.
    #[must_use]
    pub fn new(motion: &RigidMotion) -> Self {
        Self::with_orthogonality_tolerance(motion, ORTHOGONALITY_TOLERANCE)
    }

    /// Classifies a rigid motion.
    ///
    /// # Arguments
    ///
    /// * `motion` - The motion to classify.
    /// * `tol` - The element-wise tolerance for the linear part to be considered orthogonal.
    #[must_use]
    pub fn with_orthogonality_tolerance(motion: &RigidMotion, tol: f64) -> Self {
        let m = motion.linear_part();
        let determinant = m.determinant();
        let kind = if !is_orthogonal(m, tol) {
            OperationKind::General
        } else if determinant.abs() < DEGENERACY_THRESHOLD {
            OperationKind::Degenerate
        } else if determinant > 0.0 {
            let rotvec = rotation_vector(m);
            if rotvec.norm_squared() < ROTATION_VECTOR_SQNORM_THRESHOLD {
                OperationKind::Identity
            } else {
                let angle = rotvec.norm();
                OperationKind::Rotation {
                    axis: rotvec / angle,
                    angle,
                    order: find_order(angle, false, ORDER_TOLERANCE),
                }
            }
        } else {
            let rotvec = rotation_vector(&(-m));
            if rotvec.norm_squared() < ROTATION_VECTOR_SQNORM_THRESHOLD {
                OperationKind::Inversion
            } else {
                let angle = rotvec.norm();
                OperationKind::Rotoinversion {
                    axis: -rotvec / angle,
                    angle,
                    order: find_order(angle, true, ORDER_TOLERANCE),
                    rotation_order: find_order(angle, false, ORDER_TOLERANCE),
                }
            }
        };
        log::debug!(
            "Operation `{}` classified as {}.",
            motion.as_xyz_string(),
            kind.operation_type()
        );
        Self {
            motion: motion.clone(),
            determinant,
            kind,
        }
    }

    /// Returns the classified motion.
    #[must_use]
    pub fn motion(&self) -> &RigidMotion {
        &self.motion
    }

    /// Returns the determinant of the linear part.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.determinant
    }

    /// Returns the classified kind with its derived data.
    #[must_use]
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Returns the type of the operation.
    #[must_use]
    pub fn operation_type(&self) -> OperationType {
        self.kind.operation_type()
    }

    /// Returns the order of the operation, or `None` for degenerate and general operations.
    #[must_use]
    pub fn order(&self) -> Option<OperationOrder> {
        match &self.kind {
            OperationKind::Identity => Some(OperationOrder::Finite(1)),
            OperationKind::Rotation { order, .. } => Some(*order),
            OperationKind::Inversion => Some(OperationOrder::Finite(2)),
            OperationKind::Rotoinversion { order, .. } => Some(*order),
            OperationKind::Degenerate | OperationKind::General => None,
        }
    }

    /// Returns the order of the proper rotation part, or `None` for degenerate and general
    /// operations.
    #[must_use]
    pub fn rotation_order(&self) -> Option<OperationOrder> {
        match &self.kind {
            OperationKind::Identity | OperationKind::Inversion => Some(OperationOrder::Finite(1)),
            OperationKind::Rotation { order, .. } => Some(*order),
            OperationKind::Rotoinversion { rotation_order, .. } => Some(*rotation_order),
            OperationKind::Degenerate | OperationKind::General => None,
        }
    }

    /// Returns the angle of the operation. This is zero for the identity and the inversion, and
    /// `None` for degenerate and general operations.
    #[must_use]
    pub fn angle(&self) -> Option<f64> {
        match &self.kind {
            OperationKind::Identity | OperationKind::Inversion => Some(0.0),
            OperationKind::Rotation { angle, .. } | OperationKind::Rotoinversion { angle, .. } => {
                Some(*angle)
            }
            OperationKind::Degenerate | OperationKind::General => None,
        }
    }

    /// Returns the unit axis of the operation, if it has one.
    #[must_use]
    pub fn axis(&self) -> Option<&Vector3<f64>> {
        match &self.kind {
            OperationKind::Rotation { axis, .. } | OperationKind::Rotoinversion { axis, .. } => {
                Some(axis)
            }
            _ => None,
        }
    }

    /// Checks if another classified operation is conjugate to this one, *i.e.* the same
    /// operation in a different reference frame.
    ///
    /// The types must match. Identities and inversions are always conjugate to one another.
    /// Rotations and rotoinversions are conjugate if their angles agree in magnitude within
    /// [`CONJUGACY_TOLERANCE`], so operations of the same order are not necessarily conjugate
    /// (a $`5/12`$ turn and a $`1/12`$ turn are not). Degenerate and general operations are
    /// never conjugate.
    #[must_use]
    pub fn is_conjugate(&self, other: &Self) -> bool {
        if self.operation_type() != other.operation_type() {
            return false;
        }
        match (&self.kind, &other.kind) {
            (OperationKind::Identity, _) | (OperationKind::Inversion, _) => true,
            (
                OperationKind::Rotation { angle: a, .. },
                OperationKind::Rotation { angle: b, .. },
            )
            | (
                OperationKind::Rotoinversion { angle: a, .. },
                OperationKind::Rotoinversion { angle: b, .. },
            ) => ((a / b).abs() - 1.0).abs() <= CONJUGACY_TOLERANCE,
            _ => false,
        }
    }
}

impl From<&RigidMotion> for OperationAnalysis {
    fn from(motion: &RigidMotion) -> Self {
        Self::new(motion)
    }
}

impl fmt::Display for OperationAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "~~ Operation: {} ~~", self.motion.as_xyz_string())?;
        writeln!(f, "Type: {}", self.operation_type())?;
        match self.order() {
            Some(order) => writeln!(f, "Order: {order}")?,
            None => writeln!(f, "Order: None")?,
        }
        match self.angle() {
            Some(angle) => writeln!(f, "Angle: {angle:.6}")?,
            None => writeln!(f, "Angle: None")?,
        }
        match self.axis() {
            Some(axis) => {
                let axis = axis.map(|x| clean_zero(x, 1e-8));
                write!(f, "Axis: [{:.6}, {:.6}, {:.6}]", axis[0], axis[1], axis[2])
            }
            None => write!(f, "Axis: None"),
        }
    }
}

// =========
// Functions
// =========

/// Finds the order of a rotation from its angle.
///
/// The smallest $`n \in [1, 60]`$ for which $`n\theta / 2\pi`$ lies within `tol` of an integer
/// is returned. For rotoinversions, an odd $`n`$ is doubled since the inversion squares to the
/// identity only after an even number of applications.
///
/// # Arguments
///
/// * `angle` - The rotation angle in radians.
/// * `rotoinversion` - Whether the rotation is the proper part of a rotoinversion.
/// * `tol` - The tolerance on the distance of $`n\theta / 2\pi`$ from an integer.
///
/// # Returns
///
/// The order, or [`OperationOrder::Irrational`] if no $`n`$ up to [`MAX_ORDER`] qualifies.
#[must_use]
pub fn find_order(angle: f64, rotoinversion: bool, tol: f64) -> OperationOrder {
    (1..=MAX_ORDER)
        .find(|n| {
            let x = f64::from(*n) * angle / (2.0 * PI);
            (x - x.round()).abs() <= tol
        })
        .map_or(OperationOrder::Irrational, |n| {
            if rotoinversion && n % 2 == 1 {
                OperationOrder::Finite(2 * n)
            } else {
                OperationOrder::Finite(n)
            }
        })
}

/// Checks if two motions are conjugate. See [`OperationAnalysis::is_conjugate`].
#[must_use]
pub fn are_conjugate(motion1: &RigidMotion, motion2: &RigidMotion) -> bool {
    OperationAnalysis::new(motion1).is_conjugate(&OperationAnalysis::new(motion2))
}

/// Checks if two motions are equal within tolerances, treating translations modulo lattice
/// translations along periodic axes.
///
/// The linear parts are compared element-wise with
/// $`|a - b| \le \mathrm{atol} + \mathrm{rtol} \cdot |b|`$. The translation difference
/// $`\mathbf{t}_2 - \mathbf{t}_1`$ is folded into $`[0, 1)`$ along periodic axes and must have
/// a Euclidean norm below `rtol`.
///
/// Note that a folded difference just below an integer, such as $`0.9999`$, is not recognised
/// as a lattice translation.
#[must_use]
pub fn are_equal(
    motion1: &RigidMotion,
    motion2: &RigidMotion,
    flags: &PeriodicFlags,
    rtol: f64,
    atol: f64,
) -> bool {
    if !all_close(motion1.linear_part(), motion2.linear_part(), rtol, atol) {
        return false;
    }
    let difference = (motion2.translation() - motion1.translation()).fold_into_cell(flags);
    difference.norm() < rtol
}
