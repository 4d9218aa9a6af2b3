//! Rigid motions acting on fractional coordinates.

use std::fmt;

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "rigid_motion_tests.rs"]
mod rigid_motion_tests;

/// Largest denominator tried when rendering coefficients as fractions.
const MAX_DENOMINATOR: i64 = 48;

/// Threshold below which coefficients are treated as zero when rendering.
const RENDER_ZERO_THRESHOLD: f64 = 1e-8;

/// An unsigned decimal number with an optional exponent, optionally divided by another decimal.
const NUMBER_PATTERN: &str = r"(?:\d+\.?\d*|\.\d+)(?:e[+-]?\d+)?(?:/(?:\d+\.?\d*|\.\d+))?";

// ==================
// Error definitions
// ==================

/// An error type for failures in constructing or inverting a [`RigidMotion`].
#[derive(Clone)]
pub struct MotionConstructionError(String);

impl fmt::Debug for MotionConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionConstructionError")
            .field("Message", &self.0)
            .finish()
    }
}

impl fmt::Display for MotionConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MotionConstructionError with message: {}", &self.0)
    }
}

impl std::error::Error for MotionConstructionError {}

// ======================================
// Struct definitions and implementations
// ======================================

/// An affine transformation $`\mathbf{r} \mapsto \mathbf{M}\mathbf{r} + \mathbf{t}`$ on
/// fractional coordinates.
///
/// The linear part is usually a rotation or rotoinversion matrix, but singular linear parts are
/// allowed so that projectors onto special positions can be expressed too.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidMotion {
    /// The $`3 \times 3`$ linear part.
    linear: Matrix3<f64>,

    /// The translation vector.
    translation: Vector3<f64>,
}

impl From<Matrix3<f64>> for RigidMotion {
    /// Wraps a bare linear part into a motion with no translation.
    fn from(linear: Matrix3<f64>) -> Self {
        Self::from_rotation_and_translation(linear, Vector3::zeros())
    }
}

impl RigidMotion {
    /// Constructs a motion from its linear part and its translation.
    #[must_use]
    pub fn from_rotation_and_translation(linear: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            linear,
            translation,
        }
    }

    /// The identity motion.
    #[must_use]
    pub fn identity() -> Self {
        Self::from(Matrix3::identity())
    }

    /// Constructs a motion from a $`4 \times 4`$ affine matrix.
    ///
    /// # Errors
    ///
    /// Errors if the last row of the affine matrix is not $`(0, 0, 0, 1)`$.
    pub fn from_affine(affine: &Matrix4<f64>) -> Result<Self, MotionConstructionError> {
        let last_row = affine.row(3);
        if last_row[0] != 0.0 || last_row[1] != 0.0 || last_row[2] != 0.0 || last_row[3] != 1.0 {
            return Err(MotionConstructionError(format!(
                "The last row of an affine matrix must be (0, 0, 0, 1), but found ({}, {}, {}, {}).",
                last_row[0], last_row[1], last_row[2], last_row[3]
            )));
        }
        Ok(Self::from_rotation_and_translation(
            affine.fixed_view::<3, 3>(0, 0).into_owned(),
            affine.fixed_view::<3, 1>(0, 3).into_owned(),
        ))
    }

    /// Constructs a motion from the rows of either a $`3 \times 3`$ linear part or a
    /// $`4 \times 4`$ affine matrix.
    ///
    /// # Errors
    ///
    /// Errors if the rows do not form a $`3 \times 3`$ or a $`4 \times 4`$ matrix, or if a
    /// $`4 \times 4`$ matrix is not affine.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MotionConstructionError> {
        let n = rows.len();
        if !(n == 3 || n == 4) || rows.iter().any(|row| row.len() != n) {
            return Err(MotionConstructionError(format!(
                "Expected the rows of a 3 × 3 or 4 × 4 matrix, but found row lengths {:?}.",
                rows.iter().map(Vec::len).collect::<Vec<_>>()
            )));
        }
        if n == 3 {
            Ok(Self::from(Matrix3::from_fn(|i, j| rows[i][j])))
        } else {
            Self::from_affine(&Matrix4::from_fn(|i, j| rows[i][j]))
        }
    }

    /// Parses a motion from its coordinate-triplet form, such as `-y, x-y, z+1/3`.
    ///
    /// Each component is a signed sum of terms, each of which is either a variable `x`, `y`,
    /// `z` with an optional numeric coefficient (`2x`, `2*x`, `1/2x` or `x*2`), or a numeric
    /// constant. Numbers may be decimals, with or without exponents, or fractions.
    ///
    /// # Errors
    ///
    /// Errors if the string does not have exactly three components or a component cannot be
    /// parsed.
    pub fn from_xyz_string(xyz: &str) -> Result<Self, MotionConstructionError> {
        let components = xyz.split(',').map(str::trim).collect::<Vec<_>>();
        if components.len() != 3 {
            return Err(MotionConstructionError(format!(
                "Expected three comma-separated components in `{xyz}`."
            )));
        }
        let term_re = Regex::new(&format!(
            r"(?P<sign>[+-]?)(?:(?P<lead>{NUMBER_PATTERN})\*?(?P<var>[xyz])|(?P<postvar>[xyz])(?:\*(?P<trail>{NUMBER_PATTERN}))?|(?P<constant>{NUMBER_PATTERN}))"
        ))
        .expect("Regex pattern invalid.");
        let mut linear = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (i, component) in components.iter().enumerate() {
            if component.is_empty() {
                return Err(MotionConstructionError(format!(
                    "Empty component {i} in `{xyz}`."
                )));
            }
            let terms = parse_component(component, &term_re).ok_or_else(|| {
                MotionConstructionError(format!(
                    "Unable to parse component `{component}` in `{xyz}`."
                ))
            })?;
            for (coefficient, variable) in terms {
                match variable {
                    Some(j) => linear[(i, j)] += coefficient,
                    None => translation[i] += coefficient,
                }
            }
        }
        Ok(Self::from_rotation_and_translation(linear, translation))
    }

    /// Returns the linear part.
    #[must_use]
    pub fn linear_part(&self) -> &Matrix3<f64> {
        &self.linear
    }

    /// Returns the translation.
    #[must_use]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    /// Returns the $`4 \times 4`$ affine matrix.
    #[must_use]
    pub fn affine_matrix(&self) -> Matrix4<f64> {
        let mut affine = self.linear.to_homogeneous();
        affine
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation);
        affine
    }

    /// Returns a copy of this motion whose translation is shifted by `offset`.
    #[must_use]
    pub fn shifted(&self, offset: &Vector3<f64>) -> Self {
        Self::from_rotation_and_translation(self.linear, self.translation + offset)
    }

    /// Applies this motion to a point.
    #[must_use]
    pub fn operate(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.linear * point.coords + self.translation)
    }

    /// Returns the motion that applies `other` first and then `self`.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self::from_rotation_and_translation(
            self.linear * other.linear,
            self.linear * other.translation + self.translation,
        )
    }

    /// Returns the inverse motion.
    ///
    /// # Errors
    ///
    /// Errors if the linear part is singular.
    pub fn invert(&self) -> Result<Self, MotionConstructionError> {
        let inverse = self.linear.try_inverse().ok_or_else(|| {
            MotionConstructionError(format!(
                "The motion `{}` has a singular linear part and cannot be inverted.",
                self.as_xyz_string()
            ))
        })?;
        Ok(Self::from_rotation_and_translation(
            inverse,
            -(inverse * self.translation),
        ))
    }

    /// Renders this motion in coordinate-triplet form, such as `x, -y, z+1/2`.
    #[must_use]
    pub fn as_xyz_string(&self) -> String {
        (0..3)
            .map(|i| {
                let mut component = String::new();
                for (j, var) in ["x", "y", "z"].iter().enumerate() {
                    let c = self.linear[(i, j)];
                    if c.abs() <= RENDER_ZERO_THRESHOLD {
                        continue;
                    }
                    let sign = if c < 0.0 {
                        "-"
                    } else if component.is_empty() {
                        ""
                    } else {
                        "+"
                    };
                    let magnitude = if (c.abs() - 1.0).abs() <= RENDER_ZERO_THRESHOLD {
                        String::new()
                    } else {
                        format_number(c.abs())
                    };
                    component.push_str(&format!("{sign}{magnitude}{var}"));
                }
                let t = self.translation[i];
                if t.abs() > RENDER_ZERO_THRESHOLD {
                    let sign = if t < 0.0 {
                        "-"
                    } else if component.is_empty() {
                        ""
                    } else {
                        "+"
                    };
                    component.push_str(&format!("{sign}{}", format_number(t.abs())));
                }
                if component.is_empty() {
                    "0".to_string()
                } else {
                    component
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RigidMotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_xyz_string())
    }
}

// =========
// Functions
// =========

/// Inverts every motion in a list.
///
/// # Errors
///
/// Errors if any motion has a singular linear part.
pub fn invert_all(motions: &[RigidMotion]) -> Result<Vec<RigidMotion>, MotionConstructionError> {
    motions.iter().map(RigidMotion::invert).collect()
}

/// Renders a non-negative number as a small fraction if possible, and as a decimal otherwise.
fn format_number(x: f64) -> String {
    if (x - x.round()).abs() <= RENDER_ZERO_THRESHOLD {
        return format!("{}", x.round() as i64);
    }
    (2..=MAX_DENOMINATOR)
        .find_map(|den| {
            let num = x * den as f64;
            ((num - num.round()).abs() <= RENDER_ZERO_THRESHOLD * den as f64)
                .then(|| format!("{}/{den}", num.round() as i64))
        })
        .unwrap_or_else(|| format!("{x:.6}"))
}

/// Parses a coordinate-triplet component into signed terms, each given as its coefficient and
/// the index of its variable, if any.
///
/// The matched terms must cover the whole component, and every term after the first must carry
/// an explicit sign.
fn parse_component(component: &str, term_re: &Regex) -> Option<Vec<(f64, Option<usize>)>> {
    let compact = component
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let mut end = 0;
    let mut terms = vec![];
    for cap in term_re.captures_iter(&compact) {
        let whole = cap.get(0)?;
        let sign = cap.name("sign").map_or("", |m| m.as_str());
        if whole.start() != end || (end > 0 && sign.is_empty()) {
            return None;
        }
        end = whole.end();

        let sign = if sign == "-" { -1.0 } else { 1.0 };
        let term = match cap.name("var").or_else(|| cap.name("postvar")) {
            Some(var) => {
                let coefficient = match cap.name("lead").or_else(|| cap.name("trail")) {
                    Some(number) => parse_number(number.as_str())?,
                    None => 1.0,
                };
                let index = match var.as_str() {
                    "x" => 0,
                    "y" => 1,
                    _ => 2,
                };
                (sign * coefficient, Some(index))
            }
            None => (sign * parse_number(cap.name("constant")?.as_str())?, None),
        };
        terms.push(term);
    }
    (end == compact.len() && !terms.is_empty()).then_some(terms)
}

/// Parses a decimal or a fraction of decimals. Zero denominators are rejected.
fn parse_number(number: &str) -> Option<f64> {
    match number.split_once('/') {
        Some((num, den)) => {
            let den = den.parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            Some(num.parse::<f64>().ok()? / den)
        }
        None => number.parse::<f64>().ok(),
    }
}
