//! Driver for classifying lists of rigid motions.

use std::fmt;

use anyhow::format_err;
use derive_builder::Builder;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::drivers::LatsymDriver;
use crate::io::format::{
    latsym_output, log_subtitle, log_title, nice_bool, write_subtitle, LatsymOutput, Priority,
    Reporter,
};
use crate::periodic::distance::Lattice;
use crate::periodic::PeriodicFlags;
use crate::symmetry::operation_analysis::{
    are_equal, OperationAnalysis, OperationType, ORTHOGONALITY_TOLERANCE,
};
use crate::symmetry::projection::project;
use crate::symmetry::rigid_motion::{invert_all, RigidMotion};

#[cfg(test)]
#[path = "operation_analysis_tests.rs"]
mod operation_analysis_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the ways a rigid motion can be specified in an input file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MotionSpec {
    /// A coordinate-triplet string such as `"-y, x-y, z+1/3"`.
    Xyz(String),

    /// A $`3 \times 3`$ linear part or a $`4 \times 4`$ affine matrix given row by row.
    Rows(Vec<Vec<f64>>),

    /// A linear part given row by row together with a translation vector.
    RotationTranslation {
        /// The rows of the linear part.
        rotation: [[f64; 3]; 3],

        /// The translation vector.
        translation: [f64; 3],
    },
}

impl MotionSpec {
    /// Constructs the rigid motion described by this specification.
    ///
    /// # Errors
    ///
    /// Errors if the string or the matrix is malformed.
    pub fn to_motion(&self) -> Result<RigidMotion, anyhow::Error> {
        match self {
            Self::Xyz(xyz) => Ok(RigidMotion::from_xyz_string(xyz)?),
            Self::Rows(rows) => Ok(RigidMotion::from_rows(rows)?),
            Self::RotationTranslation {
                rotation,
                translation,
            } => Ok(RigidMotion::from_rotation_and_translation(
                Matrix3::from_fn(|i, j| rotation[i][j]),
                Vector3::from(*translation),
            )),
        }
    }
}

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_equality_threshold() -> f64 {
    1e-3
}
fn default_orthogonality_tolerance() -> f64 {
    ORTHOGONALITY_TOLERANCE
}
fn default_verbosity() -> u8 {
    1
}

/// A structure containing control parameters for operation analysis.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct OperationAnalysisParams {
    /// An optional fractional position to be projected onto the invariant subspace of every
    /// operation.
    #[builder(default = "None")]
    #[serde(default)]
    pub projection_point: Option<Point3<f64>>,

    /// The threshold for two operations to be considered equal modulo lattice translations.
    #[builder(default = "1e-3")]
    #[serde(default = "default_equality_threshold")]
    pub equality_threshold: f64,

    /// The element-wise tolerance for a linear part to be considered orthogonal.
    #[builder(default = "ORTHOGONALITY_TOLERANCE")]
    #[serde(default = "default_orthogonality_tolerance")]
    pub orthogonality_tolerance: f64,

    /// Boolean indicating if the inverses of all operations are to be computed and written.
    #[builder(default = "false")]
    #[serde(default)]
    pub write_inverses: bool,

    /// The verbosity of advisory messages.
    #[builder(default = "1")]
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

impl OperationAnalysisParams {
    /// Returns a builder to construct a [`OperationAnalysisParams`] structure.
    pub fn builder() -> OperationAnalysisParamsBuilder {
        OperationAnalysisParamsBuilder::default()
    }
}

impl Default for OperationAnalysisParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `OperationAnalysisParams`.")
    }
}

impl fmt::Display for OperationAnalysisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.projection_point {
            Some(p) => writeln!(
                f,
                "Projection point: ({:+.6}, {:+.6}, {:+.6})",
                p[0], p[1], p[2]
            )?,
            None => writeln!(f, "Projection point: --")?,
        }
        writeln!(f, "Equality threshold: {:.3e}", self.equality_threshold)?;
        writeln!(
            f,
            "Orthogonality tolerance: {:.3e}",
            self.orthogonality_tolerance
        )?;
        writeln!(f, "Write inverses: {}", nice_bool(self.write_inverses))?;
        writeln!(f, "Verbosity: {}", self.verbosity)?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain operation analysis results.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct OperationAnalysisResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: OperationAnalysisParams,

    /// The classification of every operation, in input order.
    pub analyses: Vec<OperationAnalysis>,

    /// Indices of operations grouped into mutually conjugate classes. Each class is ordered by
    /// index and classes are ordered by their first index.
    pub conjugacy_classes: Vec<Vec<usize>>,

    /// Pairs of indices $`(i, j)`$ with $`i < j`$ of operations equal modulo lattice
    /// translations.
    pub duplicates: Vec<(usize, usize)>,

    /// The inverses of all operations, if requested.
    pub inverses: Option<Vec<RigidMotion>>,

    /// The projections of [`OperationAnalysisParams::projection_point`] onto every operation,
    /// if requested.
    pub projections: Option<Vec<Point3<f64>>>,
}

impl OperationAnalysisResult {
    fn builder() -> OperationAnalysisResultBuilder {
        OperationAnalysisResultBuilder::default()
    }

    /// Returns the indices of the operations of a given type.
    pub fn indices_of_type(&self, operation_type: OperationType) -> Vec<usize> {
        self.analyses
            .iter()
            .enumerate()
            .filter_map(|(i, analysis)| (analysis.operation_type() == operation_type).then_some(i))
            .collect()
    }
}

impl fmt::Display for OperationAnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xyz_width = self
            .analyses
            .iter()
            .map(|analysis| analysis.motion().as_xyz_string().chars().count())
            .max()
            .unwrap_or(9)
            .max(9);
        let table_width = xyz_width + 50;
        writeln!(f, "{}", "┈".repeat(table_width))?;
        writeln!(
            f,
            "{:>4}  {:<xyz_width$}  {:<13}  {:>10}  {:>6}  {:>7}",
            "#", "Operation", "Type", "Order", "Angle", "det"
        )?;
        writeln!(f, "{}", "┈".repeat(table_width))?;
        for (i, analysis) in self.analyses.iter().enumerate() {
            let order = analysis
                .order()
                .map_or_else(|| "--".to_string(), |order| order.to_string());
            let angle = analysis
                .angle()
                .map_or_else(|| "--".to_string(), |angle| format!("{angle:.4}"));
            writeln!(
                f,
                "{i:>4}  {:<xyz_width$}  {:<13}  {order:>10}  {angle:>6}  {:>+7.3}",
                analysis.motion().as_xyz_string(),
                analysis.operation_type().to_string(),
                analysis.determinant()
            )?;
        }
        writeln!(f, "{}", "┈".repeat(table_width))?;
        writeln!(f)?;

        write_subtitle(f, "Conjugacy classes")?;
        for (k, class) in self.conjugacy_classes.iter().enumerate() {
            writeln!(
                f,
                "Class {k}: {}",
                class
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )?;
        }
        writeln!(f)?;

        write_subtitle(f, "Duplicate operations")?;
        if self.duplicates.is_empty() {
            writeln!(f, "--")?;
        }
        for (i, j) in self.duplicates.iter() {
            writeln!(f, "{i} ≡ {j}")?;
        }
        writeln!(f)?;

        if let Some(inverses) = self.inverses.as_ref() {
            write_subtitle(f, "Inverse operations")?;
            for (i, inverse) in inverses.iter().enumerate() {
                writeln!(f, "{i:>4}  {}", inverse.as_xyz_string())?;
            }
            writeln!(f)?;
        }

        if let Some(projections) = self.projections.as_ref() {
            write_subtitle(f, "Projections onto invariant subspaces")?;
            for (i, p) in projections.iter().enumerate() {
                writeln!(f, "{i:>4}  ({:+.6}, {:+.6}, {:+.6})", p[0], p[1], p[2])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for operation analysis.
#[derive(Clone, Builder)]
pub struct OperationAnalysisDriver<'a> {
    /// The control parameters for operation analysis.
    parameters: &'a OperationAnalysisParams,

    /// The operations to be analysed.
    motions: &'a [RigidMotion],

    /// The lattice used to measure distances when projecting.
    #[builder(default = "Lattice::identity()")]
    lattice: Lattice,

    /// The periodicity flags used for equality testing and projection.
    #[builder(default = "PeriodicFlags::full()")]
    periodicity: PeriodicFlags,

    /// The result of the operation analysis.
    #[builder(setter(skip), default = "None")]
    result: Option<OperationAnalysisResult>,
}

impl<'a> OperationAnalysisDriver<'a> {
    /// Returns a builder to construct a [`OperationAnalysisDriver`] structure.
    pub fn builder() -> OperationAnalysisDriverBuilder<'a> {
        OperationAnalysisDriverBuilder::default()
    }

    /// Groups classified operations into conjugacy classes greedily in input order.
    fn conjugacy_classes(analyses: &[OperationAnalysis]) -> Vec<Vec<usize>> {
        let mut classes: Vec<Vec<usize>> = vec![];
        for (i, analysis) in analyses.iter().enumerate() {
            match classes
                .iter_mut()
                .find(|class| analyses[class[0]].is_conjugate(analysis))
            {
                Some(class) => class.push(i),
                None => classes.push(vec![i]),
            }
        }
        classes
    }

    /// Executes operation analysis.
    fn analyse_operations(&mut self) -> Result<(), anyhow::Error> {
        log_title("Operation Analysis");
        latsym_output!("");
        let params = self.parameters;
        params.log_output_display();
        let reporter = Reporter::new(params.verbosity);

        latsym_output!("Number of operations: {}", self.motions.len());
        latsym_output!("Periodicity: {}", self.periodicity);
        latsym_output!("");

        let analyses = self
            .motions
            .iter()
            .map(|motion| {
                OperationAnalysis::with_orthogonality_tolerance(
                    motion,
                    params.orthogonality_tolerance,
                )
            })
            .collect::<Vec<_>>();
        analyses
            .iter()
            .enumerate()
            .filter(|(_, analysis)| {
                matches!(
                    analysis.operation_type(),
                    OperationType::General | OperationType::Degenerate
                )
            })
            .for_each(|(i, analysis)| {
                reporter.report(
                    &format!(
                        "Operation {i} ({}) is {} and cannot be classified further.",
                        analysis.motion().as_xyz_string(),
                        analysis.operation_type()
                    ),
                    Priority::Warning,
                );
            });

        let conjugacy_classes = Self::conjugacy_classes(&analyses);

        let duplicates = (0..self.motions.len())
            .flat_map(|i| ((i + 1)..self.motions.len()).map(move |j| (i, j)))
            .filter(|(i, j)| {
                are_equal(
                    &self.motions[*i],
                    &self.motions[*j],
                    &self.periodicity,
                    params.equality_threshold,
                    params.equality_threshold,
                )
            })
            .collect::<Vec<_>>();
        duplicates.iter().for_each(|(i, j)| {
            reporter.report(
                &format!("Operations {i} and {j} are equal modulo lattice translations."),
                Priority::Info,
            );
        });

        let inverses = if params.write_inverses {
            Some(invert_all(self.motions)?)
        } else {
            None
        };

        let projections = params.projection_point.map(|point| {
            reporter.report(
                &format!(
                    "Projecting ({:+.6}, {:+.6}, {:+.6}) onto {} invariant subspaces.",
                    point[0],
                    point[1],
                    point[2],
                    self.motions.len()
                ),
                Priority::Debug,
            );
            self.motions
                .iter()
                .map(|motion| project(&point, motion, &self.lattice, &self.periodicity))
                .collect::<Vec<_>>()
        });

        self.result = Some(
            OperationAnalysisResult::builder()
                .parameters(params.clone())
                .analyses(analyses)
                .conjugacy_classes(conjugacy_classes)
                .duplicates(duplicates)
                .inverses(inverses)
                .projections(projections)
                .build()
                .map_err(|err| format_err!(err))?,
        );
        if let Some(res) = self.result.as_ref() {
            log_subtitle("Operation summary");
            res.log_output_display();
        }
        Ok(())
    }
}

impl LatsymDriver for OperationAnalysisDriver<'_> {
    type Params = OperationAnalysisParams;

    type Outcome = OperationAnalysisResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No operation analysis results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.analyse_operations()
    }
}
