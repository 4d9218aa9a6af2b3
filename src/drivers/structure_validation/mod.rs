//! Driver for validating interatomic distances in periodic structures.

use std::fmt;

use anyhow::{ensure, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use nalgebra::Point3;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::auxiliary::tolerance::ToleranceMatrix;
use crate::drivers::LatsymDriver;
use crate::io::format::{
    latsym_output, log_subtitle, log_title, nice_bool, write_subtitle, LatsymOutput, Priority,
    Reporter,
};
use crate::periodic::distance::{distance_matrix, DistanceMetric, Lattice};
use crate::periodic::PeriodicFlags;
use crate::proximity::{
    check_images, find_short_dist, verify_distances, ConnectivityGraph, ImageTolerance,
};

#[cfg(test)]
#[path = "structure_validation_tests.rs"]
mod structure_validation_tests;

// ==================
// Struct definitions
// ==================

// ---------
// Structure
// ---------

/// A labelled site in a unit cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// The species label, either an element symbol or an atomic number.
    pub species: String,

    /// The fractional position.
    pub position: Point3<f64>,
}

impl Site {
    /// Creates a site from a species label and a fractional position.
    pub fn new(species: &str, position: Point3<f64>) -> Self {
        Self {
            species: species.to_string(),
            position,
        }
    }
}

/// A set of labelled sites in a unit cell with possibly partial periodicity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// The unit cell lattice.
    pub lattice: Lattice,

    /// The periodicity flags. Full periodicity if not specified.
    #[serde(default)]
    pub periodicity: PeriodicFlags,

    /// The sites.
    pub sites: Vec<Site>,
}

impl Structure {
    /// Returns the fractional positions of all sites.
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.sites.iter().map(|site| site.position).collect()
    }

    /// Returns the species labels of all sites.
    pub fn labels(&self) -> Vec<&str> {
        self.sites.iter().map(|site| site.species.as_str()).collect()
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lattice vectors (Å):")?;
        write!(f, "{}", self.lattice)?;
        writeln!(f, "Periodicity: {}", self.periodicity)?;
        writeln!(f, "{}", "┈".repeat(47))?;
        writeln!(f, "{:>5} {:>7} {:>10} {:>10} {:>10}", "#", "Species", "a", "b", "c")?;
        writeln!(f, "{}", "┈".repeat(47))?;
        for (i, site) in self.sites.iter().enumerate() {
            writeln!(
                f,
                "{:>5} {:>7} {:>+10.6} {:>+10.6} {:>+10.6}",
                i, site.species, site.position[0], site.position[1], site.position[2]
            )?;
        }
        writeln!(f, "{}", "┈".repeat(47))?;
        Ok(())
    }
}

// ----------
// Parameters
// ----------

fn default_factor() -> f64 {
    1.0
}
fn default_short_distance_tolerance() -> f64 {
    0.5
}
fn default_verbosity() -> u8 {
    1
}

/// A structure containing control parameters for structure validation.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct StructureValidationParams {
    /// The factor applied to half the covalent-radius sum of each pair of sites.
    #[builder(default = "1.0")]
    #[serde(default = "default_factor")]
    pub covalent_radius_factor: f64,

    /// The species-pair tolerance table used to check sites against their periodic images.
    #[builder(default = "ToleranceMatrix::default()")]
    #[serde(default)]
    pub tolerance_matrix: ToleranceMatrix,

    /// A single tolerance overriding [`Self::tolerance_matrix`] for the image check.
    #[builder(default = "None")]
    #[serde(default)]
    pub image_tolerance: Option<f64>,

    /// The factor multiplying every image-check tolerance.
    #[builder(default = "1.0")]
    #[serde(default = "default_factor")]
    pub tolerance_scale: f64,

    /// The largest distance for a pair of sites to be considered a short contact.
    #[builder(default = "0.5")]
    #[serde(default = "default_short_distance_tolerance")]
    pub short_distance_tolerance: f64,

    /// Boolean indicating if the minimum-image distance matrix is to be written to the output.
    #[builder(default = "false")]
    #[serde(default)]
    pub write_distance_matrix: bool,

    /// The verbosity of advisory messages.
    #[builder(default = "1")]
    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

impl StructureValidationParams {
    /// Returns a builder to construct a [`StructureValidationParams`] structure.
    pub fn builder() -> StructureValidationParamsBuilder {
        StructureValidationParamsBuilder::default()
    }
}

impl Default for StructureValidationParams {
    fn default() -> Self {
        Self::builder()
            .build()
            .expect("Unable to construct a default `StructureValidationParams`.")
    }
}

impl fmt::Display for StructureValidationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Covalent-radius factor: {:.3}",
            self.covalent_radius_factor
        )?;
        match self.image_tolerance {
            Some(tol) => writeln!(f, "Uniform image tolerance: {tol:.3} Å")?,
            None => write!(f, "{}", self.tolerance_matrix)?,
        }
        writeln!(f, "Image tolerance scale: {:.3}", self.tolerance_scale)?;
        writeln!(
            f,
            "Short-contact distance tolerance: {:.3} Å",
            self.short_distance_tolerance
        )?;
        writeln!(
            f,
            "Write distance matrix: {}",
            nice_bool(self.write_distance_matrix)
        )?;
        writeln!(f, "Verbosity: {}", self.verbosity)?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain structure validation results.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct StructureValidationResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: StructureValidationParams,

    /// The minimum-image distance matrix between all sites.
    pub distance_matrix: Array2<f64>,

    /// The smallest minimum-image distance between two distinct sites, if there are at least two
    /// sites.
    pub min_distance: Option<f64>,

    /// Boolean indicating if all pairs of sites satisfy the covalent-radius tolerance.
    pub distances_valid: bool,

    /// Boolean indicating if no site is too close to its own periodic images.
    pub images_valid: bool,

    /// The tightest contacts below the short-contact tolerance.
    pub short_contacts: ConnectivityGraph,
}

impl StructureValidationResult {
    fn builder() -> StructureValidationResultBuilder {
        StructureValidationResultBuilder::default()
    }

    /// Checks if the structure passes both the pairwise and the image checks.
    pub fn is_valid(&self) -> bool {
        self.distances_valid && self.images_valid
    }

    fn write_distance_matrix(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "Minimum-image distance matrix (Å)")?;
        for row in self.distance_matrix.rows() {
            writeln!(f, "{}", row.iter().map(|d| format!("{d:>10.5}")).join(" "))?;
        }
        writeln!(f)?;
        Ok(())
    }
}

impl fmt::Display for StructureValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.min_distance {
            Some(d) => writeln!(f, "Shortest site separation: {d:.6} Å")?,
            None => writeln!(f, "Shortest site separation: --")?,
        }
        writeln!(
            f,
            "Covalent-radius check passed: {}",
            nice_bool(self.distances_valid)
        )?;
        writeln!(
            f,
            "Periodic-image check passed: {}",
            nice_bool(self.images_valid)
        )?;
        writeln!(f, "Structure valid: {}", nice_bool(self.is_valid()))?;
        writeln!(f)?;
        write_subtitle(f, "Short contacts")?;
        write!(f, "{}", self.short_contacts)?;
        writeln!(f)?;
        if self.parameters.write_distance_matrix {
            self.write_distance_matrix(f)?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for structure validation.
#[derive(Clone, Builder)]
pub struct StructureValidationDriver<'a> {
    /// The control parameters for structure validation.
    parameters: &'a StructureValidationParams,

    /// The structure to be validated.
    structure: &'a Structure,

    /// The result of the structure validation.
    #[builder(setter(skip), default = "None")]
    result: Option<StructureValidationResult>,
}

impl<'a> StructureValidationDriver<'a> {
    /// Returns a builder to construct a [`StructureValidationDriver`] structure.
    pub fn builder() -> StructureValidationDriverBuilder<'a> {
        StructureValidationDriverBuilder::default()
    }

    /// Executes structure validation.
    fn validate_structure(&mut self) -> Result<(), anyhow::Error> {
        log_title("Structure Validation");
        latsym_output!("");
        let params = self.parameters;
        params.log_output_display();
        let reporter = Reporter::new(params.verbosity);

        let structure = self.structure;
        ensure!(
            !structure.sites.is_empty(),
            "The structure to be validated contains no sites."
        );
        log_subtitle("Structure");
        structure.log_output_display();
        latsym_output!("");

        let positions = structure.positions();
        let labels = structure.labels();
        let lattice = &structure.lattice;
        let flags = &structure.periodicity;
        if !flags.is_aperiodic() && lattice.volume() < f64::EPSILON {
            reporter.report(
                "The lattice is singular. Periodic distances are meaningless.",
                Priority::Critical,
            );
        }

        let dm = distance_matrix(
            &positions,
            &positions,
            lattice,
            flags,
            DistanceMetric::Euclidean,
        );
        let min_distance = dm
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|(_, &d)| d)
            .reduce(f64::min);

        let distances_valid = verify_distances(
            &positions,
            &labels,
            lattice,
            flags,
            params.covalent_radius_factor,
        )?;
        if !distances_valid {
            reporter.report(
                "At least one pair of sites is closer than its covalent-radius tolerance.",
                Priority::Warning,
            );
        }

        let image_tolerance = match params.image_tolerance {
            Some(tol) => ImageTolerance::Uniform(tol),
            None => ImageTolerance::Lookup(&params.tolerance_matrix),
        };
        let images_valid = check_images(
            &positions,
            &labels,
            lattice,
            flags,
            image_tolerance,
            params.tolerance_scale,
        )?;
        if !images_valid {
            reporter.report(
                "At least one site is too close to one of its own periodic images.",
                Priority::Warning,
            );
        }

        let short_contacts =
            find_short_dist(&positions, lattice, flags, params.short_distance_tolerance);
        short_contacts.pairs.iter().for_each(|(i, j, d)| {
            reporter.report(
                &format!(
                    "Short contact between sites {i} ({}) and {j} ({}): {d:.6} Å",
                    labels[*i], labels[*j]
                ),
                Priority::Info,
            );
        });
        reporter.report(
            &format!(
                "Distance matrix computed over {} lattice translations.",
                flags.translations().len()
            ),
            Priority::Debug,
        );

        self.result = Some(
            StructureValidationResult::builder()
                .parameters(params.clone())
                .distance_matrix(dm)
                .min_distance(min_distance)
                .distances_valid(distances_valid)
                .images_valid(images_valid)
                .short_contacts(short_contacts)
                .build()
                .map_err(|err| format_err!(err))?,
        );
        if let Some(res) = self.result.as_ref() {
            log_subtitle("Validation summary");
            res.log_output_display();
        }
        Ok(())
    }
}

impl LatsymDriver for StructureValidationDriver<'_> {
    type Params = StructureValidationParams;

    type Outcome = StructureValidationResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No structure validation results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.validate_structure()
    }
}
