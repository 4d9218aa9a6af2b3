//! # latsym: periodic geometry and rigid-motion symmetry for crystal unit cells
//!
//! `latsym` answers geometric questions about points in a unit cell whose lattice may be periodic
//! along any subset of its three axes:
//! - folding fractional coordinates into the canonical cell and enumerating neighbouring lattice
//!   translations,
//! - minimum-image distances and distance matrices between point sets under several metrics,
//! - species-aware proximity checks against tolerance tables, including checks of a point set
//!   against its own periodic images, and connectivity graphs of the tightest contacts,
//! - classification of rigid motions into identities, rotations, inversions and rotoinversions
//!   together with their orders, angles and axes, and conjugacy and equality tests, and
//! - application of rigid motions to points and projection of points onto the invariant
//!   subspaces of special positions.
//!
//! ## Conventions
//!
//! Lattices are $`3 \times 3`$ matrices whose rows are the cell edge vectors, so that a
//! fractional row vector $`\mathbf{f}`$ has Cartesian coordinates $`\mathbf{f}\mathbf{L}`$.
//! Positions are [`nalgebra::Point3`] values and displacements are [`nalgebra::Vector3`] values.
//! Distances are in the length unit of the lattice, typically ångströms.
//!
//! ## Binary
//!
//! The `latsym` binary reads a YAML configuration file with optional `structure_validation` and
//! `operation_analysis` sections (see [`interfaces::input::Input`]) and writes a report to the
//! console and optionally to a file:
//!
//! ```text
//! latsym --config input.yml --output report.out -v
//! ```
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0 or later.

pub mod auxiliary;
pub mod drivers;
pub mod interfaces;
pub mod io;
pub mod periodic;
pub mod proximity;
pub mod symmetry;
