//! Pairwise minimum-distance tolerances between chemical species.

use std::fmt;

use periodic_table;
use phf::phf_map;
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "tolerance_tests.rs"]
mod tolerance_tests;

/// Single-bond covalent radii in Ångström (Cordero *et al.*, Dalton Trans., 2008, 2832), with
/// low-spin values for Mn, Fe and Co and the $`\mathrm{sp}^3`$ value for C.
static COVALENT_RADII: phf::Map<&'static str, f64> = phf_map! {
    "H" => 0.31, "He" => 0.28,
    "Li" => 1.28, "Be" => 0.96, "B" => 0.84, "C" => 0.76, "N" => 0.71, "O" => 0.66,
    "F" => 0.57, "Ne" => 0.58,
    "Na" => 1.66, "Mg" => 1.41, "Al" => 1.21, "Si" => 1.11, "P" => 1.07, "S" => 1.05,
    "Cl" => 1.02, "Ar" => 1.06,
    "K" => 2.03, "Ca" => 1.76, "Sc" => 1.70, "Ti" => 1.60, "V" => 1.53, "Cr" => 1.39,
    "Mn" => 1.39, "Fe" => 1.32, "Co" => 1.26, "Ni" => 1.24, "Cu" => 1.32, "Zn" => 1.22,
    "Ga" => 1.22, "Ge" => 1.20, "As" => 1.19, "Se" => 1.20, "Br" => 1.20, "Kr" => 1.16,
    "Rb" => 2.20, "Sr" => 1.95, "Y" => 1.90, "Zr" => 1.75, "Nb" => 1.64, "Mo" => 1.54,
    "Tc" => 1.47, "Ru" => 1.46, "Rh" => 1.42, "Pd" => 1.39, "Ag" => 1.45, "Cd" => 1.44,
    "In" => 1.42, "Sn" => 1.39, "Sb" => 1.39, "Te" => 1.38, "I" => 1.39, "Xe" => 1.40,
    "Cs" => 2.44, "Ba" => 2.15, "La" => 2.07, "Ce" => 2.04, "Pr" => 2.03, "Nd" => 2.01,
    "Pm" => 1.99, "Sm" => 1.98, "Eu" => 1.98, "Gd" => 1.96, "Tb" => 1.94, "Dy" => 1.92,
    "Ho" => 1.92, "Er" => 1.89, "Tm" => 1.90, "Yb" => 1.87, "Lu" => 1.87, "Hf" => 1.75,
    "Ta" => 1.70, "W" => 1.62, "Re" => 1.51, "Os" => 1.44, "Ir" => 1.41, "Pt" => 1.36,
    "Au" => 1.36, "Hg" => 1.32, "Tl" => 1.45, "Pb" => 1.46, "Bi" => 1.48, "Po" => 1.40,
    "At" => 1.50, "Rn" => 1.50,
    "Fr" => 2.60, "Ra" => 2.21, "Ac" => 2.15, "Th" => 2.06, "Pa" => 2.00, "U" => 1.96,
    "Np" => 1.90, "Pu" => 1.87, "Am" => 1.80, "Cm" => 1.69,
};

/// Default tolerance in Ångström for species pairs with no known radii.
const DEFAULT_FALLBACK_TOLERANCE: f64 = 1.0;

// =================
// Trait definitions
// =================

/// Capability to look up the minimum allowed distance between two species.
///
/// Implementations are expected to be symmetric, *i.e.* `get_tolerance(a, b)` should equal
/// `get_tolerance(b, a)`, but callers do not rely on it.
pub trait ToleranceLookup {
    /// Returns the non-negative minimum allowed distance between species `label_a` and
    /// `label_b`.
    fn get_tolerance(&self, label_a: &str, label_b: &str) -> f64;
}

impl<T: ToleranceLookup + ?Sized> ToleranceLookup for &T {
    fn get_tolerance(&self, label_a: &str, label_b: &str) -> f64 {
        (**self).get_tolerance(label_a, label_b)
    }
}

/// A single tolerance applied uniformly to every species pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformTolerance(pub f64);

impl ToleranceLookup for UniformTolerance {
    fn get_tolerance(&self, _: &str, _: &str) -> f64 {
        self.0
    }
}

// ================
// Enum definitions
// ================

/// An enumerated type for the radius-sum prototypes used to derive default tolerances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TolerancePrototype {
    /// Half the sum of the covalent radii, suited to atomic crystals.
    #[default]
    Atomic,

    /// $`1.2`$ times the sum of the covalent radii, suited to molecular crystals.
    Molecular,
}

impl TolerancePrototype {
    /// Returns the factor multiplying the sum of radii.
    #[must_use]
    pub fn radius_factor(&self) -> f64 {
        match self {
            Self::Atomic => 0.5,
            Self::Molecular => 1.2,
        }
    }
}

impl fmt::Display for TolerancePrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic => write!(f, "atomic"),
            Self::Molecular => write!(f, "molecular"),
        }
    }
}

// =================
// Utility functions
// =================

/// Normalises a species label into a canonical element symbol.
///
/// Labels may be element symbols in any letter case (`"fe"`, `"FE"`) or atomic numbers
/// (`"26"`).
///
/// # Returns
///
/// The canonical element symbol, or `None` if the label does not name a known element.
#[must_use]
pub fn canonical_symbol(label: &str) -> Option<&'static str> {
    let label = label.trim();
    let elements = periodic_table::periodic_table();
    if let Ok(atomic_number) = label.parse::<u32>() {
        return elements
            .iter()
            .find(|element| element.atomic_number == atomic_number)
            .map(|element| element.symbol);
    }
    elements
        .iter()
        .find(|element| element.symbol.eq_ignore_ascii_case(label))
        .map(|element| element.symbol)
}

/// Returns the covalent radius of a species in Ångström, if known.
#[must_use]
pub fn covalent_radius(label: &str) -> Option<f64> {
    canonical_symbol(label).and_then(|symbol| COVALENT_RADII.get(symbol).copied())
}

// ======================================
// Struct definitions and implementations
// ======================================

/// A table of pairwise species tolerances.
///
/// Tolerances are looked up in the following order:
/// 1. explicit overrides set by [`Self::set_tolerance`],
/// 2. the prototype radius sum scaled by [`Self::factor`],
/// 3. [`Self::fallback`] for species with no tabulated radii.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToleranceMatrix {
    /// The radius-sum prototype.
    pub prototype: TolerancePrototype,

    /// A multiplicative factor applied to prototype tolerances.
    pub factor: f64,

    /// The tolerance used for species with no tabulated radii.
    pub fallback: f64,

    /// Explicit per-pair overrides as canonically ordered symbol pairs with their tolerances.
    #[serde(default)]
    overrides: Vec<(String, String, f64)>,
}

impl Default for ToleranceMatrix {
    fn default() -> Self {
        Self::new(TolerancePrototype::Atomic, 1.0)
    }
}

impl ToleranceMatrix {
    /// Creates a tolerance table from a prototype and a scaling factor.
    #[must_use]
    pub fn new(prototype: TolerancePrototype, factor: f64) -> Self {
        Self {
            prototype,
            factor,
            fallback: DEFAULT_FALLBACK_TOLERANCE,
            overrides: Vec::new(),
        }
    }

    /// Sets the tolerance used for species with no tabulated radii.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    fn key(label_a: &str, label_b: &str) -> (String, String) {
        let a = canonical_symbol(label_a)
            .map(str::to_string)
            .unwrap_or_else(|| label_a.trim().to_string());
        let b = canonical_symbol(label_b)
            .map(str::to_string)
            .unwrap_or_else(|| label_b.trim().to_string());
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Overrides the tolerance of a species pair. The override applies in both orders.
    pub fn set_tolerance(&mut self, label_a: &str, label_b: &str, tolerance: f64) -> &mut Self {
        if tolerance < 0.0 {
            log::warn!(
                "Negative tolerance {tolerance} for ({label_a}, {label_b}) clamped to zero."
            );
        }
        let (a, b) = Self::key(label_a, label_b);
        let tolerance = tolerance.max(0.0);
        match self
            .overrides
            .iter_mut()
            .find(|(oa, ob, _)| *oa == a && *ob == b)
        {
            Some(entry) => entry.2 = tolerance,
            None => self.overrides.push((a, b, tolerance)),
        }
        self
    }
}

impl ToleranceLookup for ToleranceMatrix {
    fn get_tolerance(&self, label_a: &str, label_b: &str) -> f64 {
        let (a, b) = Self::key(label_a, label_b);
        if let Some((_, _, tol)) = self
            .overrides
            .iter()
            .find(|(oa, ob, _)| *oa == a && *ob == b)
        {
            return *tol;
        }
        match (covalent_radius(label_a), covalent_radius(label_b)) {
            (Some(r_a), Some(r_b)) => self.prototype.radius_factor() * (r_a + r_b) * self.factor,
            _ => self.fallback,
        }
    }
}

impl fmt::Display for ToleranceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tolerance prototype: {}", self.prototype)?;
        writeln!(f, "Tolerance factor: {:.3}", self.factor)?;
        writeln!(f, "Fallback tolerance: {:.3} Å", self.fallback)?;
        for (a, b, tol) in self.overrides.iter() {
            writeln!(f, "  Override ({a}, {b}): {tol:.3} Å")?;
        }
        Ok(())
    }
}
