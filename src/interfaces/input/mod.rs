//! YAML input specification for the `latsym` binary.

use anyhow::{self, format_err, Context};
use serde::{Deserialize, Serialize};

use crate::drivers::operation_analysis::{
    MotionSpec, OperationAnalysisDriver, OperationAnalysisParams,
};
use crate::drivers::structure_validation::{
    Structure, StructureValidationDriver, StructureValidationParams,
};
use crate::drivers::LatsymDriver;
use crate::interfaces::InputHandle;
use crate::periodic::distance::Lattice;
use crate::periodic::PeriodicFlags;


// ====================
// Structure validation
// ====================

/// A structure containing the specification of a structure validation calculation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StructureValidationInput {
    /// The control parameters. Defaults are used if not specified.
    #[serde(default)]
    pub parameters: StructureValidationParams,

    /// The structure to be validated.
    pub structure: Structure,
}

impl InputHandle for StructureValidationInput {
    fn handle(&self) -> Result<(), anyhow::Error> {
        let mut sv_driver = StructureValidationDriver::builder()
            .parameters(&self.parameters)
            .structure(&self.structure)
            .build()
            .with_context(|| "Unable to construct a structure validation driver")?;
        sv_driver
            .run()
            .with_context(|| "Unable to run the structure validation driver successfully")
    }
}

// ==================
// Operation analysis
// ==================

/// A structure containing the specification of an operation analysis calculation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OperationAnalysisInput {
    /// The control parameters. Defaults are used if not specified.
    #[serde(default)]
    pub parameters: OperationAnalysisParams,

    /// The lattice used for projections. The identity lattice is used if not specified.
    #[serde(default)]
    pub lattice: Lattice,

    /// The periodicity flags. Full periodicity if not specified.
    #[serde(default)]
    pub periodicity: PeriodicFlags,

    /// The operations to be analysed.
    pub operations: Vec<MotionSpec>,
}

impl InputHandle for OperationAnalysisInput {
    fn handle(&self) -> Result<(), anyhow::Error> {
        let motions = self
            .operations
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                spec.to_motion()
                    .with_context(|| format!("Unable to construct operation {i} from {spec:?}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut oa_driver = OperationAnalysisDriver::builder()
            .parameters(&self.parameters)
            .motions(&motions)
            .lattice(self.lattice)
            .periodicity(self.periodicity)
            .build()
            .with_context(|| "Unable to construct an operation analysis driver")?;
        oa_driver
            .run()
            .with_context(|| "Unable to run the operation analysis driver successfully")
    }
}

// =====
// Input
// =====

/// A structure containing `latsym` input parameters which can be serialised into and
/// deserialised from a YAML input file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Input {
    /// Specification for structure validation. If `None`, no structure validation will be
    /// performed.
    #[serde(default)]
    pub structure_validation: Option<StructureValidationInput>,

    /// Specification for operation analysis. If `None`, no operation analysis will be performed.
    #[serde(default)]
    pub operation_analysis: Option<OperationAnalysisInput>,
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        if self.structure_validation.is_none() && self.operation_analysis.is_none() {
            return Err(format_err!(
                "The input specifies neither structure validation nor operation analysis."
            ));
        }
        if let Some(sv_input) = self.structure_validation.as_ref() {
            sv_input.handle()?;
        }
        if let Some(oa_input) = self.operation_analysis.as_ref() {
            oa_input.handle()?;
        }
        Ok(())
    }
}
