use crate::error::{CamToolError, CamToolResult, ParameterError};
use axlekit_core::{Catalog, Length, MachineParameters, TypeIndex};
use axlekit_optimizer::Segment;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subprogram codes are one to four `1` digits
pub const MAX_AXLE_TYPES: usize = 4;

/// Run lengths are written with three digits
pub const MAX_RUN_LENGTH: usize = 999;

/// Parameters for lathe program generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineCodeParameters {
    /// Bar diameter (mm)
    pub diameter: Length,
    /// Longest scrap block one parting cycle removes (mm)
    pub max_waste_cut_length: Length,
}

impl Default for MachineCodeParameters {
    fn default() -> Self {
        Self {
            diameter: 20,
            max_waste_cut_length: 50,
        }
    }
}

impl MachineCodeParameters {
    pub fn new(diameter: Length, max_waste_cut_length: Length) -> Self {
        Self {
            diameter,
            max_waste_cut_length,
        }
    }

    /// Take the diameter from the machine parameters
    pub fn from_machine(params: &MachineParameters, max_waste_cut_length: Length) -> Self {
        Self::new(params.diameter, max_waste_cut_length)
    }
}

/// Subprogram call for `run` consecutive axles of one type
///
/// `M98P` followed by the run length in three digits and the type code:
/// `type_index + 1` ones, left-padded with zeros to four digits.
pub fn subprogram_call(run: usize, type_index: TypeIndex) -> CamToolResult<String> {
    if type_index >= MAX_AXLE_TYPES {
        return Err(ParameterError::Incompatible(format!(
            "type index {} has no subprogram, at most {} axle types are supported",
            type_index, MAX_AXLE_TYPES
        ))
        .into());
    }
    if run == 0 || run > MAX_RUN_LENGTH {
        return Err(ParameterError::OutOfRange {
            name: "run length".to_string(),
            value: run as u64,
            min: 1,
            max: MAX_RUN_LENGTH as u64,
        }
        .into());
    }

    let code = "1".repeat(type_index + 1);
    Ok(format!("M98P{:03}{:0>4}", run, code))
}

/// File name for a program generated at `time`
pub fn program_file_name<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("axles_{}.nc", time.format("%Y%m%d_%H%M%S"))
}

/// Generator for lathe programs
pub struct MachineCodeGenerator {
    params: MachineCodeParameters,
}

impl MachineCodeGenerator {
    /// Create a new MachineCodeGenerator with the given parameters
    pub fn new(params: MachineCodeParameters) -> Self {
        Self { params }
    }

    /// Generate the program for bars in cutting order
    pub fn generate(&self, bars: &[Segment], catalog: &Catalog) -> CamToolResult<String> {
        self.validate(catalog)?;

        let mut lines = Vec::new();
        for (index, bar) in bars.iter().enumerate() {
            if bar.pieces.is_empty() {
                return Err(CamToolError::GenerationFailed(format!(
                    "bar {} has no pieces",
                    index + 1
                )));
            }
            self.push_runs(&mut lines, &bar.pieces)?;
            self.push_scrap(&mut lines, bar.waste);
        }

        debug!(
            "Generated {} program lines for {} bars",
            lines.len(),
            bars.len()
        );

        let mut program = String::from("%\n");
        for line in &lines {
            program.push('\n');
            program.push_str(line);
        }
        program.push_str("\n\n%");
        Ok(program)
    }

    /// Generate and write the program into `dir`, returning the file path
    pub fn write_program<Tz: TimeZone>(
        &self,
        bars: &[Segment],
        catalog: &Catalog,
        dir: &Path,
        time: &DateTime<Tz>,
    ) -> CamToolResult<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let program = self.generate(bars, catalog)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(program_file_name(time));
        std::fs::write(&path, program)?;
        info!("Wrote machine code to {}", path.display());
        Ok(path)
    }

    fn validate(&self, catalog: &Catalog) -> Result<(), ParameterError> {
        if catalog.len() > MAX_AXLE_TYPES {
            return Err(ParameterError::Incompatible(format!(
                "{} axle types, machine code supports at most {}",
                catalog.len(),
                MAX_AXLE_TYPES
            )));
        }
        if self.params.max_waste_cut_length == 0 {
            return Err(ParameterError::InvalidValue {
                name: "max_waste_cut_length".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }

    fn push_runs(&self, lines: &mut Vec<String>, pieces: &[TypeIndex]) -> CamToolResult<()> {
        for run in pieces.chunk_by(|a, b| a == b) {
            lines.push(subprogram_call(run.len(), run[0])?);
        }
        Ok(())
    }

    fn push_scrap(&self, lines: &mut Vec<String>, waste: u64) {
        let block = u64::from(self.params.max_waste_cut_length);
        let mut left = waste;
        while left > 0 {
            let chop = left.min(block);
            lines.push(self.parting_cycle(chop));
            left -= chop;
        }
    }

    /// Parting-tool cycle removing `length` mm from the bar end
    fn parting_cycle(&self, length: u64) -> String {
        let clearance = u64::from(self.params.diameter) + 2;
        [
            "T101 (PARTING TOOL)".to_string(),
            format!("G0G54Z{}.", length),
            "X-5.".to_string(),
            "G4X0.5".to_string(),
            "M11".to_string(),
            "G4X1.".to_string(),
            "M10".to_string(),
            "G0W2.".to_string(),
            format!("X{}.", clearance),
            "Z0.".to_string(),
            "M3S1200".to_string(),
            "G1X-2.F0.03".to_string(),
            "G0W2".to_string(),
            "G28U0V0".to_string(),
        ]
        .join("\n")
    }
}
