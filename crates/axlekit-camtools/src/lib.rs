//! # AxleKit CAM Tools
//!
//! Turns a cutting plan into a lathe program: subprogram calls for each
//! run of equal axles and parting cycles that chop scrap off the bar end.

pub mod error;
pub mod machine_code;

pub use error::{CamToolError, CamToolResult, ParameterError};
pub use machine_code::{program_file_name, subprogram_call, MachineCodeGenerator, MachineCodeParameters};
