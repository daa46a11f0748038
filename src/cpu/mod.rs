//! The simulator core (§2 "Encoding Tables" through "Decode-Dispatch Loop"),
//! split the way the teacher splits its `cpu` module into tables/
//! instructions/disassembler/memory — just with a larger operand-form
//! surface, and with decode and execution kept apart from formatting.

pub mod alu;
pub mod decode;
pub mod execute;
pub mod machine;
pub mod operand;
pub mod print;
pub mod tables;
pub mod types;

pub use machine::Machine;
pub use types::SimulationMode;
