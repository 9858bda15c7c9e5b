mod checks;
pub mod contract_bindings;
mod engine;
mod error;
mod evm;
mod reader;
mod verification;
mod violation;

pub use {checks::*, engine::*, error::*, evm::*, reader::*, verification::*, violation::*};
