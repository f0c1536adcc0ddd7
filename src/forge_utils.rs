mod build;
mod common;

pub use self::build::ForgeBuild;
pub use self::common::ContractSpec;
