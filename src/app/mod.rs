pub mod runner;

pub use runner::run;
#[cfg(feature = "cli")]
pub use runner::run_product;
