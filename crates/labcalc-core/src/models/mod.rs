//! Domain models for the labcalc system.

mod accession;
mod codes;
mod lab_test;
mod observation;
mod patient;
mod result;

pub use accession::*;
pub use codes::*;
pub use lab_test::*;
pub use observation::*;
pub use patient::*;
pub use result::*;
