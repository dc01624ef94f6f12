#[macro_use]
extern crate log;

pub use conductor::Conductor;

pub mod conductor;
pub mod translate;

mod pipeline_tests;
