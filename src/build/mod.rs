//! Recipe generation — Dockerfile, README, build directory contents.

pub mod dockerfile;
pub mod readme;

pub use dockerfile::{generate, BuildFile, BuildOutput, GenerateOptions};
