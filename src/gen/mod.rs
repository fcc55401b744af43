//! Constants that define the current build and execution environment.
//!
//! Populated at build time by `build.rs` into `build.rs` and `_build.rs`
//! under this directory. Both files are `@generated` and not checked in;
//! `cargo build` regenerates them before this module is compiled.

use std::collections::HashMap;

#[rustfmt::skip]
pub mod build;
pub use self::build::*;

#[rustfmt::skip]
pub mod _build;
pub use self::_build::*;

pub fn dependencies_map() -> HashMap<&'static str, &'static str> {
    HashMap::from(DEPENDENCIES)
}
