#![allow(dead_code)]

pub mod utilities;

pub use utilities::*;
