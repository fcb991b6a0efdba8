#![allow(dead_code)]

pub mod engine;
pub mod runtime;
pub mod utils;
