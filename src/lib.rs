#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

pub mod utils;
pub mod errors;
pub mod epid;
