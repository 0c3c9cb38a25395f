#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod cli;
mod constants;
pub mod config;
pub mod ctx;
pub mod errors;
pub mod git;
pub mod plan;
pub mod store;
pub mod tree;
