pub mod bet;
pub mod data;
pub mod domain;
pub mod feed;
pub mod heuristic;
pub mod markets;
pub mod pipeline;
pub mod print;
pub mod scoregrid;
pub mod sets;
pub mod settle;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
