//! Sport-agnostic numerics for pricing accumulators: Poisson mass and tail functions over a
//! factorial lookup, a dense matrix for scoreline grids, probability slice helpers, lexicographic
//! _k_-combination enumeration and fair-odds pricing with a synthetic margin.

pub mod comb;
pub mod factorial;
pub mod file;
pub mod linear;
pub mod market;
pub mod poisson;
pub mod probs;
pub mod timed;

#[doc = include_str!("../../README.md")]
#[cfg(doc)]
fn readme() {}
