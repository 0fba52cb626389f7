//! Ring elements as held by the HE library.
//!
//! - [`RnsPoly`]: one polynomial over the base modulus chain Q
//! - [`RnsPolyQP`]: a polynomial over the extended chain Q·P, used by key material

mod poly;

pub use poly::{RnsPoly, RnsPolyQP};
