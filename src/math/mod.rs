//! Arithmetic needed to move values between numeric domains.
//!
//! - **Modular arithmetic** over Z_q
//! - **Montgomery form**: the multiplication domain in which the HE library
//!   stores multiplication plaintexts and key-switching keys
//! - **RNS bases**: limb-wise application of the above over a modulus chain
//!
//! # Example
//!
//! ```
//! use acc_bridge::math::RnsBasis;
//! use acc_bridge::ring::RnsPoly;
//!
//! let basis = RnsBasis::new(&[65537, 1152921504606830593]);
//! let mut poly = RnsPoly::from_limbs(vec![vec![1, 2], vec![3, 4]]);
//! basis.mform(&mut poly);
//! basis.inv_mform(&mut poly);
//! assert_eq!(poly.limb(1), &[3, 4]);
//! ```

pub mod modular;
pub mod montgomery;
pub mod rns;

pub use modular::ModQ;
pub use montgomery::Montgomery;
pub use rns::RnsBasis;
