//! Ring element flattening.
//!
//! No value transformation happens here: residues are copied as stored.

use crate::error::{ContractViolation, Result};
use crate::ring::{RnsPoly, RnsPolyQP};

use super::layout::{Component, Polynomial};

/// Copy one limb into a component
///
/// # Errors
///
/// Returns [`ContractViolation::EmptyComponent`] if `values` is empty.
pub fn export_component(values: &[u64]) -> Result<Component> {
    if values.is_empty() {
        return Err(ContractViolation::EmptyComponent.into());
    }
    Ok(Component::new(values.to_vec()))
}

/// Flatten every limb of `poly`
pub fn export_polynomial(poly: &RnsPoly) -> Result<Polynomial> {
    let components = poly
        .limbs()
        .iter()
        .map(|limb| export_component(limb))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polynomial::new(components))
}

/// Flatten a Q·P polynomial
///
/// The base part contributes `min(stored, level) + 1` components when `level`
/// is given, all of its components otherwise. The extension part always
/// contributes all of its components, appended after the base part.
pub fn export_polynomial_qp(poly: &RnsPolyQP, level: Option<usize>) -> Result<Polynomial> {
    let base_count = match level {
        Some(level) => poly.level_q().min(level) + 1,
        None => poly.level_q() + 1,
    };

    let components = poly.q.limbs()[..base_count]
        .iter()
        .chain(poly.p.limbs())
        .map(|limb| export_component(limb))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polynomial::new(components))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qp(level_q: usize, level_p: usize) -> RnsPolyQP {
        let q = (0..=level_q).map(|i| vec![i as u64; 4]).collect();
        let p = (0..=level_p).map(|i| vec![100 + i as u64; 4]).collect();
        RnsPolyQP::new(RnsPoly::from_limbs(q), RnsPoly::from_limbs(p))
    }

    #[test]
    fn test_empty_component_fails() {
        let err = export_component(&[]).unwrap_err();
        assert_eq!(err.violation(), Some(&ContractViolation::EmptyComponent));
    }

    #[test]
    fn test_polynomial_keeps_all_limbs() {
        let poly = RnsPoly::from_limbs(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
        let out = export_polynomial(&poly).unwrap();
        assert_eq!(out.component_count(), 3);
        assert_eq!(out.components[2].values, vec![5, 6]);
    }

    #[test]
    fn test_qp_override_truncates_base_only() {
        let poly = qp(4, 1);
        let out = export_polynomial_qp(&poly, Some(2)).unwrap();
        // 3 base + 2 extension
        assert_eq!(out.component_count(), 5);
        assert_eq!(out.components[2].values, vec![2; 4]);
        assert_eq!(out.components[3].values, vec![100; 4]);
        assert_eq!(out.components[4].values, vec![101; 4]);
    }

    #[test]
    fn test_qp_override_above_stored_is_clamped() {
        let poly = qp(2, 0);
        assert_eq!(export_polynomial_qp(&poly, Some(9)).unwrap().component_count(), 4);
        assert_eq!(export_polynomial_qp(&poly, None).unwrap().component_count(), 4);
    }
}
