//! Ciphertext and plaintext export, and output import.

use tracing::debug;

use crate::error::{ContractViolation, Result};
use crate::operand::{Ciphertext, Plaintext, PlaintextMul, PlaintextRingT};

use super::layout::{ExportedCiphertext, ExportedPlaintext};
use super::poly::export_polynomial;
use super::ExportContext;

/// Flatten a ciphertext unchanged
pub fn export_ciphertext(ct: &Ciphertext) -> Result<ExportedCiphertext> {
    let polys = ct
        .value
        .iter()
        .map(export_polynomial)
        .collect::<Result<Vec<_>>>()?;
    Ok(ExportedCiphertext {
        level: ct.level() as i32,
        degree: ct.degree() as i32,
        polys,
    })
}

/// Flatten a standard plaintext unchanged
pub fn export_plaintext(pt: &Plaintext) -> Result<ExportedPlaintext> {
    Ok(ExportedPlaintext {
        level: pt.level() as i32,
        poly: export_polynomial(&pt.value)?,
    })
}

/// Flatten a plaintext-ring plaintext; the exported level is always 0
pub fn export_plaintext_ringt(pt: &PlaintextRingT) -> Result<ExportedPlaintext> {
    Ok(ExportedPlaintext {
        level: 0,
        poly: export_polynomial(&pt.value)?,
    })
}

/// Export a multiplication plaintext in the standard domain
///
/// Works on a private copy: unmask every limb up to the plaintext's level,
/// then multiply by `2^mform_bits` when the context carries a rescale. The
/// caller's plaintext keeps its Montgomery form.
///
/// # Arguments
///
/// * `ctx` - Export context holding the base chain and rescale exponent
/// * `pt` - Plaintext in Montgomery form
///
/// # Errors
///
/// [`ContractViolation::ParameterMismatch`] if the plaintext holds more limbs
/// than the context's base chain.
pub fn export_plaintext_mul(ctx: &ExportContext, pt: &PlaintextMul) -> Result<ExportedPlaintext> {
    let level = pt.level();
    if level > ctx.ring_q().max_level() || ctx.ring_q().is_empty() {
        return Err(ContractViolation::ParameterMismatch {
            field: "plaintext level".to_string(),
            expected: format!("at most {}", ctx.ring_q().max_level()),
            actual: level.to_string(),
        }
        .into());
    }
    let mut value = pt.value.clone();

    ctx.ring_q().inv_mform_lvl(level, &mut value);
    if ctx.mform_bits() != 0 {
        ctx.ring_q().mul_by_pow2_lvl(level, &mut value, ctx.mform_bits());
    }

    Ok(ExportedPlaintext {
        level: level as i32,
        poly: export_polynomial(&value)?,
    })
}

/// Copy engine output back into a caller ciphertext
///
/// The exported shape (degree, components per polynomial, component length)
/// must match the destination exactly.
pub fn import_ciphertext(id: &str, src: &ExportedCiphertext, dst: &mut Ciphertext) -> Result<()> {
    let shape_err = |detail: String| -> crate::error::AccError {
        ContractViolation::ImportShape {
            id: id.to_string(),
            detail,
        }
        .into()
    };

    if src.polys.len() != dst.value.len() {
        return Err(shape_err(format!(
            "expected {} polynomials, got {}",
            dst.value.len(),
            src.polys.len()
        )));
    }

    for (i, (poly, dst_poly)) in src.polys.iter().zip(&mut dst.value).enumerate() {
        if poly.components.len() != dst_poly.limb_count() {
            return Err(shape_err(format!(
                "polynomial {} has {} components, expected {}",
                i,
                poly.components.len(),
                dst_poly.limb_count()
            )));
        }
        for (j, (component, limb)) in poly.components.iter().zip(dst_poly.limbs_mut()).enumerate() {
            if component.values.len() != limb.len() {
                return Err(shape_err(format!(
                    "polynomial {} component {} has length {}, expected {}",
                    i,
                    j,
                    component.values.len(),
                    limb.len()
                )));
            }
            limb.copy_from_slice(&component.values);
        }
    }

    debug!(id, degree = src.degree, level = src.level, "imported output ciphertext");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ModQ;
    use crate::params::HeParams;
    use crate::ring::RnsPoly;

    const Q: [u64; 2] = [1152921504606830593, 0x7fffe0001];

    fn params() -> HeParams {
        HeParams::ckks(4, Q.to_vec(), vec![0x1fffffffffe00001])
    }

    fn standard_poly() -> RnsPoly {
        RnsPoly::from_limbs(vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8]])
    }

    #[test]
    fn test_ciphertext_flattened_unchanged() {
        let ct = Ciphertext::from_polys(vec![standard_poly(), standard_poly()]);
        let out = export_ciphertext(&ct).unwrap();
        assert_eq!(out.level, 1);
        assert_eq!(out.degree, 1);
        assert_eq!(out.polys.len(), 2);
        assert_eq!(out.polys[1].components[1].values, vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_ringt_exported_at_level_zero() {
        let pt = PlaintextRingT::new(standard_poly());
        let out = export_plaintext_ringt(&pt).unwrap();
        assert_eq!(out.level, 0);
        assert_eq!(out.poly.component_count(), 2);
    }

    #[test]
    fn test_plaintext_mul_unmasked() {
        let ctx = ExportContext::new(&params(), 0);
        let pt = PlaintextMul::from_standard(standard_poly(), ctx.ring_q());
        let out = export_plaintext_mul(&ctx, &pt).unwrap();
        assert_eq!(out.poly.components[0].values, vec![1, 2, 3, 4]);
        assert_eq!(out.poly.components[1].values, vec![5, 6, 7, 8]);
        // caller's copy stays masked
        assert_ne!(pt.value, standard_poly());
    }

    #[test]
    fn test_plaintext_mul_rescaled_per_limb() {
        let k = 5;
        let ctx = ExportContext::new(&params(), k);
        let pt = PlaintextMul::from_standard(standard_poly(), ctx.ring_q());
        let out = export_plaintext_mul(&ctx, &pt).unwrap();
        for (limb, &q) in Q.iter().enumerate() {
            let expected: Vec<u64> = standard_poly()
                .limb(limb)
                .iter()
                .map(|&c| ModQ::mul(c, ModQ::pow2(k, q), q))
                .collect();
            assert_eq!(out.poly.components[limb].values, expected);
        }
    }

    #[test]
    fn test_plaintext_mul_above_chain_rejected() {
        let ctx = ExportContext::new(&params(), 0);
        let pt = PlaintextMul::from_mform(RnsPoly::zero(4, 2));
        let err = export_plaintext_mul(&ctx, &pt).unwrap_err();
        assert!(matches!(
            err.violation(),
            Some(ContractViolation::ParameterMismatch { field, .. }) if field == "plaintext level"
        ));
    }

    #[test]
    fn test_rescale_without_unmask_diverges() {
        let k = 7;
        let ctx = ExportContext::new(&params(), k);
        let pt = PlaintextMul::from_standard(standard_poly(), ctx.ring_q());
        let exported = export_plaintext_mul(&ctx, &pt).unwrap();

        let mut masked_rescaled = pt.value.clone();
        ctx.ring_q().mul_by_pow2(&mut masked_rescaled, k);
        let masked_rescaled = export_polynomial(&masked_rescaled).unwrap();

        assert_ne!(exported.poly, masked_rescaled);
    }

    #[test]
    fn test_import_writes_back() {
        let src_ct = Ciphertext::from_polys(vec![standard_poly(), standard_poly()]);
        let exported = export_ciphertext(&src_ct).unwrap();
        let mut dst = Ciphertext::zero(4, 1, 1);
        import_ciphertext("out", &exported, &mut dst).unwrap();
        assert_eq!(dst, src_ct);
    }

    #[test]
    fn test_import_shape_mismatch() {
        let exported = export_ciphertext(&Ciphertext::zero(4, 1, 1)).unwrap();
        let mut dst = Ciphertext::zero(4, 1, 2);
        let err = import_ciphertext("out", &exported, &mut dst).unwrap_err();
        assert!(matches!(
            err.violation(),
            Some(ContractViolation::ImportShape { id, .. }) if id == "out"
        ));
    }
}
