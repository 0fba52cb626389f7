//! Little-endian byte encoding of exported arguments.
//!
//! ```text
//! argument  := id_len:u32 id:[u8] type:u32 count:i32 level:i32 payload
//! payload   := ciphertext* | plaintext* | ksk | galois
//! ciphertext:= level:i32 degree:i32 poly*(degree+1)
//! plaintext := level:i32 poly
//! ksk       := digit_count:i32 public_key*
//! public_key:= level:i32 degree:i32 poly poly
//! galois    := key_count:i32 element:u64* ksk*
//! poly      := component_count:u32 (len:u32 value:u64*)*
//! ```
//!
//! A list of arguments is prefixed by its length as `u32`.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::argument::{Argument, ArgumentData, ArgumentType};
use crate::error::{AccError, Result};

use super::layout::{
    Component, ExportedCiphertext, ExportedGaloisKey, ExportedKeySwitchKey, ExportedPlaintext,
    ExportedPublicKey, Polynomial,
};

// Upper bound on preallocation from untrusted length fields.
const MAX_PREALLOC: usize = 1 << 16;

fn wire_err(err: io::Error) -> AccError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        AccError::Wire("truncated input".to_string())
    } else {
        AccError::Wire(err.to_string())
    }
}

fn write_polynomial<W: Write>(w: &mut W, poly: &Polynomial) -> io::Result<()> {
    w.write_u32::<LittleEndian>(poly.component_count())?;
    for component in &poly.components {
        w.write_u32::<LittleEndian>(component.len())?;
        for &v in &component.values {
            w.write_u64::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

fn write_public_key<W: Write>(w: &mut W, pk: &ExportedPublicKey) -> io::Result<()> {
    w.write_i32::<LittleEndian>(pk.level)?;
    w.write_i32::<LittleEndian>(pk.degree)?;
    write_polynomial(w, &pk.polys[0])?;
    write_polynomial(w, &pk.polys[1])
}

fn write_key_switch_key<W: Write>(w: &mut W, ksk: &ExportedKeySwitchKey) -> io::Result<()> {
    w.write_i32::<LittleEndian>(ksk.digit_count())?;
    for pk in &ksk.digits {
        write_public_key(w, pk)?;
    }
    Ok(())
}

/// Write one argument
pub fn write_argument<W: Write>(w: &mut W, arg: &Argument) -> io::Result<()> {
    w.write_u32::<LittleEndian>(arg.id.len() as u32)?;
    w.write_all(arg.id.as_bytes())?;
    w.write_u32::<LittleEndian>(arg.arg_type().tag())?;
    w.write_i32::<LittleEndian>(arg.count)?;
    w.write_i32::<LittleEndian>(arg.level)?;

    match &arg.data {
        ArgumentData::Ciphertexts(cts) => {
            for ct in cts {
                w.write_i32::<LittleEndian>(ct.level)?;
                w.write_i32::<LittleEndian>(ct.degree)?;
                for poly in &ct.polys {
                    write_polynomial(w, poly)?;
                }
            }
        }
        ArgumentData::Plaintexts(pts) => {
            for pt in pts {
                w.write_i32::<LittleEndian>(pt.level)?;
                write_polynomial(w, &pt.poly)?;
            }
        }
        ArgumentData::RelinKey(ksk) => write_key_switch_key(w, ksk)?,
        ArgumentData::GaloisKey(gk) => {
            w.write_i32::<LittleEndian>(gk.key_count())?;
            for &g in &gk.galois_elements {
                w.write_u64::<LittleEndian>(g)?;
            }
            for ksk in &gk.key_switch_keys {
                write_key_switch_key(w, ksk)?;
            }
        }
    }
    Ok(())
}

/// Write a length-prefixed list of arguments
pub fn write_arguments<W: Write>(w: &mut W, args: &[Argument]) -> io::Result<()> {
    w.write_u32::<LittleEndian>(args.len() as u32)?;
    for arg in args {
        write_argument(w, arg)?;
    }
    Ok(())
}

/// Encode a list of arguments into a new buffer
pub fn encode_arguments(args: &[Argument]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_arguments(&mut buf, args).map_err(wire_err)?;
    Ok(buf)
}

fn read_count<R: Read>(r: &mut R, what: &str) -> Result<usize> {
    let n = r.read_i32::<LittleEndian>().map_err(wire_err)?;
    usize::try_from(n).map_err(|_| AccError::Wire(format!("negative {what} {n}")))
}

fn read_polynomial<R: Read>(r: &mut R) -> Result<Polynomial> {
    let count = r.read_u32::<LittleEndian>().map_err(wire_err)? as usize;
    let mut components = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let len = r.read_u32::<LittleEndian>().map_err(wire_err)? as usize;
        let mut values = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            values.push(r.read_u64::<LittleEndian>().map_err(wire_err)?);
        }
        components.push(Component::new(values));
    }
    Ok(Polynomial::new(components))
}

fn read_public_key<R: Read>(r: &mut R) -> Result<ExportedPublicKey> {
    let level = r.read_i32::<LittleEndian>().map_err(wire_err)?;
    let degree = r.read_i32::<LittleEndian>().map_err(wire_err)?;
    let b = read_polynomial(r)?;
    let a = read_polynomial(r)?;
    Ok(ExportedPublicKey {
        level,
        degree,
        polys: [b, a],
    })
}

fn read_key_switch_key<R: Read>(r: &mut R) -> Result<ExportedKeySwitchKey> {
    let digit_count = read_count(r, "digit count")?;
    let digits = (0..digit_count)
        .map(|_| read_public_key(r))
        .collect::<Result<Vec<_>>>()?;
    Ok(ExportedKeySwitchKey { digits })
}

/// Read one argument
pub fn read_argument<R: Read>(r: &mut R) -> Result<Argument> {
    let id_len = r.read_u32::<LittleEndian>().map_err(wire_err)? as usize;
    let mut id_bytes = Vec::with_capacity(id_len.min(MAX_PREALLOC));
    r.by_ref()
        .take(id_len as u64)
        .read_to_end(&mut id_bytes)
        .map_err(wire_err)?;
    if id_bytes.len() != id_len {
        return Err(AccError::Wire("truncated input".to_string()));
    }
    let id = String::from_utf8(id_bytes).map_err(|e| AccError::Wire(e.to_string()))?;

    let tag = r.read_u32::<LittleEndian>().map_err(wire_err)?;
    let arg_type = ArgumentType::from_tag(tag)
        .ok_or_else(|| AccError::Wire(format!("unknown argument type tag {tag}")))?;
    let count = r.read_i32::<LittleEndian>().map_err(wire_err)?;
    let level = r.read_i32::<LittleEndian>().map_err(wire_err)?;
    let n = usize::try_from(count).map_err(|_| AccError::Wire(format!("negative count {count}")))?;

    let data = match arg_type {
        ArgumentType::Ciphertext => {
            let mut cts = Vec::with_capacity(n.min(MAX_PREALLOC));
            for _ in 0..n {
                let level = r.read_i32::<LittleEndian>().map_err(wire_err)?;
                let degree = read_count(r, "degree")?;
                let polys = (0..=degree)
                    .map(|_| read_polynomial(r))
                    .collect::<Result<Vec<_>>>()?;
                cts.push(ExportedCiphertext {
                    level,
                    degree: degree as i32,
                    polys,
                });
            }
            ArgumentData::Ciphertexts(cts)
        }
        ArgumentType::Plaintext => {
            let mut pts = Vec::with_capacity(n.min(MAX_PREALLOC));
            for _ in 0..n {
                let level = r.read_i32::<LittleEndian>().map_err(wire_err)?;
                pts.push(ExportedPlaintext {
                    level,
                    poly: read_polynomial(r)?,
                });
            }
            ArgumentData::Plaintexts(pts)
        }
        ArgumentType::RelinKey => ArgumentData::RelinKey(read_key_switch_key(r)?),
        ArgumentType::GaloisKey => {
            let key_count = read_count(r, "key count")?;
            let mut galois_elements = Vec::with_capacity(key_count.min(MAX_PREALLOC));
            for _ in 0..key_count {
                galois_elements.push(r.read_u64::<LittleEndian>().map_err(wire_err)?);
            }
            let key_switch_keys = (0..key_count)
                .map(|_| read_key_switch_key(r))
                .collect::<Result<Vec<_>>>()?;
            ArgumentData::GaloisKey(ExportedGaloisKey {
                galois_elements,
                key_switch_keys,
            })
        }
    };

    Ok(Argument {
        id,
        count,
        level,
        data,
    })
}

/// Read a length-prefixed list of arguments
pub fn read_arguments<R: Read>(r: &mut R) -> Result<Vec<Argument>> {
    let n = r.read_u32::<LittleEndian>().map_err(wire_err)? as usize;
    (0..n).map(|_| read_argument(r)).collect()
}

/// Decode a buffer produced by [`encode_arguments`]
///
/// # Errors
///
/// [`AccError::Wire`] on truncated input, an unknown type tag or trailing bytes.
pub fn decode_arguments(bytes: &[u8]) -> Result<Vec<Argument>> {
    let mut cursor = io::Cursor::new(bytes);
    let args = read_arguments(&mut cursor)?;
    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(AccError::Wire(format!(
            "{} trailing bytes",
            bytes.len() - consumed
        )));
    }
    Ok(args)
}
