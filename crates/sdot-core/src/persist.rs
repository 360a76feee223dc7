//! Persisted solver state: `{ψ, seeds, domain vertices}` as a simple binary
//! blob. Hand-rolled byte I/O (not `serde`) since the format is a fixed,
//! illustrative on-disk layout rather than a general serialization surface.
//!
//! Layout: magic `b"SDOT"`, `version: u32` little-endian, then three
//! length-prefixed `f64` arrays in order: ψ, flattened seed coordinates,
//! flattened domain vertex coordinates.

use std::io::{Read, Write};

use crate::error::{SdotError, SdotResult};

const MAGIC: &[u8; 4] = b"SDOT";
const VERSION: u32 = 1;

/// The subset of solver state persisted to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedState {
    pub psi: Vec<f64>,
    pub seeds: Vec<[f64; 2]>,
    pub domain_vertices: Vec<[f64; 2]>,
}

impl PersistedState {
    pub fn write<W: Write>(&self, mut w: W) -> SdotResult<()> {
        w.write_all(MAGIC)?;
        w.write_all(&VERSION.to_le_bytes())?;
        write_f64_array(&mut w, &self.psi)?;
        write_f64_array(&mut w, &flatten(&self.seeds))?;
        write_f64_array(&mut w, &flatten(&self.domain_vertices))?;
        Ok(())
    }

    pub fn read<R: Read>(mut r: R) -> SdotResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SdotError::InputInvalid(
                "not an SDOT persisted-state file (bad magic)".into(),
            ));
        }
        let mut version_bytes = [0u8; 4];
        r.read_exact(&mut version_bytes)?;
        let version = u32::from_le_bytes(version_bytes);
        if version != VERSION {
            return Err(SdotError::InputInvalid(format!(
                "unsupported persisted-state version {version}"
            )));
        }
        let psi = read_f64_array(&mut r)?;
        let seeds = unflatten(&read_f64_array(&mut r)?)?;
        let domain_vertices = unflatten(&read_f64_array(&mut r)?)?;
        Ok(Self {
            psi,
            seeds,
            domain_vertices,
        })
    }
}

fn write_f64_array<W: Write>(w: &mut W, values: &[f64]) -> SdotResult<()> {
    let len = values.len() as u64;
    w.write_all(&len.to_le_bytes())?;
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_f64_array<R: Read>(r: &mut R) -> SdotResult<Vec<f64>> {
    let mut len_bytes = [0u8; 8];
    r.read_exact(&mut len_bytes)?;
    let len = u64::from_le_bytes(len_bytes) as usize;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf)?;
        values.push(f64::from_le_bytes(buf));
    }
    Ok(values)
}

fn flatten(points: &[[f64; 2]]) -> Vec<f64> {
    points.iter().flat_map(|p| [p[0], p[1]]).collect()
}

fn unflatten(values: &[f64]) -> SdotResult<Vec<[f64; 2]>> {
    if values.len() % 2 != 0 {
        return Err(SdotError::InputInvalid(
            "point array has an odd number of f64 values".into(),
        ));
    }
    Ok(values.chunks_exact(2).map(|c| [c[0], c[1]]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let state = PersistedState {
            psi: vec![0.1, -0.2, 0.3],
            seeds: vec![[0.25, 0.5], [0.75, 0.5]],
            domain_vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        };
        let mut buf = Vec::new();
        state.write(&mut buf).unwrap();
        let read_back = PersistedState::read(buf.as_slice()).unwrap();
        assert_eq!(state, read_back);
    }

    #[test]
    fn test_round_trip_via_tempfile() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let state = PersistedState {
            psi: vec![1.0, 2.0],
            seeds: vec![[0.0, 0.0], [1.0, 1.0]],
            domain_vertices: vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]],
        };
        state.write(file.reopen().unwrap()).unwrap();
        let read_back = PersistedState::read(file.reopen().unwrap()).unwrap();
        assert_eq!(state, read_back);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let err = PersistedState::read(b"NOPE".as_slice());
        assert!(matches!(err, Err(SdotError::InputInvalid(_))));
    }

    #[test]
    fn test_rejects_unsupported_version() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&99u32.to_le_bytes());
        let err = PersistedState::read(buf.as_slice());
        assert!(matches!(err, Err(SdotError::InputInvalid(_))));
    }
}
