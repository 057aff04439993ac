//! Compact binary codec for calibration snapshots.
//!
//! Layout (big-endian): magic `RTCS`, version `u8`, limb count `u8`, then the
//! limb entries followed by the hips-twist, spine, chest and head entries.
//! Each entry is a bone index `u8`, three direction floats and four rotation
//! floats (`x, y, z, w`).

use crate::{CalibrationSnapshot, Error, HumanBone, SnapshotEntry};
use byteorder::{BigEndian, ByteOrder};

const MAGIC: &[u8; 4] = b"RTCS";
const VERSION: u8 = 1;
const ENTRY_LEN: usize = 1 + 7 * 4;

struct BinaryInput<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BinaryInput<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.cursor)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::BinaryParse {
                message: format!(
                    "unexpected EOF at offset {} (wanted {len} bytes)",
                    self.cursor
                ),
            });
        }
        let slice = &self.bytes[self.cursor..self.cursor + len];
        self.cursor += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn read_f32_be(&mut self) -> Result<f32, Error> {
        let v = BigEndian::read_f32(self.take(4)?);
        if !v.is_finite() {
            return Err(Error::BinaryParse {
                message: format!("non-finite float at offset {}", self.cursor - 4),
            });
        }
        Ok(v)
    }

    fn read_entry(&mut self) -> Result<SnapshotEntry, Error> {
        let index = self.read_u8()?;
        let bone = HumanBone::from_index(index as usize).ok_or(Error::BinaryParse {
            message: format!("invalid bone index {index}"),
        })?;
        let mut direction = [0.0f32; 3];
        for v in &mut direction {
            *v = self.read_f32_be()?;
        }
        let mut rotation = [0.0f32; 4];
        for v in &mut rotation {
            *v = self.read_f32_be()?;
        }
        Ok(SnapshotEntry {
            bone,
            direction,
            rotation,
        })
    }
}

fn write_entry(out: &mut Vec<u8>, entry: &SnapshotEntry) {
    let mut buf = [0u8; 4];
    out.push(entry.bone.index() as u8);
    for v in entry.direction.iter().chain(entry.rotation.iter()) {
        BigEndian::write_f32(&mut buf, *v);
        out.extend_from_slice(&buf);
    }
}

impl CalibrationSnapshot {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut input = BinaryInput::new(bytes);

        if input.take(MAGIC.len())? != MAGIC {
            return Err(Error::BinaryParse {
                message: "missing snapshot magic".to_string(),
            });
        }
        let version = input.read_u8()?;
        if version != VERSION {
            return Err(Error::BinaryVersion { version });
        }

        let limb_count = input.read_u8()? as usize;
        let mut limbs = Vec::with_capacity(limb_count);
        for _ in 0..limb_count {
            limbs.push(input.read_entry()?);
        }
        let hips_twist = input.read_entry()?;
        let spine_up_down = input.read_entry()?;
        let chest = input.read_entry()?;
        let head = input.read_entry()?;

        if input.remaining() != 0 {
            return Err(Error::BinaryParse {
                message: format!("{} trailing bytes", input.remaining()),
            });
        }

        Ok(Self {
            limbs,
            hips_twist,
            spine_up_down,
            chest,
            head,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let limb_count = u8::try_from(self.limbs.len()).map_err(|_| Error::InvalidValue {
            message: format!("too many limb entries: {}", self.limbs.len()),
        })?;

        let mut out = Vec::with_capacity(MAGIC.len() + 2 + (self.limbs.len() + 4) * ENTRY_LEN);
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.push(limb_count);
        for entry in &self.limbs {
            write_entry(&mut out, entry);
        }
        for entry in [&self.hips_twist, &self.spine_up_down, &self.chest, &self.head] {
            write_entry(&mut out, entry);
        }
        Ok(out)
    }
}
