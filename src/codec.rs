//! Binary codec for persisted motion tracks.
//!
//! Self-contained: pure byte transform, no I/O.
//!
//! Layout (little-endian):
//!   magic        [u8;4]  = b"RTRK"
//!   version      u8      = 1
//!   sample_count u32
//!   joint_count  u16
//!   samples      sample_count x (root 16xf32 + joint_count x 16xf32)
//!
//! Matrices are written as 16 IEEE-754 single-precision floats in row-major
//! order. Float bits pass through untouched, so decode reconstructs
//! bit-equivalent matrices.

use crate::pose::{MotionTrack, PoseSample};
use bytes::{Buf, BufMut, BytesMut};
use nalgebra::Matrix4;
use thiserror::Error;

pub const MAGIC: [u8; 4] = *b"RTRK";
pub const VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + 4 + 2;
const MATRIX_LEN: usize = 16 * 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("track has no samples")]
    EmptyTrack,
    #[error("sample {sample} has {found} joints, expected {expected}")]
    JointCountMismatch {
        sample: usize,
        expected: usize,
        found: usize,
    },
    #[error("joint count {0} exceeds format limit")]
    TooManyJoints(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("byte stream truncated")]
    Truncated,
    #[error("{0} trailing bytes after last sample")]
    TrailingBytes(usize),
    #[error("malformed data: {0}")]
    Malformed(String),
}

/// Encode a track to its durable byte representation.
///
/// Deterministic: the same track always yields byte-identical output.
pub fn encode(track: &MotionTrack) -> Result<Vec<u8>, EncodeError> {
    let first = track.samples.first().ok_or(EncodeError::EmptyTrack)?;
    let joint_count = first.joint_count();
    if joint_count > u16::MAX as usize {
        return Err(EncodeError::TooManyJoints(joint_count));
    }
    for (i, sample) in track.samples.iter().enumerate() {
        if sample.joint_count() != joint_count {
            return Err(EncodeError::JointCountMismatch {
                sample: i,
                expected: joint_count,
                found: sample.joint_count(),
            });
        }
    }

    let sample_len = (1 + joint_count) * MATRIX_LEN;
    let mut buf = BytesMut::with_capacity(HEADER_LEN + track.samples.len() * sample_len);
    buf.put_slice(&MAGIC);
    buf.put_u8(VERSION);
    buf.put_u32_le(track.samples.len() as u32);
    buf.put_u16_le(joint_count as u16);
    for sample in &track.samples {
        put_matrix(&mut buf, &sample.root_transform);
        for joint in &sample.joint_transforms {
            put_matrix(&mut buf, joint);
        }
    }
    Ok(buf.to_vec())
}

/// Decode a byte stream produced by [`encode`].
pub fn decode(mut bytes: &[u8]) -> Result<MotionTrack, DecodeError> {
    if bytes.remaining() < HEADER_LEN {
        return Err(DecodeError::Truncated);
    }
    let mut magic = [0u8; 4];
    bytes.copy_to_slice(&mut magic);
    if magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = bytes.get_u8();
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let sample_count = bytes.get_u32_le() as usize;
    let joint_count = bytes.get_u16_le() as usize;
    if sample_count == 0 {
        return Err(DecodeError::Malformed("track has zero samples".to_string()));
    }

    let expected = sample_count * (1 + joint_count) * MATRIX_LEN;
    if bytes.remaining() < expected {
        return Err(DecodeError::Truncated);
    }
    if bytes.remaining() > expected {
        return Err(DecodeError::TrailingBytes(bytes.remaining() - expected));
    }

    let mut samples = Vec::with_capacity(sample_count);
    for _ in 0..sample_count {
        let root_transform = get_matrix(&mut bytes);
        let mut joint_transforms = Vec::with_capacity(joint_count);
        for _ in 0..joint_count {
            joint_transforms.push(get_matrix(&mut bytes));
        }
        samples.push(PoseSample::new(root_transform, joint_transforms));
    }
    Ok(MotionTrack::from_samples(samples))
}

fn put_matrix(buf: &mut BytesMut, m: &Matrix4<f32>) {
    for r in 0..4 {
        for c in 0..4 {
            buf.put_f32_le(m[(r, c)]);
        }
    }
}

fn get_matrix(bytes: &mut &[u8]) -> Matrix4<f32> {
    let mut vals = [0f32; 16];
    for v in vals.iter_mut() {
        *v = bytes.get_f32_le();
    }
    Matrix4::from_row_slice(&vals)
}
