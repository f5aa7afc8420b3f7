//! 関節変換のテキスト表現（`limbs_<i>` コンパニオンファイル）
//!
//! バイナリコーデックとは別系統の、人間が diff できる副次エンコーディング。
//! 1行 = 1サンプル。各関節は row-major の16値、フィールドはカンマ区切り。
//! Rust の f32 Display は最短round-trip表現なので、テキスト経由でも値は
//! ビット単位で復元される。

use crate::codec::{DecodeError, EncodeError};
use nalgebra::Matrix4;
use std::fmt::Write;

/// サンプルごとの関節変換列をテキストへ変換する
pub fn encode_limbs(joints: &[Vec<Matrix4<f32>>]) -> Result<String, EncodeError> {
    let first = joints.first().ok_or(EncodeError::EmptyTrack)?;
    let joint_count = first.len();
    for (i, sample) in joints.iter().enumerate() {
        if sample.len() != joint_count {
            return Err(EncodeError::JointCountMismatch {
                sample: i,
                expected: joint_count,
                found: sample.len(),
            });
        }
    }

    let mut out = String::new();
    for sample in joints {
        let mut first_field = true;
        for m in sample {
            for r in 0..4 {
                for c in 0..4 {
                    if !first_field {
                        out.push(',');
                    }
                    first_field = false;
                    // String への書き込みは失敗しない
                    let _ = write!(out, "{}", m[(r, c)]);
                }
            }
        }
        out.push('\n');
    }
    Ok(out)
}

/// テキストからサンプルごとの関節変換列を復元する
pub fn decode_limbs(text: &str) -> Result<Vec<Vec<Matrix4<f32>>>, DecodeError> {
    let mut samples = Vec::new();
    let mut joint_count: Option<usize> = None;

    for (line_no, line) in text.lines().enumerate() {
        let fields: Vec<&str> = if line.is_empty() {
            Vec::new()
        } else {
            line.split(',').collect()
        };
        if fields.len() % 16 != 0 {
            return Err(DecodeError::Malformed(format!(
                "line {}: {} fields, not a multiple of 16",
                line_no,
                fields.len()
            )));
        }
        let count = fields.len() / 16;
        match joint_count {
            None => joint_count = Some(count),
            Some(expected) if expected != count => {
                return Err(DecodeError::Malformed(format!(
                    "line {}: {} joints, expected {}",
                    line_no, count, expected
                )));
            }
            Some(_) => {}
        }

        let mut joints = Vec::with_capacity(count);
        for chunk in fields.chunks(16) {
            let mut vals = [0f32; 16];
            for (v, field) in vals.iter_mut().zip(chunk) {
                *v = field.parse::<f32>().map_err(|e| {
                    DecodeError::Malformed(format!("line {}: bad float {:?}: {}", line_no, field, e))
                })?;
            }
            joints.push(Matrix4::from_row_slice(&vals));
        }
        samples.push(joints);
    }

    if samples.is_empty() {
        return Err(DecodeError::Malformed("no samples".to_string()));
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn joints(seed: f32, count: usize) -> Vec<Matrix4<f32>> {
        (0..count)
            .map(|j| Matrix4::new_translation(&Vector3::new(seed, j as f32 * 0.25, -seed)))
            .collect()
    }

    #[test]
    fn test_round_trip() {
        let samples = vec![joints(0.1, 3), joints(1.7, 3)];
        let text = encode_limbs(&samples).unwrap();
        assert_eq!(decode_limbs(&text).unwrap(), samples);
    }

    #[test]
    fn test_one_line_per_sample() {
        let samples = vec![joints(0.0, 2), joints(1.0, 2), joints(2.0, 2)];
        let text = encode_limbs(&samples).unwrap();
        assert_eq!(text.lines().count(), 3);
        // 1行 = 16 * joint_count フィールド
        assert_eq!(text.lines().next().unwrap().split(',').count(), 32);
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_limbs(&[]), Err(EncodeError::EmptyTrack));
    }

    #[test]
    fn test_encode_ragged() {
        let samples = vec![joints(0.0, 2), joints(1.0, 3)];
        assert!(matches!(
            encode_limbs(&samples),
            Err(EncodeError::JointCountMismatch { sample: 1, .. })
        ));
    }

    #[test]
    fn test_decode_bad_float() {
        let text = "1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,abc\n";
        assert!(matches!(decode_limbs(text), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_wrong_field_count() {
        let text = "1,2,3\n";
        assert!(matches!(decode_limbs(text), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_decode_ragged_lines() {
        let one = joints(0.0, 1);
        let two = joints(0.0, 2);
        let text = format!(
            "{}{}",
            encode_limbs(&[one]).unwrap(),
            encode_limbs(&[two]).unwrap()
        );
        assert!(matches!(decode_limbs(&text), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_row_major_field_order() {
        let mut m = Matrix4::identity();
        m[(0, 1)] = 9.0;
        let text = encode_limbs(&[vec![m]]).unwrap();
        let fields: Vec<&str> = text.trim_end().split(',').collect();
        assert_eq!(fields[0], "1"); // m00
        assert_eq!(fields[1], "9"); // m01
        assert_eq!(fields[5], "1"); // m11
    }
}
