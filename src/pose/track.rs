use crate::pose::PoseSample;
use nalgebra::Vector3;

/// 記録された1本のルート（モーショントラック）
///
/// 挿入順 = 記録順 = 再生順。永続化の最小単位であり、
/// 保存後は不変として扱う。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionTrack {
    pub samples: Vec<PoseSample>,
}

impl MotionTrack {
    pub fn from_samples(samples: Vec<PoseSample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 全サンプルの関節数が一致していればその数を返す
    /// 空トラック・不揃いなら None
    pub fn uniform_joint_count(&self) -> Option<usize> {
        let first = self.samples.first()?.joint_count();
        if self.samples.iter().all(|s| s.joint_count() == first) {
            Some(first)
        } else {
            None
        }
    }

    /// ルート位置の軌跡（ルートプレビューのポリライン点列）
    pub fn root_positions(&self) -> Vec<Vector3<f32>> {
        self.samples.iter().map(|s| s.root_position()).collect()
    }

    /// 先頭サンプルのルート位置（スタート地点のウェイポイント）
    pub fn start_position(&self) -> Option<Vector3<f32>> {
        self.samples.first().map(|s| s.root_position())
    }
}
