use nalgebra::{Matrix4, Vector3};

/// 1フレーム分の骨格観測
///
/// トラッキングフィードが届ける瞬間の姿勢。ルートの剛体変換と、
/// 骨格トポロジー順に並んだ関節ローカル変換で構成される。
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    /// ワールド座標系におけるボディルートの変換
    pub root_transform: Matrix4<f32>,
    /// ルート相対の関節ローカル変換（順序は骨格トポロジーで固定）
    pub joint_transforms: Vec<Matrix4<f32>>,
}

impl PoseSample {
    pub fn new(root_transform: Matrix4<f32>, joint_transforms: Vec<Matrix4<f32>>) -> Self {
        Self {
            root_transform,
            joint_transforms,
        }
    }

    /// ルート変換の平行移動成分（ワールド位置）
    pub fn root_position(&self) -> Vector3<f32> {
        Vector3::new(
            self.root_transform[(0, 3)],
            self.root_transform[(1, 3)],
            self.root_transform[(2, 3)],
        )
    }

    pub fn joint_count(&self) -> usize {
        self.joint_transforms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    #[test]
    fn test_root_position_from_translation() {
        let sample = PoseSample::new(translation(1.0, 2.5, -3.0), vec![]);
        assert_eq!(sample.root_position(), Vector3::new(1.0, 2.5, -3.0));
    }

    #[test]
    fn test_joint_count() {
        let sample = PoseSample::new(Matrix4::identity(), vec![Matrix4::identity(); 4]);
        assert_eq!(sample.joint_count(), 4);
    }
}
