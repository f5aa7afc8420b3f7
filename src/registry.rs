//! ルートレジストリ
//!
//! 起動時にストアを走査して、ルート id → トラックの対応をメモリに持つ。
//! id は読み込み順 (0..N-1)。セッション中は更新しない。

use crate::pose::MotionTrack;
use crate::store::{SessionStore, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// いずれかのトラックが読めなかった。読み込み全体を中断する
    /// （部分成功にしない）。閲覧機能だけが使えなくなり、プロセスは落とさない。
    #[error("failed to load track {index}: {source}")]
    LoadFailed { index: usize, source: StoreError },
    #[error("no route with id {0}")]
    NotFound(usize),
}

#[derive(Debug)]
pub struct RouteRegistry {
    routes: Vec<MotionTrack>,
}

impl RouteRegistry {
    /// ストアの連番トラックを全て読み込む
    ///
    /// 1本でもデコードに失敗したら fail-fast で全体を中断する。
    pub fn load(store: &SessionStore) -> Result<Self, RegistryError> {
        let indices = store.list_available_indices();
        let mut routes = Vec::with_capacity(indices.len());
        for index in indices {
            let track = store
                .read_track(index)
                .map_err(|source| RegistryError::LoadFailed { index, source })?;
            routes.push(track);
        }
        log::info!("{} routes loaded", routes.len());
        Ok(Self { routes })
    }

    pub fn get(&self, id: usize) -> Result<&MotionTrack, RegistryError> {
        self.routes.get(id).ok_or(RegistryError::NotFound(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> {
        0..self.routes.len()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PoseSample;
    use nalgebra::{Matrix4, Vector3};
    use std::fs;
    use tempfile::tempdir;

    fn track(samples: usize, joints: usize) -> MotionTrack {
        MotionTrack::from_samples(
            (0..samples)
                .map(|i| {
                    PoseSample::new(
                        Matrix4::new_translation(&Vector3::new(i as f32, 0.0, 0.0)),
                        vec![Matrix4::identity(); joints],
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_load_two_tracks() {
        // index 0, 1 に3サンプル・4関節のトラック → 2エントリ
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.write_track(0, &track(3, 4)).unwrap();
        store.write_track(1, &track(3, 4)).unwrap();

        let registry = RouteRegistry::load(&store).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(0).unwrap().len(), 3);
        assert_eq!(registry.get(1).unwrap().len(), 3);
    }

    #[test]
    fn test_load_empty_store() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let registry = RouteRegistry::load(&store).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_stops_at_gap() {
        // 欠番の後ろのトラックはレジストリに載らない
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.write_track(0, &track(1, 1)).unwrap();
        store.write_track(2, &track(1, 1)).unwrap();

        let registry = RouteRegistry::load(&store).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_load_fails_fast_on_corrupt_track() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store.write_track(0, &track(1, 1)).unwrap();
        fs::write(dir.path().join("positions_1"), b"garbage").unwrap();

        let err = RouteRegistry::load(&store).unwrap_err();
        assert!(matches!(err, RegistryError::LoadFailed { index: 1, .. }));
    }

    #[test]
    fn test_get_unknown_id() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let registry = RouteRegistry::load(&store).unwrap();
        assert!(matches!(registry.get(0), Err(RegistryError::NotFound(0))));
    }
}
