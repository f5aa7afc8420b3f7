//! セッションストア
//!
//! ルートのトラックとワールドマップをアプリ専用ディレクトリに永続化する。
//! ファイル配置:
//!   positions_<i>  トラック本体（バイナリコーデック、ルート + 関節）
//!   limbs_<i>      関節変換のテキストコンパニオン
//!   map.worldmap   ワールドマップの単一スロット（atomic replace）

use crate::codec::{self, DecodeError, EncodeError};
use crate::config::StorageConfig;
use crate::limbs;
use crate::pose::MotionTrack;
use nalgebra::Matrix4;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAP_FILENAME: &str = "map.worldmap";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("no track at index {0}")]
    NotFound(usize),
    #[error("track {index} corrupt: {source}")]
    Corrupt { index: usize, source: DecodeError },
    #[error("track {0} already exists")]
    AlreadyExists(usize),
    #[error("no spatial map saved")]
    MapNotFound,
}

/// 環境マッピング状態のスナップショット
///
/// 中身はトラッキングバックエンドが吐く不透明なバイト列。
/// 再生時に記録時と同じワールド座標系へ再ローカライズするために使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialMapSnapshot {
    pub data: Vec<u8>,
}

impl SpatialMapSnapshot {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// ディレクトリを開く（無ければ作成）
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        Self::open(&config.data_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn track_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("positions_{}", index))
    }

    fn limbs_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("limbs_{}", index))
    }

    fn map_path(&self) -> PathBuf {
        self.dir.join(MAP_FILENAME)
    }

    /// 一時ファイルへ書いてから rename（部分書き込みを外に見せない）
    fn write_atomic(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)
    }

    /// トラックを index 番に保存する
    ///
    /// 既存 index への書き込みは上書きせずエラーにする。
    /// 空トラックは永続化しない（コーデックが EmptyTrack で拒否する）。
    pub fn write_track(&self, index: usize, track: &MotionTrack) -> Result<(), StoreError> {
        let path = self.track_path(index);
        if path.exists() {
            return Err(StoreError::AlreadyExists(index));
        }
        let bytes = codec::encode(track)?;
        let joints: Vec<Vec<Matrix4<f32>>> = track
            .samples
            .iter()
            .map(|s| s.joint_transforms.clone())
            .collect();
        let limbs_text = limbs::encode_limbs(&joints)?;

        self.write_atomic(&path, &bytes)?;
        self.write_atomic(&self.limbs_path(index), limbs_text.as_bytes())?;
        log::info!("track {} saved ({} samples)", index, track.len());
        Ok(())
    }

    /// 最初の空き index を探して保存し、その index を返す
    pub fn append_track(&self, track: &MotionTrack) -> Result<usize, StoreError> {
        let mut index = 0;
        while self.track_path(index).exists() {
            index += 1;
        }
        self.write_track(index, track)?;
        Ok(index)
    }

    pub fn read_track(&self, index: usize) -> Result<MotionTrack, StoreError> {
        let path = self.track_path(index);
        if !path.exists() {
            return Err(StoreError::NotFound(index));
        }
        let bytes = fs::read(&path)?;
        codec::decode(&bytes).map_err(|source| StoreError::Corrupt { index, source })
    }

    /// テキストコンパニオンから関節変換列を読む
    pub fn read_limbs(&self, index: usize) -> Result<Vec<Vec<Matrix4<f32>>>, StoreError> {
        let path = self.limbs_path(index);
        if !path.exists() {
            return Err(StoreError::NotFound(index));
        }
        let text = fs::read_to_string(&path)?;
        limbs::decode_limbs(&text).map_err(|source| StoreError::Corrupt { index, source })
    }

    /// 0 から連番で存在するトラック index の列を返す
    ///
    /// 最初の欠番で走査を打ち切る。欠番より後ろに保存されたトラックは
    /// 見えなくなる（意図的な仕様。マニフェストは持たない）。
    pub fn list_available_indices(&self) -> Vec<usize> {
        let mut indices = Vec::new();
        let mut index = 0;
        while self.track_path(index).exists() {
            indices.push(index);
            index += 1;
        }
        indices
    }

    /// ワールドマップを保存する（既存スロットを atomic replace）
    pub fn write_spatial_map(&self, snapshot: &SpatialMapSnapshot) -> Result<(), StoreError> {
        self.write_atomic(&self.map_path(), &snapshot.data)?;
        log::info!("spatial map saved ({} bytes)", snapshot.data.len());
        Ok(())
    }

    pub fn read_spatial_map(&self) -> Result<SpatialMapSnapshot, StoreError> {
        let path = self.map_path();
        if !path.exists() {
            return Err(StoreError::MapNotFound);
        }
        Ok(SpatialMapSnapshot::new(fs::read(&path)?))
    }

    pub fn has_spatial_map(&self) -> bool {
        self.map_path().exists()
    }
}
