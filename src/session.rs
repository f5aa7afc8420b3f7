//! キャプチャセッションの状態機械
//!
//! Idle / Recording / Playing を単一の権威で管理する。
//! 録画と再生は排他で、無効な遷移は黙って横取りせずエラーにする。
//! トラッキングフィードは1フレームずつ順に届き、処理は同期・単一タイムライン
//! なのでロックは持たない。

use crate::pose::{MotionTrack, PoseSample};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Playing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Recording => write!(f, "Recording"),
            SessionState::Playing => write!(f, "Playing"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 録画中にトラッキングが途切れた。バッファは保持されたままで、
    /// 部分トラックとして保存するかは呼び出し側が決める。
    #[error("tracking lost while recording")]
    TrackingLost,
    #[error("invalid transition: {requested} while {from}")]
    InvalidTransition {
        from: SessionState,
        requested: &'static str,
    },
}

/// 再生側のレンダリング協調先（シーングラフ等）への受け渡し口
pub trait PoseSink {
    fn apply_pose(&mut self, sample: &PoseSample);
}

struct Playback {
    track: MotionTrack,
    cursor: usize,
}

pub struct CaptureSession {
    state: SessionState,
    buffer: Vec<PoseSample>,
    playback: Option<Playback>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            buffer: Vec::new(),
            playback: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 録画中に積まれたサンプル数
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Idle → Recording。バッファをクリアして録画を始める
    pub fn start_recording(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                requested: "start_recording",
            });
        }
        self.buffer.clear();
        self.state = SessionState::Recording;
        log::debug!("recording started");
        Ok(())
    }

    /// トラッキングフィードのフレームイベント
    ///
    /// Recording: バッファへ追加しつつ sink へ転送（録画中もライブ表示を続ける）。
    /// Idle: sink への転送のみ（ライブプレビュー）。
    /// Playing: 無視（再生中のライブ骨格は適用しない）。
    /// トラック状態を変化させるのは Recording だけ。
    pub fn on_body_frame(&mut self, sample: PoseSample, sink: &mut dyn PoseSink) {
        match self.state {
            SessionState::Recording => {
                sink.apply_pose(&sample);
                self.buffer.push(sample);
            }
            SessionState::Idle => sink.apply_pose(&sample),
            SessionState::Playing => {}
        }
    }

    /// 録画中のトラッキング喪失イベント
    ///
    /// エラーとして呼び出し側へ返すが、集めたバッファは捨てない。
    pub fn on_tracking_lost(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Recording => {
                log::warn!("tracking lost, {} samples buffered", self.buffer.len());
                Err(SessionError::TrackingLost)
            }
            _ => Ok(()),
        }
    }

    /// Recording → Idle。バッファが空ならトラックは生成しない
    pub fn stop_recording(&mut self) -> Result<Option<MotionTrack>, SessionError> {
        if self.state != SessionState::Recording {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                requested: "stop_recording",
            });
        }
        self.state = SessionState::Idle;
        if self.buffer.is_empty() {
            log::debug!("recording stopped, no samples");
            return Ok(None);
        }
        let samples = std::mem::take(&mut self.buffer);
        log::debug!("recording stopped, {} samples", samples.len());
        Ok(Some(MotionTrack::from_samples(samples)))
    }

    /// Idle → Playing。カーソルを先頭に置く
    pub fn start_playback(&mut self, track: MotionTrack) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                requested: "start_playback",
            });
        }
        self.playback = Some(Playback { track, cursor: 0 });
        self.state = SessionState::Playing;
        log::debug!("playback started");
        Ok(())
    }

    /// 再生フレーム: 現在のサンプルを sink へ適用し、カーソルを進める
    ///
    /// 末尾に達したらカーソルは 0 へ戻り、外から止められるまでループし続ける。
    pub fn tick_playback(&mut self, sink: &mut dyn PoseSink) -> Result<(), SessionError> {
        let playback = match (self.state, self.playback.as_mut()) {
            (SessionState::Playing, Some(p)) => p,
            _ => {
                return Err(SessionError::InvalidTransition {
                    from: self.state,
                    requested: "tick_playback",
                })
            }
        };
        if playback.track.is_empty() {
            return Ok(());
        }
        sink.apply_pose(&playback.track.samples[playback.cursor]);
        playback.cursor = (playback.cursor + 1) % playback.track.len();
        Ok(())
    }

    /// Playing → Idle。カーソルは破棄し、トラックの所有権を返す
    pub fn stop_playback(&mut self) -> Result<MotionTrack, SessionError> {
        if self.state != SessionState::Playing {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                requested: "stop_playback",
            });
        }
        self.state = SessionState::Idle;
        // Playing のときは必ず Some
        let playback = self.playback.take().ok_or(SessionError::InvalidTransition {
            from: SessionState::Playing,
            requested: "stop_playback",
        })?;
        log::debug!("playback stopped");
        Ok(playback.track)
    }
}
