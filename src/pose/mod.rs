pub mod sample;
pub mod track;

pub use sample::PoseSample;
pub use track::MotionTrack;
