use anyhow::{Context, Result};
use nalgebra::{Matrix4, Vector3};
use routecap::config::Config;
use routecap::pose::PoseSample;
use routecap::registry::RouteRegistry;
use routecap::session::{CaptureSession, PoseSink};
use routecap::store::SessionStore;
use std::thread;
use std::time::Duration;

const CONFIG_PATH: &str = "config.toml";

/// 合成フィードのフレーム数・関節数
const SYNTH_FRAMES: usize = 120;
const SYNTH_JOINTS: usize = 8;

/// ルート位置を行表示するだけのレンダリング協調先
struct PrintSink {
    frame: usize,
}

impl PoseSink for PrintSink {
    fn apply_pose(&mut self, sample: &PoseSample) {
        let p = sample.root_position();
        println!("frame {:4}: {:+.3} {:+.3} {:+.3}", self.frame, p.x, p.y, p.z);
        self.frame += 1;
    }
}

struct NullSink;

impl PoseSink for NullSink {
    fn apply_pose(&mut self, _sample: &PoseSample) {}
}

/// 登攀風の合成ポーズ: 横に揺れながら上昇する
fn synth_sample(i: usize) -> PoseSample {
    let t = i as f32 / 60.0;
    let root = Matrix4::new_translation(&Vector3::new((t * 0.8).sin() * 0.4, t * 0.3, 0.0));
    let joints = (0..SYNTH_JOINTS)
        .map(|j| {
            Matrix4::new_translation(&Vector3::new(
                0.0,
                0.05 * j as f32,
                (t + j as f32).sin() * 0.1,
            ))
        })
        .collect();
    PoseSample::new(root, joints)
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::load_or_default(CONFIG_PATH);
    let store = SessionStore::from_config(&config.storage)?;

    // ルートが無ければ合成フィードを録画して1本保存する
    if store.list_available_indices().is_empty() {
        println!("No stored routes, recording a synthetic ascent...");
        let mut session = CaptureSession::new();
        let mut sink = NullSink;
        session.start_recording()?;
        for i in 0..SYNTH_FRAMES {
            session.on_body_frame(synth_sample(i), &mut sink);
        }
        let track = session
            .stop_recording()?
            .context("recorder produced no track")?;
        let index = store.append_track(&track)?;
        println!("Saved synthetic route at index {}", index);
    }

    let registry = RouteRegistry::load(&store)?;
    println!("{} routes available", registry.len());

    let track = registry.get(0)?.clone();
    println!(
        "Replaying route 0 ({} samples, {} joints)",
        track.len(),
        track.uniform_joint_count().unwrap_or(0)
    );

    let frame_time = Duration::from_secs_f64(1.0 / config.playback.fps.max(1) as f64);
    let mut session = CaptureSession::new();
    let mut sink = PrintSink { frame: 0 };
    session.start_playback(track.clone())?;
    // 再生はループし続けるので、デモでは2周だけ回して止める
    for _ in 0..track.len() * 2 {
        session.tick_playback(&mut sink)?;
        thread::sleep(frame_time);
    }
    session.stop_playback()?;
    println!("done");
    Ok(())
}
