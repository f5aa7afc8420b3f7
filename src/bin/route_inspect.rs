use anyhow::{Context, Result};
use routecap::registry::RouteRegistry;
use routecap::store::SessionStore;
use std::env;

/// 保存済みルートの一覧・ダンプ
///
/// usage: route_inspect <data_dir> [index]
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let dir = args
        .next()
        .context("usage: route_inspect <data_dir> [index]")?;
    let index: Option<usize> = match args.next() {
        Some(s) => Some(s.parse().context("index must be an integer")?),
        None => None,
    };

    println!("route_inspect ({})", env!("GIT_VERSION"));
    let store = SessionStore::open(&dir)?;
    println!("data dir: {}", store.dir().display());
    println!(
        "spatial map: {}",
        if store.has_spatial_map() { "present" } else { "missing" }
    );

    let registry = RouteRegistry::load(&store)?;
    println!("{} routes", registry.len());
    for id in registry.ids() {
        let track = registry.get(id)?;
        let start = track
            .start_position()
            .map(|p| format!("({:.3}, {:.3}, {:.3})", p.x, p.y, p.z))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  route {}: {} samples, {} joints, start {}",
            id,
            track.len(),
            track.uniform_joint_count().unwrap_or(0),
            start
        );
    }

    if let Some(id) = index {
        let track = registry.get(id)?;
        println!("route {} root positions:", id);
        for (i, p) in track.root_positions().iter().enumerate() {
            println!("  {:4}: {:+.4} {:+.4} {:+.4}", i, p.x, p.y, p.z);
        }

        // テキストコンパニオンとバイナリの関節データが一致するか検証
        match store.read_limbs(id) {
            Ok(joints) => {
                let matches = joints.len() == track.len()
                    && track
                        .samples
                        .iter()
                        .zip(&joints)
                        .all(|(s, j)| &s.joint_transforms == j);
                println!("limbs companion: {}", if matches { "ok" } else { "MISMATCH" });
            }
            Err(e) => println!("limbs companion: unreadable ({})", e),
        }
    }

    Ok(())
}
