use std::io::{self, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use marcher::config::{validate_config, IncomingConfig, RenderFrameConfig};
use marcher::render::render_frame;
use marcher::state::{ParamStore, SceneSlot};
use marcher::watcher::SceneWatcher;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;

    let incoming: IncomingConfig = serde_json::from_str(&raw)?;
    let jobs = match incoming {
        IncomingConfig::Single(frame) => vec![frame],
        IncomingConfig::Batch(batch) => batch.frames,
    };
    if jobs.is_empty() {
        return Err("frames array must not be empty".into());
    }
    for job in &jobs {
        validate_config(job)?;
    }

    let total = jobs.len();
    for (index, job) in jobs.iter().enumerate() {
        tracing::info!("[{}/{}] rendering {} frame(s)", index + 1, total, job.frame_count);
        run_job(job)?;
    }

    Ok(())
}

fn run_job(job: &RenderFrameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let source = job.scene_source()?;
    let slot = SceneSlot::new(source.build(job.model_directory())?);
    let params = ParamStore::new(job.frame_params(0.0));

    let watcher = match (&job.scene_file, job.watch) {
        (Some(scene_file), true) => {
            match SceneWatcher::start(Path::new(scene_file), job.model_directory()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    tracing::error!("Failed to start scene watcher: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    let started = Instant::now();
    let mut window_start = Instant::now();
    let mut window_frames = 0u32;

    for frame in 0..job.frame_count {
        if let Some(watcher) = &watcher {
            watcher.apply_pending(&slot);
        }
        params.publish(job.frame_params(frame as f32 * job.frame_interval));

        // Both handles stay fixed for the whole dispatch, whatever happens to the slot.
        let snapshot = params.snapshot();
        let field = slot.current();

        let frame_started = Instant::now();
        let image = render_frame(field.as_ref(), &snapshot.params);
        let output = job.output_path_for(frame);
        image.save(&output)?;

        tracing::debug!(
            frame,
            version = snapshot.version,
            scene = field.name(),
            elapsed_ms = millis(frame_started.elapsed()),
            "rendered {}",
            output.display()
        );

        window_frames += 1;
        let window = window_start.elapsed().as_secs_f32();
        if window >= 1.0 || frame + 1 == job.frame_count {
            tracing::info!(
                "{:.2} FPS | {:.2} MS",
                window_frames as f32 / window.max(f32::EPSILON),
                (window / window_frames as f32) * 1000.0
            );
            window_start = Instant::now();
            window_frames = 0;
        }
    }

    tracing::info!(
        "Rendered {} frame(s) of '{}' in {:.2} ms",
        job.frame_count,
        slot.current().name(),
        millis(started.elapsed())
    );
    Ok(())
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
