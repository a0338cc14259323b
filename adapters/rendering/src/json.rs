//! Line-delimited JSON backend for machine consumption.

use std::{io::Write, time::Duration};

use anyhow::{Context, Result as AnyResult};
use serde::Serialize;

use crate::{FrameControl, Presentation, RenderingBackend, Scene};

/// Backend that writes one JSON object per changed frame.
#[derive(Debug)]
pub struct JsonBackend<W> {
    out: W,
    frame_dt: Duration,
    max_frames: u64,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    title: &'a str,
    frame: u64,
    scene: &'a Scene,
}

impl<W: Write> JsonBackend<W> {
    /// Creates a backend stepping `frame_dt` per frame for at most `max_frames` frames.
    pub fn new(out: W, frame_dt: Duration, max_frames: u64) -> Self {
        Self {
            out,
            frame_dt,
            max_frames,
        }
    }
}

impl<W: Write> RenderingBackend for JsonBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) -> AnyResult<FrameControl>,
    {
        let Presentation { title, mut scene } = presentation;
        let mut last_scene: Option<Scene> = None;

        for frame in 0..self.max_frames {
            let control = update_scene(self.frame_dt, &mut scene)?;
            if last_scene.as_ref() != Some(&scene) {
                let record = FrameRecord {
                    title: &title,
                    frame,
                    scene: &scene,
                };
                serde_json::to_writer(&mut self.out, &record)
                    .with_context(|| format!("failed to serialise frame {frame}"))?;
                writeln!(self.out).context("failed to terminate frame record")?;
                last_scene = Some(scene.clone());
            }
            if control == FrameControl::Exit {
                break;
            }
        }

        self.out.flush().context("failed to flush json output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridProjection;

    #[test]
    fn writes_one_record_per_changed_frame() {
        let mut buffer = Vec::new();
        let scene = Scene::new(GridProjection::new(2, 2, 8.0).expect("valid projection"));
        let backend = JsonBackend::new(&mut buffer, Duration::from_millis(16), 4);
        backend
            .run(Presentation::new("crawl", scene), |_, scene| {
                scene.hud.turn += 1;
                Ok(FrameControl::Continue)
            })
            .expect("writing to a vector succeeds");

        let output = String::from_utf8(buffer).expect("utf-8 output");
        let records: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json"))
            .collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3]["frame"], 3);
        assert_eq!(records[3]["scene"]["hud"]["turn"], 4);
        assert_eq!(records[0]["title"], "crawl");
    }
}
