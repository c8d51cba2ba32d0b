// THEORY:
// Concurrency surfaces around the (synchronous, stateless) detector. The detector
// itself never blocks or spawns; everything here owns its frames and pushes the
// CPU work onto tokio's blocking pool so async callers stay responsive.
//
// - `detect_batch` fans a set of frames out over as many blocking tasks as there
//   are cores and hands the results back in input order.
// - `DetectionLoop` is the camera-style polling loop: after a warm-up delay it
//   repeatedly pulls a frame from a `FrameSource`, detects on it, publishes the
//   result and sleeps for the cadence. Source errors are logged and the loop keeps
//   going. Once `stop` is requested, in-flight results are thrown away. Frames
//   are handled one at a time by a single task, so published frame ids only grow.

use crate::error::{DetectorError, Result};
use crate::pipeline::{FaceBox, FaceDetector};
use async_trait::async_trait;
use futures::future::join_all;
use image::RgbaImage;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const DEFAULT_WARMUP: Duration = Duration::from_millis(1000);
const DEFAULT_CADENCE: Duration = Duration::from_millis(100);

/// An owned RGBA frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }
}

impl From<RgbaImage> for Frame {
    fn from(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }
}

/// Anything that can hand out frames to the polling loop (a camera, a file
/// sequence, a test fixture).
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Result<Frame>;
}

/// Runs detection on every frame using one blocking task per core.
/// Results are returned in the same order as `frames`.
pub async fn detect_batch(detector: &FaceDetector, frames: Vec<Frame>) -> Result<Vec<Vec<FaceBox>>> {
    let workers = num_cpus::get().max(1);
    let mut results = Vec::with_capacity(frames.len());
    let mut pending = frames.into_iter().peekable();

    while pending.peek().is_some() {
        let handles: Vec<JoinHandle<Vec<FaceBox>>> = pending
            .by_ref()
            .take(workers)
            .map(|frame| {
                let detector = detector.clone();
                tokio::task::spawn_blocking(move || detector.detect(&frame.data, frame.width, frame.height))
            })
            .collect();

        for joined in join_all(handles).await {
            results.push(joined.map_err(|e| DetectorError::WorkerFailed(e.to_string()))?);
        }
    }

    Ok(results)
}

/// Timing of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Delay before the first frame is requested, to let the source settle.
    pub warmup: Duration,
    /// Pause between the end of one detection and the next frame request.
    pub cadence: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            warmup: DEFAULT_WARMUP,
            cadence: DEFAULT_CADENCE,
        }
    }
}

/// The latest published result of the polling loop. `frame_id` 0 means no frame
/// has been processed yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionReport {
    pub frame_id: u64,
    pub faces: Vec<FaceBox>,
}

impl DetectionReport {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// A background polling loop feeding frames from a `FrameSource` to a detector.
pub struct DetectionLoop {
    shutdown: watch::Sender<bool>,
    reports: watch::Receiver<DetectionReport>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    /// Starts the loop on the current tokio runtime.
    pub fn spawn<S>(detector: FaceDetector, source: S, config: LoopConfig) -> Self
    where
        S: FrameSource + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (report_tx, reports) = watch::channel(DetectionReport::default());
        let handle = tokio::spawn(run_loop(detector, source, config, shutdown_rx, report_tx));

        Self {
            shutdown,
            reports,
            handle: Some(handle),
        }
    }

    /// A receiver that is notified on every new report.
    pub fn subscribe(&self) -> watch::Receiver<DetectionReport> {
        self.reports.clone()
    }

    pub fn latest(&self) -> DetectionReport {
        self.reports.borrow().clone()
    }

    pub fn face_count(&self) -> usize {
        self.reports.borrow().face_count()
    }

    pub fn is_running(&self) -> bool {
        !*self.shutdown.borrow() && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Waits for the next report newer than the one last seen through this handle.
    pub async fn next_report(&mut self) -> Result<DetectionReport> {
        self.reports.changed().await.map_err(|_| DetectorError::LoopStopped)?;
        Ok(self.reports.borrow_and_update().clone())
    }

    /// Requests shutdown and waits for the loop task to finish.
    pub async fn stop(mut self) -> Result<()> {
        let _ = self.shutdown.send(true);
        match self.handle.take() {
            Some(handle) => handle.await.map_err(|e| DetectorError::WorkerFailed(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        // Best effort shutdown on drop
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Sleeps for `duration`, returning false if shutdown was requested meanwhile.
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => !*shutdown.borrow(),
        _ = shutdown.changed() => false,
    }
}

async fn run_loop<S: FrameSource>(
    detector: FaceDetector,
    mut source: S,
    config: LoopConfig,
    mut shutdown: watch::Receiver<bool>,
    reports: watch::Sender<DetectionReport>,
) {
    info!("detection loop starting after {:?} warm-up", config.warmup);
    if !pause(config.warmup, &mut shutdown).await {
        info!("detection loop stopped during warm-up");
        return;
    }

    let mut frame_id = 0u64;
    loop {
        let next = tokio::select! {
            frame = source.next_frame() => Some(frame),
            _ = shutdown.changed() => None,
        };

        match next {
            None => break,
            Some(Err(e)) => warn!("frame source error, retrying: {}", e),
            Some(Ok(frame)) => {
                frame_id += 1;
                let worker = detector.clone();
                let detected =
                    tokio::task::spawn_blocking(move || worker.detect(&frame.data, frame.width, frame.height))
                        .await;

                match detected {
                    Ok(faces) if !*shutdown.borrow() => {
                        reports.send_replace(DetectionReport { frame_id, faces });
                    }
                    Ok(_) => debug!("discarding frame {} finished after stop", frame_id),
                    Err(e) => warn!("detection task for frame {} failed: {}", frame_id, e),
                }
            }
        }

        if !pause(config.cadence, &mut shutdown).await {
            break;
        }
    }

    info!("detection loop stopped after {} frame(s)", frame_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::time::timeout;

    const SKIN: [u8; 4] = [200, 150, 120, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Frame {
        let data = rgba.iter().copied().cycle().take((width * height * 4) as usize).collect();
        Frame::new(data, width, height)
    }

    fn fast() -> LoopConfig {
        LoopConfig {
            warmup: Duration::from_millis(0),
            cadence: Duration::from_millis(1),
        }
    }

    /// Replays scripted results, then repeats the last frame forever.
    struct ScriptedSource {
        script: VecDeque<Result<Frame>>,
        last: Frame,
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        async fn next_frame(&mut self) -> Result<Frame> {
            match self.script.pop_front() {
                Some(Ok(frame)) => {
                    self.last = frame.clone();
                    Ok(frame)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.last.clone()),
            }
        }
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let frames = vec![
            solid(64, 64, SKIN),
            solid(64, 64, BLUE),
            Frame::from(RgbaImage::from_pixel(64, 64, image::Rgba(SKIN))),
            Frame::new(Vec::new(), 64, 64),
        ];
        let results = detect_batch(&FaceDetector::default(), frames).await.expect("batch");

        assert_eq!(results.len(), 4);
        assert!(!results[0].is_empty());
        assert!(results[1].is_empty());
        assert_eq!(results[0], results[2]);
        assert!(results[3].is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_fine() {
        let results = detect_batch(&FaceDetector::default(), Vec::new()).await.expect("batch");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn loop_publishes_reports_and_survives_source_errors() {
        let source = ScriptedSource {
            script: VecDeque::from(vec![
                Err(DetectorError::FrameSource("camera busy".into())),
                Ok(solid(64, 64, SKIN)),
            ]),
            last: solid(64, 64, SKIN),
        };
        let mut detection = DetectionLoop::spawn(FaceDetector::default(), source, fast());

        let report = timeout(Duration::from_secs(5), detection.next_report())
            .await
            .expect("report in time")
            .expect("loop running");
        assert!(report.frame_id >= 1);
        assert!(report.face_count() > 0);
        assert!(detection.is_running());

        detection.stop().await.expect("clean stop");
    }

    #[tokio::test]
    async fn frame_ids_only_move_forward() {
        let source = ScriptedSource {
            script: VecDeque::new(),
            last: solid(64, 64, BLUE),
        };
        let mut detection = DetectionLoop::spawn(FaceDetector::default(), source, fast());

        let mut previous = 0;
        for _ in 0..3 {
            let report = timeout(Duration::from_secs(5), detection.next_report())
                .await
                .expect("report in time")
                .expect("loop running");
            assert!(report.frame_id > previous);
            assert_eq!(report.face_count(), 0);
            previous = report.frame_id;
        }

        detection.stop().await.expect("clean stop");
    }

    /// Hands out one frame, signals that it did, then never produces another.
    struct OneShotSource {
        frame: Option<Frame>,
        handed_out: Option<tokio::sync::oneshot::Sender<()>>,
    }

    #[async_trait]
    impl FrameSource for OneShotSource {
        async fn next_frame(&mut self) -> Result<Frame> {
            match self.frame.take() {
                Some(frame) => {
                    if let Some(signal) = self.handed_out.take() {
                        let _ = signal.send(());
                    }
                    Ok(frame)
                }
                None => futures::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn result_finished_after_stop_is_discarded() {
        // Large enough that detection is still running when stop lands.
        let (handed_out, frame_taken) = tokio::sync::oneshot::channel();
        let source = OneShotSource {
            frame: Some(solid(2048, 2048, SKIN)),
            handed_out: Some(handed_out),
        };
        let detection = DetectionLoop::spawn(FaceDetector::default(), source, fast());
        let reports = detection.subscribe();

        timeout(Duration::from_secs(5), frame_taken)
            .await
            .expect("frame requested in time")
            .expect("source signalled");
        timeout(Duration::from_secs(60), detection.stop())
            .await
            .expect("stop in time")
            .expect("clean stop");

        assert_eq!(reports.borrow().frame_id, 0);
        assert!(reports.borrow().faces.is_empty());
    }

    #[tokio::test]
    async fn stop_during_warmup_publishes_nothing() {
        let source = ScriptedSource {
            script: VecDeque::new(),
            last: solid(64, 64, SKIN),
        };
        let config = LoopConfig {
            warmup: Duration::from_secs(60),
            ..fast()
        };
        let detection = DetectionLoop::spawn(FaceDetector::default(), source, config);
        let reports = detection.subscribe();

        timeout(Duration::from_secs(5), detection.stop())
            .await
            .expect("stop in time")
            .expect("clean stop");
        assert_eq!(reports.borrow().frame_id, 0);
    }
}
