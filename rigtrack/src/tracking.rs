use crate::{Error, Landmark, RetargetConfig, TrackingPoint};
use glam::Vec3;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

/// One detector landmark in normalized detector space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LandmarkSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub confidence: f32,
}

impl LandmarkSample {
    pub fn new(x: f32, y: f32, z: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            z,
            confidence,
        }
    }
}

/// One detector inference, samples ordered by [`Landmark::index`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    pub samples: Vec<LandmarkSample>,
}

impl LandmarkFrame {
    pub fn new(samples: Vec<LandmarkSample>) -> Self {
        Self { samples }
    }

    pub fn sample(&self, landmark: Landmark) -> Option<&LandmarkSample> {
        self.samples.get(landmark.index())
    }
}

/// Mapping from normalized detector coordinates into tracking space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackingSpace {
    pub scale: f32,
    /// Negate x so the subject moves like a mirror image.
    pub mirror_x: bool,
    /// Negate y; detector y grows downward.
    pub flip_y: bool,
    /// Samples below this confidence are ignored.
    pub min_confidence: f32,
}

impl Default for TrackingSpace {
    fn default() -> Self {
        Self {
            scale: 10.0,
            mirror_x: true,
            flip_y: true,
            min_confidence: 0.0,
        }
    }
}

impl TrackingSpace {
    pub fn to_tracking(&self, sample: &LandmarkSample) -> Vec3 {
        let x = if self.mirror_x { -sample.x } else { sample.x };
        let y = if self.flip_y { -sample.y } else { sample.y };
        Vec3::new(x, y, sample.z) * self.scale
    }

    pub fn accepts(&self, sample: &LandmarkSample) -> bool {
        sample.confidence >= self.min_confidence
            && sample.x.is_finite()
            && sample.y.is_finite()
            && sample.z.is_finite()
    }
}

/// Read access to tracking-space points.
pub trait TrackingSource {
    fn point(&self, id: TrackingPoint) -> Option<Vec3>;

    /// Called once at the start of every retarget tick.
    fn refresh(&mut self) {}
}

/// Latest landmark positions plus the virtual joints derived from them.
#[derive(Clone, Debug)]
pub struct TrackingPointSet {
    landmarks: [Option<Vec3>; Landmark::COUNT],
    virtual_neck: Option<Vec3>,
    virtual_hip: Option<Vec3>,
    frames: u64,
}

impl Default for TrackingPointSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingPointSet {
    pub fn new() -> Self {
        Self {
            landmarks: [None; Landmark::COUNT],
            virtual_neck: None,
            virtual_hip: None,
            frames: 0,
        }
    }

    /// Number of frames committed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn landmark(&self, landmark: Landmark) -> Option<Vec3> {
        self.landmarks[landmark.index()]
    }

    /// Sets a landmark directly in tracking space and refreshes the virtual
    /// joints.
    pub fn set_landmark(&mut self, landmark: Landmark, position: Vec3) {
        self.landmarks[landmark.index()] = Some(position);
        self.update_virtual_joints();
    }

    pub fn clear_landmark(&mut self, landmark: Landmark) {
        self.landmarks[landmark.index()] = None;
        self.update_virtual_joints();
    }

    /// Applies a detector frame. Rejected or missing samples keep their last
    /// committed position.
    pub fn commit(&mut self, frame: &LandmarkFrame, space: &TrackingSpace) {
        for (landmark, sample) in Landmark::ALL.iter().zip(frame.samples.iter()) {
            if space.accepts(sample) {
                self.landmarks[landmark.index()] = Some(space.to_tracking(sample));
            }
        }
        self.update_virtual_joints();
        self.frames += 1;
    }

    fn update_virtual_joints(&mut self) {
        self.virtual_neck = self.midpoint(TrackingPoint::VirtualNeck);
        self.virtual_hip = self.midpoint(TrackingPoint::VirtualHip);
    }

    fn midpoint(&self, point: TrackingPoint) -> Option<Vec3> {
        let (a, b) = point.virtual_pair()?;
        Some((self.landmark(a)? + self.landmark(b)?) * 0.5)
    }
}

impl TrackingSource for TrackingPointSet {
    fn point(&self, id: TrackingPoint) -> Option<Vec3> {
        match id {
            TrackingPoint::Landmark(landmark) => self.landmark(landmark),
            TrackingPoint::VirtualNeck => self.virtual_neck,
            TrackingPoint::VirtualHip => self.virtual_hip,
        }
    }
}

/// Creates the bounded queue that carries detector frames to the tick thread.
pub fn frame_channel(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = sync_channel(capacity.max(1));
    (FrameSender { tx }, FrameReceiver { rx })
}

#[derive(Clone, Debug)]
pub struct FrameSender {
    tx: SyncSender<LandmarkFrame>,
}

impl FrameSender {
    /// Queues a frame without blocking.
    pub fn try_send(&self, frame: LandmarkFrame) -> Result<(), Error> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => Error::FrameQueueFull,
            TrySendError::Disconnected(_) => Error::FrameQueueClosed,
        })
    }
}

#[derive(Debug)]
pub struct FrameReceiver {
    rx: Receiver<LandmarkFrame>,
}

impl FrameReceiver {
    /// Empties the queue and returns the newest frame, if any arrived.
    pub fn drain_latest(&self) -> Option<LandmarkFrame> {
        let mut latest = None;
        while let Ok(frame) = self.rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

/// A [`TrackingSource`] fed by a detector running elsewhere.
///
/// Frames are committed only from [`TrackingSource::refresh`], so a tick never
/// reads a set that is halfway through an update.
#[derive(Debug)]
pub struct TrackingFeed {
    points: TrackingPointSet,
    frames: FrameReceiver,
    space: TrackingSpace,
}

impl TrackingFeed {
    pub fn new(frames: FrameReceiver, space: TrackingSpace) -> Self {
        Self {
            points: TrackingPointSet::new(),
            frames,
            space,
        }
    }

    /// Feed that maps samples through `config.tracking`.
    pub fn from_config(frames: FrameReceiver, config: &RetargetConfig) -> Self {
        Self::new(frames, config.tracking)
    }

    pub fn points(&self) -> &TrackingPointSet {
        &self.points
    }

    pub fn space(&self) -> &TrackingSpace {
        &self.space
    }
}

impl TrackingSource for TrackingFeed {
    fn point(&self, id: TrackingPoint) -> Option<Vec3> {
        self.points.point(id)
    }

    fn refresh(&mut self) {
        if let Some(frame) = self.frames.drain_latest() {
            self.points.commit(&frame, &self.space);
        }
    }
}
