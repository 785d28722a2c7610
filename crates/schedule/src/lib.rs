//! Tick-driven timed tasks.
//!
//! Tasks advance only when [`Scheduler::tick`] is called; nothing runs in the
//! background. A task can be cancelled at any time, and scheduling a swing
//! for an object that is already swinging restarts it from wherever the
//! object currently is.
//!
//! # Invariants
//! - At most one swing task per object.
//! - A finished task reports its exact end rotation once, then is removed.

use std::collections::BTreeMap;
use std::fmt;

use glam::Quat;
use roomspace_common::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorTuning {
    /// How far a door opens, in degrees about its hinge.
    pub open_angle_degrees: f32,
    /// Full swings per second.
    pub speed: f32,
}

impl Default for DoorTuning {
    fn default() -> Self {
        Self {
            open_angle_degrees: 90.0,
            speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// A rotation interpolating from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swing {
    pub object: ObjectId,
    pub from: Quat,
    pub to: Quat,
    /// 0 at start, 1 when done.
    pub progress: f32,
    pub speed: f32,
}

impl Swing {
    /// Rotation at the current progress.
    pub fn current(&self) -> Quat {
        self.from.slerp(self.to, self.progress.clamp(0.0, 1.0))
    }

    /// True once the swing reached its target.
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Rotation of a swinging object after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingFrame {
    pub task: TaskId,
    pub object: ObjectId,
    pub rotation: Quat,
    pub finished: bool,
}

/// Per-tick statistics for instrumentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    pub advanced_this_tick: usize,
    pub finished_this_tick: usize,
    pub active: usize,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_id: u64,
    swings: BTreeMap<TaskId, Swing>,
    stats: ScheduleStats,
}

impl Scheduler {
    /// A scheduler with no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Swing `object` towards `to`. Replaces any swing already running for
    /// the object, starting from its current interpolated rotation instead of
    /// `from`.
    pub fn schedule_swing(&mut self, object: ObjectId, from: Quat, to: Quat, speed: f32) -> TaskId {
        let from = self.cancel_object(object).map_or(from, |running| running.current());
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.swings.insert(
            id,
            Swing {
                object,
                from,
                to,
                progress: 0.0,
                speed,
            },
        );
        tracing::debug!(task = %id, object = %object, "swing scheduled");
        id
    }

    /// Drop `task`, returning its last state.
    pub fn cancel(&mut self, task: TaskId) -> Option<Swing> {
        let removed = self.swings.remove(&task);
        if removed.is_some() {
            tracing::debug!(task = %task, "task cancelled");
        }
        removed
    }

    /// Cancel whatever is running for `object`.
    pub fn cancel_object(&mut self, object: ObjectId) -> Option<Swing> {
        self.task_for(object).and_then(|task| self.cancel(task))
    }

    /// Task currently swinging `object`.
    pub fn task_for(&self, object: ObjectId) -> Option<TaskId> {
        self.swings
            .iter()
            .find(|(_, swing)| swing.object == object)
            .map(|(id, _)| *id)
    }

    /// State of `task`, if it is still running.
    pub fn get(&self, task: TaskId) -> Option<&Swing> {
        self.swings.get(&task)
    }

    /// Number of running tasks.
    pub fn active(&self) -> usize {
        self.swings.len()
    }

    /// Counters from the last [`tick`](Self::tick).
    pub fn stats(&self) -> ScheduleStats {
        self.stats
    }

    /// Advance every task by `dt` seconds. Returns one frame per task, in
    /// task order; finished tasks are removed.
    pub fn tick(&mut self, dt: f32) -> Vec<SwingFrame> {
        let _span = tracing::info_span!("schedule_tick", tasks = self.swings.len()).entered();
        let mut frames = Vec::with_capacity(self.swings.len());
        for (id, swing) in self.swings.iter_mut() {
            swing.progress = (swing.progress + dt.max(0.0) * swing.speed).min(1.0);
            let finished = swing.is_finished();
            frames.push(SwingFrame {
                task: *id,
                object: swing.object,
                rotation: if finished { swing.to } else { swing.current() },
                finished,
            });
        }
        self.swings.retain(|_, swing| !swing.is_finished());

        let finished = frames.iter().filter(|f| f.finished).count();
        self.stats = ScheduleStats {
            advanced_this_tick: frames.len(),
            finished_this_tick: finished,
            active: self.swings.len(),
        };
        frames
    }
}
