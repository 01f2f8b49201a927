//! Runtime plumbing for the single-threaded engine
//!
//! The engine never blocks and never spawns threads. Work that must happen
//! "after the current call returns" is posted to a [`MainQueue`], and time is
//! advanced explicitly by the host, either per frame through [`FrameClock`] or,
//! with the `tokio-runtime` feature, by [`run_frame_loop`].

use crossbeam_channel::{unbounded, Receiver, Sender};
use instant::Instant;
use std::fmt;

type Task = Box<dyn FnOnce()>;

/// Deferred FIFO of tasks run on the host's main thread
#[derive(Clone)]
pub struct MainQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Enqueues a task for the next drain
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        // Both ends live in `self`, so the channel cannot be disconnected here.
        let _ = self.tx.send(Box::new(task));
    }

    /// Runs the tasks queued before this call and returns how many ran.
    /// Tasks posted while draining wait for the next drain.
    pub fn run_pending(&self) -> usize {
        let pending = self.rx.len();
        let mut ran = 0;
        for _ in 0..pending {
            match self.rx.try_recv() {
                Ok(task) => {
                    task();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainQueue")
            .field("pending", &self.len())
            .finish()
    }
}

/// Turns wall-clock frames into deltas in seconds
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Option<Instant>,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            frame_count: 0,
        }
    }

    /// Seconds since the previous tick; the first tick returns zero
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let delta = self
            .last_frame
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.frame_count += 1;
        delta
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
        self.frame_count = 0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls `frame(delta_time)` on every tick of a tokio interval until it returns `false`.
///
/// Must run on a current-thread runtime or inside a `LocalSet`, since the engine is `!Send`.
/// Returns the number of frames run.
#[cfg(feature = "tokio-runtime")]
pub async fn run_frame_loop<F>(frame_interval: std::time::Duration, mut frame: F) -> u64
where
    F: FnMut(f64) -> bool,
{
    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut clock = FrameClock::new();

    loop {
        interval.tick().await;
        let delta = clock.tick();
        if !frame(delta) {
            break;
        }
    }

    log::debug!("frame loop finished after {} frames", clock.frame_count());
    clock.frame_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_main_queue_runs_in_fifo_order() {
        let queue = MainQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            queue.post(move || log.borrow_mut().push(i));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tasks_posted_while_draining_wait_for_next_drain() {
        let queue = MainQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_queue = queue.clone();
        let inner_log = log.clone();
        queue.post(move || {
            inner_log.borrow_mut().push("outer");
            let log = inner_log.clone();
            inner_queue.post(move || log.borrow_mut().push("inner"));
        });

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn test_frame_clock_deltas() {
        let mut clock = FrameClock::new();
        let start = Instant::now();

        assert_eq!(clock.tick_at(start), 0.0);
        let delta = clock.tick_at(start + Duration::from_millis(500));
        assert!((delta - 0.5).abs() < 1e-9);
        assert_eq!(clock.frame_count(), 2);

        clock.reset();
        assert_eq!(clock.frame_count(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_frame_loop_stops_when_frame_returns_false() {
        let mut remaining = 3;
        let frames = run_frame_loop(Duration::from_millis(1), |_| {
            remaining -= 1;
            remaining > 0
        })
        .await;
        assert_eq!(frames, 3);
    }
}
