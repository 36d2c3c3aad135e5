//! Frame clock with scoped registrations
//!
//! The host calls [`FrameClock::advance`] once per display refresh. Each
//! registered callback receives the same [`FrameTick`]. A registration lives
//! exactly as long as its [`FrameSubscription`] guard; dropping the guard
//! stops delivery immediately, and the dead slot is pruned on the next frame.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Timing passed to every frame callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the clock's origin
    pub time: f32,
    /// Seconds since the previous frame; 0 on the first frame
    pub dt: f32,
    /// Frame number, starting at 0
    pub frame: u64,
}

type FrameCallback = Rc<RefCell<dyn FnMut(&FrameTick)>>;
type FrameCallbackWeak = Weak<RefCell<dyn FnMut(&FrameTick)>>;

#[derive(Default)]
struct ClockInner {
    listeners: Vec<FrameCallbackWeak>,
    last: Option<Duration>,
    frame: u64,
}

/// Drives per-frame callbacks
///
/// Cloning shares the same clock.
#[derive(Clone, Default)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

/// Keeps a frame callback registered; dropping it unsubscribes
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct FrameSubscription {
    _callback: FrameCallback,
}

impl FrameSubscription {
    /// Unsubscribe explicitly
    pub fn cancel(self) {}
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameClock")
            .field("frame", &inner.frame)
            .field("listener_count", &inner.listeners.len())
            .finish()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every subsequent frame
    pub fn subscribe(&self, callback: impl FnMut(&FrameTick) + 'static) -> FrameSubscription {
        let strong: FrameCallback = Rc::new(RefCell::new(callback));
        self.inner.borrow_mut().listeners.push(Rc::downgrade(&strong));
        FrameSubscription { _callback: strong }
    }

    /// Deliver one frame at host time `now`
    ///
    /// A `now` earlier than the previous frame yields `dt = 0` rather than a
    /// negative step. Callbacks may subscribe or advance re-entrantly; a
    /// callback already running is skipped by nested dispatch.
    pub fn advance(&self, now: Duration) -> FrameTick {
        let (tick, listeners) = {
            let mut inner = self.inner.borrow_mut();
            let dt = match inner.last {
                Some(last) => now.saturating_sub(last).as_secs_f32(),
                None => 0.0,
            };
            inner.last = Some(now.max(inner.last.unwrap_or_default()));
            let tick = FrameTick {
                time: now.as_secs_f32(),
                dt,
                frame: inner.frame,
            };
            inner.frame += 1;
            inner.listeners.retain(|weak| weak.strong_count() > 0);
            (tick, inner.listeners.clone())
        };

        for weak in listeners {
            if let Some(callback) = weak.upgrade() {
                if let Ok(mut callback) = callback.try_borrow_mut() {
                    (&mut *callback)(&tick);
                }
            }
        }
        tick
    }

    /// Live registrations (dead ones are not counted)
    pub fn listener_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Frames delivered so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_first_frame_has_zero_dt() {
        let clock = FrameClock::new();
        let tick = clock.advance(Duration::from_millis(500));
        assert_eq!(tick.dt, 0.0);
        assert_eq!(tick.frame, 0);
        let tick = clock.advance(Duration::from_millis(516));
        assert!((tick.dt - 0.016).abs() < 1e-6);
        assert_eq!(tick.frame, 1);
    }

    #[test]
    fn test_backwards_time_clamps_dt() {
        let clock = FrameClock::new();
        clock.advance(Duration::from_secs(2));
        let tick = clock.advance(Duration::from_secs(1));
        assert_eq!(tick.dt, 0.0);
    }

    #[test]
    fn test_dropping_subscription_stops_delivery() {
        let clock = FrameClock::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let subscription = clock.subscribe(move |_| counter.set(counter.get() + 1));

        clock.advance(Duration::from_millis(0));
        clock.advance(Duration::from_millis(16));
        assert_eq!(calls.get(), 2);
        assert_eq!(clock.listener_count(), 1);

        drop(subscription);
        clock.advance(Duration::from_millis(32));
        assert_eq!(calls.get(), 2);
        assert_eq!(clock.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_from_callback() {
        let clock = FrameClock::new();
        let nested: Rc<RefCell<Vec<FrameSubscription>>> = Rc::default();
        let clock_handle = clock.clone();
        let holder = nested.clone();
        let _outer = clock.subscribe(move |_| {
            holder.borrow_mut().push(clock_handle.subscribe(|_| {}));
        });

        clock.advance(Duration::ZERO);
        assert_eq!(clock.listener_count(), 2);
    }
}
