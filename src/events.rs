//! Interrupt-driven event queue.
//!
//! Two asynchronous sources feed the engine: the periodic wake timer and
//! the light sensor's conversion-complete interrupt.  Both only enqueue;
//! the main loop drains the queue and hands events to the engine one at a
//! time, so every state mutation runs to completion before the next one
//! starts.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Wake timer ISR   │────▶│  EventQueue  │────▶│  Main loop   │
//! │ ADC complete ISR │────▶│ (crit. sect) │     │  (consumer)  │
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use heapless::Deque;

/// Default capacity: a few wake periods of backlog.
pub const EVENT_QUEUE_CAP: usize = 8;

/// Events produced by interrupt handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The periodic wake timer fired.
    Wake,
    /// A light-sensor conversion completed with this 8-bit result.
    SampleReady(u8),
}

/// Fixed-capacity FIFO shared between interrupt and main-loop context.
///
/// Suitable for a `static`: construction is `const` and every access goes
/// through a critical section.
pub struct EventQueue<const N: usize = EVENT_QUEUE_CAP> {
    inner: Mutex<RefCell<Deque<Event, N>>>,
    dropped: AtomicU32,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue an event.  Safe to call from interrupt context.
    /// Returns `false` if the queue is full (event dropped and counted).
    pub fn push(&self, event: Event) -> bool {
        let pushed = critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).push_back(event).is_ok()
        });
        if !pushed {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        pushed
    }

    /// Dequeue the oldest event.
    pub fn pop(&self) -> Option<Event> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pop_front())
    }

    /// Hand every pending event to `handler`, oldest first.
    ///
    /// Events pushed while the handler runs are delivered in the same call.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_empty())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).len())
    }

    /// Events lost to a full queue since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
