//! Notification Sink
//!
//! Holds at most one toast. Each toast expires on its own timer; showing a
//! new toast cancels the previous timer before starting the next one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Schedules a one-shot callback.
///
/// Dropping the returned handle cancels the callback if it has not run yet.
pub trait Timer {
    type Handle: 'static;

    fn schedule(&self, after: Duration, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

pub type ToastListener = Rc<dyn Fn(Option<&Toast>)>;

struct Slot<H> {
    toast: Option<Toast>,
    /// Bumped on every change; a timer only clears the toast it was started for
    generation: u64,
    timer: Option<H>,
    listeners: Vec<ToastListener>,
}

pub struct Notifier<T: Timer> {
    timer: T,
    ttl: Duration,
    slot: Rc<RefCell<Slot<T::Handle>>>,
}

impl<T: Timer> Notifier<T> {
    pub fn new(timer: T, ttl: Duration) -> Self {
        Self {
            timer,
            ttl,
            slot: Rc::new(RefCell::new(Slot {
                toast: None,
                generation: 0,
                timer: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// The visible toast, if any
    pub fn current(&self) -> Option<Toast> {
        self.slot.borrow().toast.clone()
    }

    /// Called with the new toast (or `None` on expiry) after every change
    pub fn subscribe(&self, listener: impl Fn(Option<&Toast>) + 'static) {
        self.slot.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(ToastLevel::Error, message);
    }

    /// Replace the current toast and restart the expiry timer
    pub fn notify(&self, level: ToastLevel, message: impl Into<String>) {
        let toast = Toast { level, message: message.into() };
        log::debug!("[TOAST] {:?}: {}", toast.level, toast.message);

        let (generation, previous) = {
            let mut slot = self.slot.borrow_mut();
            slot.generation += 1;
            slot.toast = Some(toast.clone());
            (slot.generation, slot.timer.take())
        };
        // Cancels the old expiry
        drop(previous);

        let weak = Rc::downgrade(&self.slot);
        let handle = self.timer.schedule(self.ttl, Box::new(move || expire(&weak, generation)));
        self.slot.borrow_mut().timer = Some(handle);

        emit(&self.slot, Some(&toast));
    }

    /// Clear the toast now and cancel its timer
    pub fn dismiss(&self) {
        let previous = {
            let mut slot = self.slot.borrow_mut();
            if slot.toast.is_none() {
                return;
            }
            slot.generation += 1;
            slot.toast = None;
            slot.timer.take()
        };
        drop(previous);
        emit(&self.slot, None);
    }
}

fn expire<H>(slot: &Weak<RefCell<Slot<H>>>, generation: u64) {
    let Some(slot) = slot.upgrade() else {
        return;
    };
    {
        let mut inner = slot.borrow_mut();
        if inner.generation != generation || inner.toast.is_none() {
            return;
        }
        // The fired handle stays in the slot until the next notify replaces it
        inner.toast = None;
    }
    emit(&slot, None);
}

fn emit<H>(slot: &Rc<RefCell<Slot<H>>>, toast: Option<&Toast>) {
    let listeners = slot.borrow().listeners.clone();
    for listener in listeners {
        listener(toast);
    }
}
