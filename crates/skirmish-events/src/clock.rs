//! The tick source the scheduler stamps records with.

use std::rc::Rc;

/// One discrete unit of game time.
pub type Tick = u64;

/// A monotonic game clock.
///
/// The value returned by [`current_tick`] must never decrease for the
/// lifetime of a session. The scheduler reads it once per enqueue and once
/// per drain call.
///
/// [`current_tick`]: Clock::current_tick
pub trait Clock {
    /// Return the current tick.
    fn current_tick(&self) -> Tick;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn current_tick(&self) -> Tick {
        (**self).current_tick()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn current_tick(&self) -> Tick {
        (**self).current_tick()
    }
}
