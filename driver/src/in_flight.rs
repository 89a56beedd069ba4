use std::cell::Cell;
use std::rc::Rc;

/// Decrements the driver's in-flight counter exactly once, when the endpoint
/// future that holds it is dropped — whether it ran to completion, was
/// terminated, or (in a test) was simply never polled to the end.
///
/// Replaces the original design's `ncurrent--` in `endpoint_handle_free`:
/// there, freeing had to remember to do this; here, there is no path that
/// can forget.
pub(crate) struct InFlightGuard {
    counter: Rc<Cell<usize>>,
}

impl InFlightGuard {
    pub(crate) fn new(counter: Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        InFlightGuard { counter }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.set(self.counter.get() - 1);
    }
}
