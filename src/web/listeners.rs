//! Owned DOM callbacks
//!
//! Dropping an `EventListener` or an `AnimationLoop` unregisters it, so a
//! scene can be torn down without leaking closures into the page.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::render::{AnimationFrame, request_animation_frame};

pub use gloo::events::EventListener;

type FrameSlot = RefCell<Option<AnimationFrame>>;

/// Self-rescheduling `requestAnimationFrame` loop
///
/// The frame callback returns `false` to stop. Dropping the loop cancels the
/// pending frame and releases the callback.
pub struct AnimationLoop {
    _pending: Rc<FrameSlot>,
}

impl AnimationLoop {
    pub fn start<F>(frame: F) -> Self
    where
        F: FnMut(f64) -> bool + 'static,
    {
        let pending = Rc::new(RefCell::new(None));
        schedule(Rc::downgrade(&pending), Rc::new(RefCell::new(frame)));
        Self { _pending: pending }
    }
}

fn schedule<F>(slot: Weak<FrameSlot>, frame: Rc<RefCell<F>>)
where
    F: FnMut(f64) -> bool + 'static,
{
    // Loop already dropped
    let Some(pending) = slot.upgrade() else {
        return;
    };
    let next_slot = slot.clone();
    let handle = request_animation_frame(move |time| {
        let keep_going = (frame.borrow_mut())(time);
        if keep_going {
            schedule(next_slot, frame);
        } else {
            if let Some(pending) = next_slot.upgrade() {
                pending.borrow_mut().take();
            }
            log::info!("Animation loop stopped");
        }
    });
    *pending.borrow_mut() = Some(handle);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::{Event, EventTarget};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn dropped_listener_stops_receiving_events() {
        let target = EventTarget::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let listener = EventListener::new(&target, "kick", move |_event: &Event| {
            counter.set(counter.get() + 1);
        });

        let event = Event::new("kick").unwrap();
        target.dispatch_event(&event).unwrap();
        assert_eq!(calls.get(), 1);

        drop(listener);
        target.dispatch_event(&event).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[wasm_bindgen_test]
    async fn loop_runs_until_frame_returns_false() {
        let mut resolve = None;
        let done = js_sys::Promise::new(&mut |res, _rej| resolve = Some(res));
        let resolve = resolve.unwrap();

        let frames = Rc::new(Cell::new(0));
        let counter = frames.clone();
        let _frames = AnimationLoop::start(move |_time| {
            counter.set(counter.get() + 1);
            if counter.get() < 3 {
                return true;
            }
            resolve.call0(&JsValue::NULL).unwrap();
            false
        });

        JsFuture::from(done).await.unwrap();
        assert_eq!(frames.get(), 3);
    }
}
