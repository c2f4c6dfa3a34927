//! Stadium screens entry point
//!
//! On the web this mounts the scene with default settings. Natively it runs
//! the simulation headless with a few scripted kicks and logs what the wall
//! does.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    use std::cell::RefCell;
    use std::rc::Rc;
    use stadium_screens::web::{EventListener, mount};

    let handle = match mount(None).await {
        Ok(handle) => Rc::new(RefCell::new(handle)),
        Err(e) => {
            web_sys::console::error_1(&e);
            return;
        }
    };

    let Some(window) = web_sys::window() else {
        return;
    };
    EventListener::new(&window, "pagehide", move |_event| {
        handle.borrow_mut().dispose();
    })
    .forget();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Stadium screens (native) starting...");
    log::info!("Rendering requires a browser - run with `trunk serve` for the web version");

    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use stadium_screens::SceneSettings;
    use stadium_screens::sim::{SceneState, Viewport};

    /// Frame at which each drag is released, with its start and end points
    const KICKS: [(u64, (f32, f32), (f32, f32)); 4] = [
        (180, (0.0, 700.0), (0.0, 0.0)),
        (480, (0.0, 700.0), (0.0, 0.0)),
        (780, (600.0, 700.0), (0.0, 0.0)),
        (1080, (0.0, 700.0), (400.0, 0.0)),
    ];
    const FRAMES: u64 = 1500;

    pub fn run() {
        let mut scene = SceneState::new(&SceneSettings::default(), Viewport::new(1280.0, 720.0, 1.0));
        scene.follow_ball = true;

        for frame in 0..FRAMES {
            if let Some((_, from, to)) = KICKS.iter().find(|(at, _, _)| *at == frame) {
                scene.pointer_down(from.0, from.1);
                if let Some(velocity) = scene.pointer_up(to.0, to.1) {
                    log::info!("Frame {frame}: kick {velocity:?}");
                }
            }

            let output = scene.tick();
            for event in &output.screen_events {
                log::info!("Frame {frame}: {event:?}");
            }
        }

        let ball = scene.physics.ball_position();
        println!(
            "After {FRAMES} frames: ball at ({:.2}, {:.2}, {:.2}), active screen {:?}",
            ball.x,
            ball.y,
            ball.z,
            scene.wall.active()
        );
        for screen in scene.wall.screens() {
            println!(
                "  screen {:2}: playing={} opacity={}",
                screen.index, screen.playing, screen.opacity
            );
        }
    }
}
