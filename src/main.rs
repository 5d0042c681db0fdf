use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use raylib::prelude::*;

mod animator;
mod cli;
mod config;
mod constants;
mod easing;
mod error;
mod geometry;
mod loader;
mod motion;
mod registry;
mod scheduler;
mod slide;
mod state;
mod surface;
mod texture_loader;
mod timer;
mod view;

use crate::animator::Capability;
use crate::cli::Args;
use crate::constants::*;
use crate::geometry::Size;
use crate::loader::{FetchOutcome, ImageLoader, LoadRequest};
use crate::scheduler::{PlaybackEvent, Scheduler};
use crate::texture_loader::load_texture_with_exif_rotation;
use crate::view::SlideView;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (mut rl, thread) = raylib::init()
        .size(args.windowed_size.0, args.windowed_size.1)
        .title("Ken Burns Slideshow")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    // --- Configuration ---
    let config = match args.slideshow_config(&mut rng) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            show_error(&mut rl, &thread, &format!("Error: {}", e));
            return Err(e).context("could not build the slideshow");
        }
    };
    info!("{} slides configured", config.slides.len());

    // --- Capability probe: a render texture means the transform path works ---
    let mut framebuffer = match args.backend {
        cli::Backend::Transform | cli::Backend::Auto => {
            match rl.load_render_texture(&thread, RENDER_WIDTH as u32, RENDER_HEIGHT as u32) {
                Ok(framebuffer) => Some(framebuffer),
                Err(e) => {
                    warn!("No render texture support ({}), falling back to compatibility animation", e);
                    None
                }
            }
        }
        cli::Backend::Compat | cli::Backend::None => None,
    };
    let capability = args.backend.capability(framebuffer.is_some());

    let container = match framebuffer {
        Some(_) => Size::new(RENDER_WIDTH as f32, RENDER_HEIGHT as f32),
        None => screen_size(&rl),
    };
    let mut scheduler: Scheduler<SlideView> = Scheduler::new(config.slides, capability, config.playback, container);

    // --- Start loading ---
    let requests = scheduler
        .pending_sources()
        .into_iter()
        .map(|(id, source)| LoadRequest { id, source: source.into() })
        .collect();
    let mut loader = ImageLoader::spawn(requests, LOADER_THREADS);

    let mut manually_paused = false;
    let mut suspended = false;
    let mut utility_signalled = capability != Capability::Compatibility;

    // --- Main Loop ---
    while !rl.window_should_close() {
        let dt = Duration::from_secs_f32(rl.get_frame_time());

        // 1. Hand finished fetches to the engine
        for outcome in loader.poll() {
            match outcome {
                FetchOutcome::Fetched(fetched) => match load_texture_with_exif_rotation(&mut rl, &thread, &fetched) {
                    Ok(texture) => {
                        let view = SlideView::new(texture);
                        let size = view.size();
                        scheduler.slide_loaded(fetched.id, view, size);
                    }
                    Err(e) => scheduler.slide_failed(fetched.id, &e),
                },
                FetchOutcome::Failed { id, error } => scheduler.slide_failed(id, &error),
            }
        }

        // 2. Visibility: minimised/hidden window or Space suspends playback
        if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
            manually_paused = !manually_paused;
        }
        let should_suspend = manually_paused || rl.is_window_minimized() || rl.is_window_hidden();
        if should_suspend != suspended {
            if should_suspend {
                scheduler.suspend();
            } else {
                scheduler.resume();
            }
            suspended = should_suspend;
        }

        if framebuffer.is_none() {
            scheduler.set_container_size(screen_size(&rl));
        }

        // 3. Timers and running animations
        scheduler.advance(dt);
        for view in scheduler.surfaces_mut() {
            view.update(dt);
        }
        for event in scheduler.drain_events() {
            match event {
                PlaybackEvent::TransitionStarted { slide } => debug!("Transition started for slide {}", slide),
                PlaybackEvent::TransitionComplete => debug!("Transition complete"),
                PlaybackEvent::Waiting => info!("Waiting for images..."),
                PlaybackEvent::LoadingComplete => {
                    info!("Loading complete, {} slides in rotation", scheduler.sequence().len())
                }
            }
        }
        let nothing_to_show = loader.is_finished() && scheduler.is_empty();

        // 4. Render
        match framebuffer.as_mut() {
            Some(framebuffer) => {
                rl.draw_texture_mode(&thread, framebuffer, |mut tmd| {
                    let mut d = tmd.begin_drawing(&thread);
                    draw_slides(&mut d, &scheduler, nothing_to_show);
                });

                let mut d = rl.begin_drawing(&thread);
                let sw = d.get_screen_width() as f32;
                let sh = d.get_screen_height() as f32;

                // Render textures are stored upside down
                d.draw_texture_pro(
                    &*framebuffer,
                    Rectangle::new(0.0, 0.0, framebuffer.width() as f32, -(framebuffer.height() as f32)),
                    Rectangle::new(0.0, 0.0, sw, sh),
                    Vector2::new(0.0, 0.0),
                    0.0,
                    Color::WHITE,
                );
            }
            None => {
                let mut d = rl.begin_drawing(&thread);
                draw_slides(&mut d, &scheduler, nothing_to_show);
            }
        }

        // Box tweens are stepped by this loop, which only exists once a frame is out
        if !utility_signalled {
            scheduler.utility_ready();
            utility_signalled = true;
        }
    } // End main loop

    Ok(())
}

fn screen_size(rl: &RaylibHandle) -> Size {
    Size::new(rl.get_screen_width() as f32, rl.get_screen_height() as f32)
}

fn draw_slides(d: &mut RaylibDrawHandle, scheduler: &Scheduler<SlideView>, nothing_to_show: bool) {
    d.clear_background(Color::BLACK);

    let mut views: Vec<&SlideView> = scheduler.surfaces().collect();
    views.sort_by_key(|view| view.stacking());
    for view in views {
        view.draw(d);
    }

    if nothing_to_show {
        d.draw_text("Error: No slides loaded.", 20, 20, 20, Color::RED);
    } else if scheduler.is_waiting() {
        d.draw_text("Loading...", 20, 20, 20, Color::WHITE);
    }
}

fn show_error(rl: &mut RaylibHandle, thread: &RaylibThread, message: &str) {
    let mut d = rl.begin_drawing(thread);
    d.clear_background(Color::BLACK);
    d.draw_text(message, 20, 20, 20, Color::RED);
    drop(d);
    std::thread::sleep(Duration::from_secs(5));
}
