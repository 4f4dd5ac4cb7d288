//! Replay a [`Script`] against a real placement session

use crate::script::Script;
use anyhow::Result;
use futures::executor::LocalPool;
use perch_core::Vec3;
use perch_platform::{PlatformError, ScriptedFrame, ScriptedXr, XrSystem};
use perch_scene::{FileAssetLoader, Scene};
use perch_session::{PlacementSession, SessionConfig, SessionEvent};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";
    pub const BOLD: &str = "\x1b[1m";
}

/// One delivered session event
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time: f64,
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedRecord {
    pub name: String,
    pub position: [f32; 3],
}

/// Outcome of a simulation run
#[derive(Debug, Serialize)]
pub struct Summary {
    pub final_state: String,
    pub template: String,
    pub events: Vec<EventRecord>,
    /// Objects placed during the last session
    pub placed: Vec<PlacedRecord>,
    /// Objects in the scene, reticle excluded
    pub scene_objects: usize,
    pub session_requests: usize,
    pub hit_test_source_requests: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Ready | SessionEvent::TrackingLost => None,
        SessionEvent::TrackingAcquired { pose } => Some(format_position(pose.position)),
        SessionEvent::Placed { object } => Some(format!(
            "{} at {}",
            object.name,
            format_position(object.pose.position)
        )),
        SessionEvent::Moved { position, .. } => Some(format_position(*position)),
        SessionEvent::Error { kind, message } => Some(format!("{}: {}", kind, message)),
        SessionEvent::Ended { reason } => Some(reason.to_string()),
    }
}

fn format_position(p: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)
}

fn configure(xr: &ScriptedXr, script: &Script) {
    xr.set_supported(script.supported);
    if let Some(message) = &script.session_error {
        xr.fail_next_session(PlatformError::NotAllowed(message.clone()));
    }
    if let Some(message) = &script.reference_space_error {
        xr.fail_next_reference_space(PlatformError::NotSupported(message.clone()));
    }
    for _ in 0..script.hit_test_failures {
        xr.fail_next_hit_test_source(PlatformError::Other(
            "Hit test source is not available yet".into(),
        ));
    }
}

/// Run `script` to completion
///
/// Asset paths are resolved against `base_dir`. Session failures are part of
/// the outcome and end up in the summary, not in the returned error.
pub fn run(script: &Script, mut config: SessionConfig, base_dir: &Path) -> Result<Summary> {
    if let Some(template) = &script.template {
        config.template_url = Some(template.clone());
    }

    let mut pool = LocalPool::new();
    let xr = Rc::new(ScriptedXr::new());
    configure(&xr, script);

    let session = PlacementSession::new(
        xr.clone() as Rc<dyn XrSystem>,
        Scene::new(),
        Rc::new(pool.spawner()),
        config,
    );

    let now = Rc::new(Cell::new(0.0_f64));
    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let now = now.clone();
        let events = events.clone();
        session.subscribe(move |event| {
            let record = EventRecord {
                time: now.get(),
                event: event.name(),
                detail: describe(event),
            };
            match &record.detail {
                Some(detail) => info!("[{:>8.1}ms] {} {}", record.time, record.event, detail),
                None => info!("[{:>8.1}ms] {}", record.time, record.event),
            }
            events.borrow_mut().push(record);
        });
    }

    let loader = FileAssetLoader::new(base_dir);
    let template = pool.run_until(session.load_template(&loader));
    debug!("template: {:?}", template);

    start(&mut pool, &session);

    for (frame, time) in script.frames.iter().zip(script.timestamps()) {
        now.set(time);

        if frame.restart {
            start(&mut pool, &session);
        }

        let mut scripted = ScriptedFrame::new();
        if !frame.viewer {
            scripted = scripted.with_viewer(None);
        }
        scripted = scripted.with_results(
            frame
                .hits
                .iter()
                .map(|hit| perch_platform::HitTestResult::new(hit.pose())),
        );
        if let Some(error) = &frame.error {
            scripted = scripted.with_error(error.to_platform_error());
        }

        session.update(time, &scripted);
        pool.run_until_stalled();

        if frame.tap && session.select().is_none() {
            debug!("tap at {:.1}ms placed nothing", time);
        }

        if let Some(drag) = frame.drag {
            let target = session.placed_objects().get(drag.object).map(|p| p.id);
            match target {
                Some(id) => {
                    if !session.move_object(id, Vec3::from(drag.position)) {
                        warn!("object {} is not movable", drag.object);
                    }
                }
                None => warn!("no placed object with index {}", drag.object),
            }
        }

        if frame.end {
            session.end();
        }
        if frame.platform_end {
            session.handle_platform_end();
        }
        pool.run_until_stalled();
    }

    let placed = session
        .placed_objects()
        .into_iter()
        .map(|p| PlacedRecord {
            name: p.name,
            position: p.pose.position.into(),
        })
        .collect();
    let scene_objects = session.scene().len().saturating_sub(1);
    let events = events.borrow().clone();

    Ok(Summary {
        final_state: session.state().to_string(),
        template: format!("{:?}", session.template_source()),
        events,
        placed,
        scene_objects,
        session_requests: xr.session_requests(),
        hit_test_source_requests: xr.hit_test_source_requests(),
        last_error: session.last_error().map(|e| e.to_string()),
    })
}

fn start(pool: &mut LocalPool, session: &PlacementSession<Scene>) {
    match pool.run_until(session.start()) {
        Ok(()) => debug!("session started"),
        Err(e) => warn!("session did not start: {}", e),
    }
}

impl Summary {
    pub fn print(&self) {
        println!();
        println!("{}Simulation summary{}", colors::BOLD, colors::RESET);
        println!();

        for record in &self.events {
            let color = match record.event {
                "error" => colors::RED,
                "ended" => colors::YELLOW,
                "placed" | "moved" => colors::GREEN,
                _ => colors::GRAY,
            };
            print!(
                "  {}{:>8.1}ms{} {}{}{}",
                colors::GRAY,
                record.time,
                colors::RESET,
                color,
                record.event,
                colors::RESET
            );
            match &record.detail {
                Some(detail) => println!(" {}", detail),
                None => println!(),
            }
        }

        println!();
        println!("  state:     {}", self.final_state);
        println!("  template:  {}", self.template);
        println!(
            "  placed:    {} this session, {} in scene",
            self.placed.len(),
            self.scene_objects
        );
        for placed in &self.placed {
            let [x, y, z] = placed.position;
            println!("    {} ({:.2}, {:.2}, {:.2})", placed.name, x, y, z);
        }
        println!(
            "  requests:  {} session, {} hit-test source",
            self.session_requests, self.hit_test_source_requests
        );
        if let Some(error) = &self.last_error {
            println!("  {}last error:{} {}", colors::RED, colors::RESET, error);
        }
    }
}
