// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use orime_common::auth::{
    AuthController, AuthControllerPointer, DummyAuthController, HttpAuthController,
};
use orime_common::session::SessionStore;
use orime_common::tracking::{
    poll_interval, poll_once, DummyTrackingController, HttpTrackingController, MarkerAnimator,
    MarkerStyle, PollOutcome, TrackingControllerPointer, TrackingControllerSharedPointer,
};
use orime_model::{BusLocation, Student};

/// How often an active glide advances the displayed marker.
const GLIDE_TICK: Duration = Duration::from_millis(33);

/// Everything the map screen's closures share.
///
/// The poll timer is armed as a single shot from the completion handler of
/// the previous poll, so location requests never overlap. The glide timer
/// runs only while the marker is between two points.
#[derive(Clone)]
struct TrackerContext {
    ui: slint::Weak<AppWindow>,
    session: Rc<SessionStore>,
    tracking: TrackingControllerSharedPointer,
    animator: Rc<RefCell<MarkerAnimator>>,
    last_sample: Rc<RefCell<Option<BusLocation>>>,
    poll_timer: Rc<slint::Timer>,
    glide_timer: Rc<slint::Timer>,
}

/// Our App struct that holds the UI, the session context and the controllers.
///
/// The App struct is responsible for initializing the UI, restoring a
/// persisted session and wiring the screen callbacks.
struct App {
    ui: AppWindow,
    auth: Rc<AuthControllerPointer>,
    ctx: TrackerContext,
}

impl App {
    /// Create a new App struct.
    fn new() -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;

        let session = Rc::new(SessionStore::open()?);

        // If the ORIME_API_URL environment variable was set at build time,
        // talk to the real backend, otherwise run on scripted data.
        let (auth, tracking): (AuthControllerPointer, TrackingControllerPointer) =
            if let Some(base_url) = std::option_env!("ORIME_API_URL") {
                log::info!("using the backend at {base_url}");
                (
                    Box::new(HttpAuthController::new(base_url)?),
                    Box::new(HttpTrackingController::new(base_url)?),
                )
            } else {
                log::info!("no backend configured, running on scripted data");
                (
                    Box::new(DummyAuthController::new()?),
                    Box::new(DummyTrackingController::new()?),
                )
            };

        let ctx = TrackerContext {
            ui: ui.as_weak(),
            session,
            tracking: Arc::new(Mutex::new(tracking)),
            animator: Rc::new(RefCell::new(MarkerAnimator::new())),
            last_sample: Rc::new(RefCell::new(None)),
            poll_timer: Rc::new(slint::Timer::default()),
            glide_timer: Rc::new(slint::Timer::default()),
        };

        Ok(Self {
            ui,
            auth: Rc::new(auth),
            ctx,
        })
    }

    /// Restore the session, wire the callbacks and run the UI.
    fn run(&mut self) -> anyhow::Result<()> {
        let vm = self.ui.global::<ViewModel>();

        // A persisted session goes straight to the dashboard.
        match self.ctx.session.load() {
            Some(session) => {
                vm.set_students(students_model(&session.students));
                vm.set_screen(Screen::Dashboard);
            }
            None => vm.set_screen(Screen::Login),
        }

        self.wire_auth();
        self.wire_map();

        // Run the UI (and map an error to an anyhow::Error).
        self.ui.run().map_err(|e| e.into())
    }

    /// Hook up the login and verify screens.
    fn wire_auth(&self) {
        let vm = self.ui.global::<ViewModel>();

        let ui_handle = self.ui.as_weak();
        let auth = self.auth.clone();
        vm.on_send_otp(move || {
            let ui = ui_handle.unwrap();
            let vm = ui.global::<ViewModel>();
            if vm.get_busy() {
                return;
            }

            vm.set_error_message("".into());
            vm.set_busy(true);
            match auth.send_otp(vm.get_mobile_number().as_str()) {
                Ok(message) => {
                    vm.set_status_message(message.into());
                    vm.set_otp("".into());
                    vm.set_screen(Screen::Verify);
                }
                Err(e) => vm.set_error_message(e.to_string().into()),
            }
            vm.set_busy(false);
        });

        let ui_handle = self.ui.as_weak();
        let auth = self.auth.clone();
        let session = self.ctx.session.clone();
        vm.on_verify_otp(move || {
            let ui = ui_handle.unwrap();
            let vm = ui.global::<ViewModel>();
            if vm.get_busy() {
                return;
            }

            vm.set_error_message("".into());
            vm.set_busy(true);
            match auth.verify_otp(vm.get_mobile_number().as_str(), vm.get_otp().as_str()) {
                Ok(new_session) => match session.store(&new_session) {
                    Ok(()) => {
                        vm.set_students(students_model(&new_session.students));
                        vm.set_status_message("".into());
                        vm.set_screen(Screen::Dashboard);
                    }
                    Err(e) => vm.set_error_message(e.to_string().into()),
                },
                Err(e) => vm.set_error_message(e.to_string().into()),
            }
            vm.set_busy(false);
        });

        let ctx = self.ctx.clone();
        vm.on_log_out(move || {
            let Some(ui) = ctx.ui.upgrade() else { return };
            let vm = ui.global::<ViewModel>();

            stop_tracking(&ctx);
            ctx.session.clear();

            vm.set_students(slint::ModelRc::default());
            vm.set_mobile_number("".into());
            vm.set_otp("".into());
            vm.set_status_message("".into());
            vm.set_error_message("".into());
            vm.set_screen(Screen::Login);
        });

        let ui_handle = self.ui.as_weak();
        vm.on_dismiss_error(move || {
            let ui = ui_handle.unwrap();
            ui.global::<ViewModel>().set_error_message("".into());
        });
    }

    /// Hook up the map screen.
    fn wire_map(&self) {
        let vm = self.ui.global::<ViewModel>();

        let ctx = self.ctx.clone();
        vm.on_open_map(move || {
            let Some(ui) = ctx.ui.upgrade() else { return };
            let vm = ui.global::<ViewModel>();

            vm.set_has_fix(false);
            *ctx.last_sample.borrow_mut() = None;
            *ctx.animator.borrow_mut() = MarkerAnimator::new();
            vm.set_screen(Screen::Map);

            // The first poll fires right away; the timer only carries the
            // cadence between completions.
            run_poll(&ctx, true);
        });

        let ctx = self.ctx.clone();
        vm.on_leave_map(move || {
            let Some(ui) = ctx.ui.upgrade() else { return };

            stop_tracking(&ctx);
            ui.global::<ViewModel>().set_screen(Screen::Dashboard);
        });

        let ctx = self.ctx.clone();
        vm.on_refresh(move || {
            let Some(ui) = ctx.ui.upgrade() else { return };
            let vm = ui.global::<ViewModel>();

            // A refresh that is already underway wins.
            if vm.get_refreshing() {
                return;
            }

            vm.set_refreshing(true);
            run_poll(&ctx, true);
            vm.set_refreshing(false);
        });
    }
}

/// One poll of the bus position, then re-arm the timer.
///
/// `recenter` also moves the map view to the new position, wanted for the
/// first fix and for a manual refresh.
fn run_poll(ctx: &TrackerContext, recenter: bool) {
    let Some(ui) = ctx.ui.upgrade() else { return };
    let vm = ui.global::<ViewModel>();

    let outcome = {
        let controller = ctx.tracking.lock().unwrap();
        poll_once(&ctx.session, controller.as_ref())
    };

    match outcome {
        PollOutcome::Updated(sample) => {
            show_sample(ctx, &sample, recenter);
            *ctx.last_sample.borrow_mut() = Some(sample);
            schedule_next_poll(ctx);
        }
        PollOutcome::Failed(message) => {
            vm.set_error_message(message.into());
            schedule_next_poll(ctx);
        }
        PollOutcome::SignedOut => {
            stop_tracking(ctx);
            vm.set_students(slint::ModelRc::default());
            vm.set_error_message("Your session has expired, sign in again".into());
            vm.set_screen(Screen::Login);
        }
        PollOutcome::NoSession => {
            stop_tracking(ctx);
            vm.set_screen(Screen::Login);
        }
    }
}

/// Arm the next poll once the current one has fully resolved.
fn schedule_next_poll(ctx: &TrackerContext) {
    let delay = poll_interval(ctx.last_sample.borrow().as_ref());

    let next = ctx.clone();
    ctx.poll_timer
        .start(slint::TimerMode::SingleShot, delay, move || {
            run_poll(&next, false);
        });
}

/// Feed a fresh sample to the animator and the view model.
fn show_sample(ctx: &TrackerContext, sample: &BusLocation, recenter: bool) {
    let Some(ui) = ctx.ui.upgrade() else { return };
    let vm = ui.global::<ViewModel>();

    let mut animator = ctx.animator.borrow_mut();
    animator.apply(sample);

    vm.set_bus(BusInfo {
        vehicle_number: sample.vehicle_number.as_str().into(),
        location: sample.location.as_str().into(),
        speed: format!("{:.0} km/h", sample.speed).into(),
        running: sample.ignition,
        heading_degrees: match animator.style() {
            MarkerStyle::Directional { angle } => angle,
            MarkerStyle::Pin => 0.0,
        },
        updated_at: format_timestamp(sample.timestamp).into(),
    });

    if let Some(point) = animator.displayed() {
        vm.set_marker_latitude(point.latitude as f32);
        vm.set_marker_longitude(point.longitude as f32);
    }
    if recenter || !vm.get_has_fix() {
        vm.set_center_latitude(sample.latitude as f32);
        vm.set_center_longitude(sample.longitude as f32);
    }
    vm.set_has_fix(true);

    if animator.in_transition() {
        start_glide(ctx);
    }
}

/// Drive the marker towards its target while a glide is active.
fn start_glide(ctx: &TrackerContext) {
    let tick = ctx.clone();
    ctx.glide_timer
        .start(slint::TimerMode::Repeated, GLIDE_TICK, move || {
            let Some(ui) = tick.ui.upgrade() else { return };
            let vm = ui.global::<ViewModel>();

            let mut animator = tick.animator.borrow_mut();
            if let Some(point) = animator.advance(GLIDE_TICK) {
                vm.set_marker_latitude(point.latitude as f32);
                vm.set_marker_longitude(point.longitude as f32);
            }
            if !animator.in_transition() {
                tick.glide_timer.stop();
            }
        });
}

/// Stop the map screen's timers and forget the last fix.
///
/// Required on every way off the map screen, otherwise a stale timer would
/// keep polling with whatever credentials are left.
fn stop_tracking(ctx: &TrackerContext) {
    ctx.poll_timer.stop();
    ctx.glide_timer.stop();
    *ctx.last_sample.borrow_mut() = None;
}

fn students_model(students: &[Student]) -> slint::ModelRc<StudentRecord> {
    let records: Vec<StudentRecord> = students.iter().map(StudentRecord::from).collect();

    slint::ModelRc::new(slint::VecModel::from(records))
}

/// Convert a student into its dashboard card record.
impl From<&Student> for StudentRecord {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.as_str().into(),
            usn: student.usn.as_str().into(),
            year: format!("Year {}", student.year).into(),
            bus_id: student.bus_id.as_str().into(),
            institution: student.institution_name.as_str().into(),
            address: student.home_address.as_str().into(),
        }
    }
}

/// Render a sample timestamp as local wall-clock time.
fn format_timestamp(epoch_millis: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(epoch_millis) {
        Some(when) => when
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// A minimal main function that initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut app = App::new()?;

    app.run()
}
