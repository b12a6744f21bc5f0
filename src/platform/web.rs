//! Browser host
//!
//! Binds the round to `deviceorientation`, `setInterval` and the iOS
//! motion-permission prompt, and exports `TiltDeckApp` as the control
//! surface for the page's JavaScript.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::DeviceOrientationEvent;

use super::{LiveFlag, PermissionStatus, Subscription};
use crate::catalog::Catalog;
use crate::consts::TIMER_INTERVAL_MS;
use crate::motion::{RawSample, ScreenRotation};
use crate::round::{Round, RoundResult};
use crate::settings::{CalibrationStrategy, Settings};

#[wasm_bindgen(inline_js = "
    export function request_orientation_permission() {
        const ref = window.DeviceOrientationEvent;
        // Older browsers: no permission API
        if (!ref || typeof ref.requestPermission !== 'function') {
            return Promise.resolve(true);
        }
        return ref.requestPermission()
            .then((res) => res === 'granted')
            .catch(() => false);
    }
")]
extern "C" {
    fn request_orientation_permission() -> js_sys::Promise;
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Tilt Deck starting...");
}

/// Ask for motion access. The prompt is issued synchronously so it stays
/// inside the user gesture that called this; only the answer is awaited.
pub fn request_motion_permission() -> impl Future<Output = PermissionStatus> {
    let pending = JsFuture::from(request_orientation_permission());
    async move {
        match pending.await {
            Ok(answer) => PermissionStatus::from(answer.as_bool().unwrap_or(false)),
            Err(e) => {
                log::warn!("Permission request failed: {:?}", e);
                PermissionStatus::Denied
            }
        }
    }
}

/// Current screen rotation, upright if the browser cannot say
pub fn screen_rotation() -> ScreenRotation {
    let Some(window) = web_sys::window() else {
        return ScreenRotation::Upright;
    };
    let angle = window
        .screen()
        .ok()
        .and_then(|screen| screen.orientation().angle().ok())
        .map(i32::from)
        .or_else(|| {
            // Legacy iOS `window.orientation` (-90, 0, 90, 180)
            js_sys::Reflect::get(&window, &JsValue::from_str("orientation"))
                .ok()
                .and_then(|v| v.as_f64())
                .map(|a| a as i32)
        });
    angle.map(ScreenRotation::from_degrees).unwrap_or_default()
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Subscribe to `deviceorientation`
pub fn listen_orientation(mut on_sample: impl FnMut(RawSample) + 'static) -> Option<Subscription> {
    let window = web_sys::window()?;
    let flag = LiveFlag::new();
    let live = flag.clone();

    let closure = Closure::<dyn FnMut(DeviceOrientationEvent)>::new(
        move |event: DeviceOrientationEvent| {
            if !live.is_live() {
                return;
            }
            on_sample(RawSample {
                front_back_deg: event.beta(),
                left_right_deg: event.gamma(),
            });
        },
    );
    window
        .add_event_listener_with_callback_and_bool(
            "deviceorientation",
            closure.as_ref().unchecked_ref(),
            true,
        )
        .ok()?;

    Some(Subscription::new(flag, move || {
        let _ = window.remove_event_listener_with_callback_and_bool(
            "deviceorientation",
            closure.as_ref().unchecked_ref(),
            true,
        );
        // Late events may still be queued; the dead flag turns them into no-ops
        closure.forget();
    }))
}

/// Call `on_tick` every `interval_ms`
pub fn start_interval(interval_ms: u32, mut on_tick: impl FnMut() + 'static) -> Option<Subscription> {
    let window = web_sys::window()?;
    let flag = LiveFlag::new();
    let live = flag.clone();

    let closure = Closure::<dyn FnMut()>::new(move || {
        if live.is_live() {
            on_tick();
        }
    });
    let handle = window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval_ms as i32,
        )
        .ok()?;

    Some(Subscription::new(flag, move || {
        window.clear_interval_with_handle(handle);
        closure.forget();
    }))
}

struct AppInner {
    catalog: Catalog,
    settings: Settings,
    round: Option<Round>,
    /// Bumped whenever `round` is replaced
    rounds_started: u64,
    sensor: Option<Subscription>,
    timer: Option<Subscription>,
    last_result: Option<RoundResult>,
    on_finish: Option<js_sys::Function>,
}

type Shared = Rc<RefCell<AppInner>>;

/// JavaScript-facing control surface
#[wasm_bindgen]
pub struct TiltDeckApp {
    inner: Shared,
}

#[wasm_bindgen]
impl TiltDeckApp {
    /// Build from the category JSON (`{ key: { name, words } }`)
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str) -> Result<TiltDeckApp, JsValue> {
        let catalog =
            Catalog::from_json(catalog_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        log::info!("Loaded {} categories", catalog.len());
        Ok(TiltDeckApp {
            inner: Rc::new(RefCell::new(AppInner {
                catalog,
                settings: Settings::load(),
                round: None,
                rounds_started: 0,
                sensor: None,
                timer: None,
                last_result: None,
                on_finish: None,
            })),
        })
    }

    /// Home-screen listing as JSON
    pub fn categories_json(&self) -> String {
        let entries = self.inner.borrow().catalog.entries();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn set_on_finish(&self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_finish = Some(callback);
    }

    pub fn set_round_seconds(&self, seconds: u32) {
        let mut inner = self.inner.borrow_mut();
        inner.settings.round_seconds = seconds;
        inner.settings.save();
    }

    pub fn set_calibration(&self, strategy: &str) -> Result<(), JsValue> {
        let strategy = CalibrationStrategy::from_str(strategy)
            .ok_or_else(|| JsValue::from_str("unknown calibration strategy"))?;
        let mut inner = self.inner.borrow_mut();
        inner.settings.calibration = strategy;
        inner.settings.save();
        Ok(())
    }

    /// New round for `key` in `Ready`; replaces any round in progress
    pub fn start_round(&self, key: &str) -> Result<(), JsValue> {
        let mut inner = self.inner.borrow_mut();
        let category = inner
            .catalog
            .get(key)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .clone();
        let round = Round::new(category, &inner.settings, now_ms() as u64)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        inner.round = Some(round);
        inner.rounds_started += 1;
        inner.last_result = None;
        sync_host(&mut inner, &self.inner);
        Ok(())
    }

    /// Replay the current category with a new shuffle
    pub fn restart(&self) {
        apply(&self.inner, |round| {
            round.start();
            None
        });
    }

    /// Ask for motion access, then start calibrating. Must be called from a
    /// tap/click handler. Resolves to `true` once calibrating, `false` if the
    /// round was quit, restarted or replaced while the prompt was open.
    pub fn begin_calibration(&self) -> js_sys::Promise {
        let Some(asked_for) = attempt_key(&self.inner.borrow()) else {
            return js_sys::Promise::reject(&JsValue::from_str("no round started"));
        };
        let permission = request_motion_permission();
        let app = self.inner.clone();
        future_to_promise(async move {
            let status = permission.await;
            let outcome = {
                let mut inner = app.borrow_mut();
                if attempt_key(&inner) != Some(asked_for) {
                    log::info!("Dropping permission answer for an abandoned round");
                    return Ok(JsValue::FALSE);
                }
                let outcome = match inner.round.as_mut() {
                    Some(round) => round.begin_calibration(status),
                    None => return Err(JsValue::from_str("no round started")),
                };
                sync_host(&mut inner, &app);
                outcome
            };
            outcome
                .map(|_| JsValue::TRUE)
                .map_err(|e| JsValue::from_str(&e.to_string()))
        })
    }

    pub fn mark_correct(&self) {
        apply(&self.inner, |round| round.mark_correct(now_ms()));
    }

    pub fn mark_pass(&self) {
        apply(&self.inner, |round| round.mark_pass(now_ms()));
    }

    pub fn end_round(&self) -> Result<(), JsValue> {
        let mut error = None;
        apply(&self.inner, |round| match round.end_round() {
            Ok(result) => Some(result),
            Err(e) => {
                error = Some(e);
                None
            }
        });
        match error {
            Some(e) => Err(JsValue::from_str(&e.to_string())),
            None => Ok(()),
        }
    }

    /// Abandon the attempt (also cancels a stalled calibration)
    pub fn quit(&self) {
        apply(&self.inner, |round| {
            round.quit();
            None
        });
    }

    pub fn stage(&self) -> String {
        self.read(|round| round.stage().as_str().to_string())
            .unwrap_or_default()
    }

    pub fn status(&self) -> String {
        self.read(|round| round.status().to_string())
            .unwrap_or_default()
    }

    pub fn current_word(&self) -> Option<String> {
        self.read(|round| round.current_word().map(str::to_string))
            .flatten()
    }

    pub fn seconds_left(&self) -> u32 {
        self.read(|round| round.seconds_left()).unwrap_or(0)
    }

    pub fn correct_count(&self) -> usize {
        self.read(|round| round.correct_count()).unwrap_or(0)
    }

    pub fn pass_count(&self) -> usize {
        self.read(|round| round.pass_count()).unwrap_or(0)
    }

    /// Most recent result as JSON, handed over once
    pub fn take_result_json(&self) -> Option<String> {
        let result = self.inner.borrow_mut().last_result.take()?;
        serde_json::to_string(&result).ok()
    }
}

impl TiltDeckApp {
    fn read<T>(&self, f: impl FnOnce(&Round) -> T) -> Option<T> {
        self.inner.borrow().round.as_ref().map(f)
    }
}

impl Drop for TiltDeckApp {
    fn drop(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.sensor = None;
        inner.timer = None;
    }
}

/// Identifies the current round attempt across replacement and reset
fn attempt_key(inner: &AppInner) -> Option<(u64, u64)> {
    inner
        .round
        .as_ref()
        .map(|round| (inner.rounds_started, round.attempt()))
}

/// Run one round mutation, reconcile host listeners in the same step, and
/// notify JS (outside the borrow) if the round just finished.
fn apply(app: &Shared, f: impl FnOnce(&mut Round) -> Option<RoundResult>) {
    let callback = {
        let mut inner = app.borrow_mut();
        let Some(round) = inner.round.as_mut() else {
            return;
        };
        let result = f(round);
        sync_host(&mut inner, app);
        match result {
            Some(result) => {
                inner.last_result = Some(result);
                inner.on_finish.clone()
            }
            None => None,
        }
    };
    if let Some(callback) = callback {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            log::warn!("on_finish callback failed: {:?}", e);
        }
    }
}

/// Attach or drop the sensor listener and timer to match the round's stage
fn sync_host(inner: &mut AppInner, app: &Shared) {
    let (listening, timing) = inner
        .round
        .as_ref()
        .map(|r| (r.is_listening(), r.timer_running()))
        .unwrap_or((false, false));

    if !listening {
        inner.sensor = None;
    } else if inner.sensor.is_none() {
        let weak = Rc::downgrade(app);
        inner.sensor = listen_orientation(move |sample| {
            if let Some(app) = Weak::upgrade(&weak) {
                let rotation = screen_rotation();
                apply(&app, |round| round.on_sample(&sample, rotation, now_ms()));
            }
        });
        if inner.sensor.is_none() {
            log::warn!("Could not subscribe to deviceorientation");
        }
    }

    if !timing {
        inner.timer = None;
    } else if inner.timer.is_none() {
        let weak = Rc::downgrade(app);
        inner.timer = start_interval(TIMER_INTERVAL_MS, move || {
            if let Some(app) = Weak::upgrade(&weak) {
                apply(&app, Round::on_timer_tick);
            }
        });
    }
}
