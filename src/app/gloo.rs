//! WASM application implementation
//!
//! Browser implementations of the platform traits, plus the functions page
//! markup calls (`updateSessionStatus`, `markAttendance`, ...).

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use js_sys::{Array, Function, Object, Reflect, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;

use super::actions;
use crate::chart::{self, ChartConfig};
use crate::client::WasmClient;
use crate::config::ClientConfig;
use crate::error::{ErrorKind, Result};
use crate::format;
use crate::interface::{ChartSurface, Geolocator, HttpClient, Ui};
use crate::model::structs::{AnalyticsEntry, EntityId, Position, PositionError, SessionStatus};

fn js_error(value: JsValue) -> crate::error::Error {
    ErrorKind::JsError(format!("{value:?}")).into()
}

fn window() -> Result<web_sys::Window> {
    web_sys::window().ok_or_else(|| ErrorKind::JsError("no global window".to_string()).into())
}

fn get(target: &JsValue, key: &str) -> Result<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(js_error)
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(js_error)
}

/// `window.alert` and `location.reload`
#[derive(Debug, Default)]
pub struct BrowserUi;

impl Ui for BrowserUi {
    fn alert(&self, message: &str) {
        match window() {
            Ok(w) => {
                if let Err(e) = w.alert_with_message(message) {
                    log::error!("alert failed: {e:?}");
                }
            }
            Err(e) => log::error!("{e}"),
        }
    }

    fn refresh(&self) {
        match window() {
            Ok(w) => {
                if let Err(e) = w.location().reload() {
                    log::error!("reload failed: {e:?}");
                }
            }
            Err(e) => log::error!("{e}"),
        }
    }
}

/// `navigator.geolocation.getCurrentPosition`, turned into a single awaited result.
#[derive(Debug, Default)]
pub struct NavigatorGeolocator;

impl NavigatorGeolocator {
    fn geolocation(&self) -> Option<JsValue> {
        let navigator = web_sys::window()?.navigator();
        get(&navigator, "geolocation")
            .ok()
            .filter(|g| !g.is_undefined() && !g.is_null())
    }
}

impl Geolocator for NavigatorGeolocator {
    fn is_supported(&self) -> bool {
        self.geolocation().is_some()
    }

    async fn current_position(&self) -> core::result::Result<Position, PositionError> {
        let geolocation = self
            .geolocation()
            .ok_or(PositionError::PositionUnavailable)?;
        let get_current_position: Function = get(&geolocation, "getCurrentPosition")
            .and_then(|f| f.dyn_into().map_err(js_error))
            .map_err(|e| PositionError::Other(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let tx = Rc::clone(&tx);
            Closure::once(move |position: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(position_from_js(&position));
                }
            })
        };
        let on_error = {
            let tx = Rc::clone(&tx);
            Closure::once(move |error: JsValue| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err(position_error_from_js(&error)));
                }
            })
        };

        get_current_position
            .call2(&geolocation, on_success.as_ref(), on_error.as_ref())
            .map_err(|e| PositionError::Other(format!("{e:?}")))?;

        let result = rx
            .await
            .unwrap_or_else(|_| Err(PositionError::Other("position request dropped".to_string())));

        // Both callbacks must outlive the request
        drop(on_success);
        drop(on_error);
        result
    }
}

fn position_from_js(position: &JsValue) -> core::result::Result<Position, PositionError> {
    let coords = get(position, "coords").map_err(|e| PositionError::Other(e.to_string()))?;
    let read = |key: &str| get(&coords, key).ok().and_then(|v| v.as_f64());

    match (read("latitude"), read("longitude")) {
        (Some(latitude), Some(longitude)) => Ok(Position {
            latitude,
            longitude,
            accuracy: read("accuracy"),
        }),
        _ => Err(PositionError::PositionUnavailable),
    }
}

fn position_error_from_js(error: &JsValue) -> PositionError {
    let code = get(error, "code")
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or_default();
    let message = get(error, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    PositionError::from_code(code as u16, &message)
}

/// Draws with the page's global `Chart` (Chart.js).
#[derive(Debug, Default)]
pub struct CanvasSurface;

impl ChartSurface for CanvasSurface {
    type Canvas = Element;

    fn find_canvas(&self, id: &str) -> Option<Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    fn draw(&self, canvas: Element, config: &ChartConfig) -> Result<()> {
        let chart_ctor: Function = get(&window()?, "Chart")?
            .dyn_into()
            .map_err(|_| ErrorKind::JsError("Chart.js is not loaded".to_string()))?;

        let js_config = JSON::parse(&serde_json::to_string(config)?).map_err(js_error)?;
        attach_label_callbacks(&js_config)?;

        Reflect::construct(&chart_ctor, &Array::of2(&canvas, &js_config)).map_err(js_error)?;
        Ok(())
    }
}

/// Percent-suffixed y ticks and tooltips. The chart keeps these callbacks for
/// the lifetime of the page, so the closures are leaked on purpose.
fn attach_label_callbacks(js_config: &JsValue) -> Result<()> {
    let y_axis = get(&get(&get(js_config, "options")?, "scales")?, "y")?;
    let ticks = Object::new();
    let tick = Closure::<dyn Fn(JsValue) -> JsValue>::new(|value: JsValue| {
        JsValue::from_str(&chart::tick_label(value.as_f64().unwrap_or_default()))
    });
    set(&ticks, "callback", tick.as_ref())?;
    set(&y_axis, "ticks", &ticks)?;
    tick.forget();

    let callbacks = Object::new();
    let label = Closure::<dyn Fn(JsValue) -> JsValue>::new(|context: JsValue| {
        let dataset_label = get(&context, "dataset")
            .and_then(|d| get(&d, "label"))
            .ok()
            .and_then(|l| l.as_string())
            .unwrap_or_default();
        let value = get(&context, "parsed")
            .and_then(|p| get(&p, "y"))
            .ok()
            .and_then(|y| y.as_f64())
            .unwrap_or_default();
        JsValue::from_str(&chart::tooltip_label(&dataset_label, value))
    });
    set(&callbacks, "label", label.as_ref())?;
    label.forget();

    let tooltip = Object::new();
    set(&tooltip, "callbacks", &callbacks)?;
    let plugins = Object::new();
    set(&plugins, "tooltip", &tooltip)?;
    set(&get(js_config, "options")?, "plugins", &plugins)
}

/// Routes `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("{}: {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            log::Level::Info => web_sys::console::info_1(&line),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

#[wasm_bindgen(js_name = initLogging)]
pub fn init_console_logger(debug: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
    }
}

/// Identifiers arrive from page markup as JS strings or integers and are sent
/// on exactly as given. Anything else (fractions, `null`, objects) is refused.
fn entity_id(value: &JsValue) -> Result<EntityId> {
    if let Some(text) = value.as_string() {
        return Ok(EntityId::Text(text));
    }
    if value.is_undefined() || value.is_null() {
        return Err(ErrorKind::JsError("missing identifier".to_string()).into());
    }
    let json = JSON::stringify(value).map(String::from).map_err(js_error)?;
    Ok(serde_json::from_str(&json)?)
}

/// Read every identifier, or report the first bad one and give up.
fn entity_ids<const N: usize>(values: [&JsValue; N]) -> Option<[EntityId; N]> {
    let mut ids = Vec::with_capacity(N);
    for value in values {
        match entity_id(value) {
            Ok(id) => ids.push(id),
            Err(e) => {
                log::error!("Error: {e}");
                BrowserUi.alert(actions::GENERIC_ERROR);
                return None;
            }
        }
    }
    ids.try_into().ok()
}

async fn browser_client() -> Option<WasmClient> {
    match WasmClient::new(&ClientConfig::browser()).await {
        Ok(client) => Some(client),
        Err(e) => {
            log::error!("Error: {e}");
            BrowserUi.alert(actions::GENERIC_ERROR);
            None
        }
    }
}

#[wasm_bindgen(js_name = updateSessionStatus)]
pub async fn update_session_status(session_id: JsValue, status: String) {
    let Some([session_id]) = entity_ids([&session_id]) else {
        return;
    };
    let Some(client) = browser_client().await else {
        return;
    };
    let status: SessionStatus = status.parse().unwrap_or_else(|never| match never {});
    actions::update_session_status(&client, &BrowserUi, session_id, status)
        .await
        .apply(&BrowserUi);
}

#[wasm_bindgen(js_name = addStudentToCourse)]
pub async fn add_student_to_course(course_id: JsValue, student_id: JsValue) {
    let Some([course_id, student_id]) = entity_ids([&course_id, &student_id]) else {
        return;
    };
    let Some(client) = browser_client().await else {
        return;
    };
    actions::add_student_to_course(&client, &BrowserUi, course_id, student_id)
        .await
        .apply(&BrowserUi);
}

#[wasm_bindgen(js_name = markAttendance)]
pub async fn mark_attendance(session_id: JsValue) {
    let Some([session_id]) = entity_ids([&session_id]) else {
        return;
    };
    let Some(client) = browser_client().await else {
        return;
    };
    actions::mark_attendance(&client, &BrowserUi, &NavigatorGeolocator, session_id)
        .await
        .apply(&BrowserUi);
}

#[wasm_bindgen(js_name = formatDate)]
pub fn format_date(input: &str) -> String {
    format::format_date(input).unwrap_or_else(|_| format::INVALID_DATE.to_string())
}

#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(input: &str) -> String {
    format::format_time(input).unwrap_or_else(|_| format::INVALID_DATE.to_string())
}

#[wasm_bindgen(js_name = renderAttendanceChart)]
pub fn render_attendance_chart(analytics: JsValue) -> core::result::Result<(), JsValue> {
    let json = JSON::stringify(&analytics)
        .map(String::from)
        .map_err(|e| JsValue::from_str(&format!("{e:?}")))?;
    let analytics: Vec<AnalyticsEntry> =
        serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let config = ClientConfig::browser();
    chart::render_attendance_chart(&CanvasSurface, &config.chart_canvas_id, &analytics)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
