//! `wasm-bindgen` exports for a JavaScript host.
//!
//! One bridge per JS thread. Every export maps to exactly one bridge call.
//! Structured results cross the boundary as JSON strings. Pixels cross either
//! as a zero-copy `Uint8Array` view over engine memory (`getBuffer`) or as a
//! copy (`readRegion`). JS callbacks are kept in a thread-local table, since the
//! notification bus only stores `Send + Sync` closures.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use engine::{Command, DocumentId, Notification, ObjectId, RegionKind};
use js_sys::{Function, Uint8Array};
use tracing::warn;
use wasm_bindgen::prelude::*;

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, ErrorCode};
use crate::logging;
use crate::notify::SubscriptionId;

thread_local! {
    static BRIDGE: Rc<Bridge> = Rc::new(bridge());
    static CALLBACKS: RefCell<HashMap<u32, Function>> = RefCell::new(HashMap::new());
    static SUBSCRIPTIONS: RefCell<HashMap<u32, SubscriptionId>> = RefCell::new(HashMap::new());
    static NEXT_CALLBACK: Cell<u32> = const { Cell::new(0) };
}

fn bridge() -> Bridge {
    let config = BridgeConfig::from_env();
    logging::init(&config);
    Bridge::new(&config)
}

fn js_error(e: &BridgeError) -> JsValue {
    JsValue::from_str(&format!("{}: {e}", e.error_code()))
}

fn with_bridge<T>(f: impl FnOnce(&Bridge) -> Result<T, BridgeError>) -> Result<T, JsValue> {
    BRIDGE.with(|bridge| f(bridge)).map_err(|e| js_error(&e))
}

fn send(command: Command) -> Result<Option<u32>, JsValue> {
    with_bridge(|b| b.send(command)).map(|ack| ack.assigned_id.map(|id| id.0))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_region(kind: &str) -> Result<RegionKind, JsValue> {
    serde_json::from_str(kind).map_err(|e| JsValue::from_str(&format!("invalid region kind: {e}")))
}

// =============================================================
// Lifecycle
// =============================================================

#[wasm_bindgen]
pub async fn initialize() -> Result<(), JsValue> {
    let bridge = BRIDGE.with(Rc::clone);
    bridge.initialize().await.map_err(|e| js_error(&e))
}

#[wasm_bindgen(js_name = isReady)]
#[must_use]
pub fn is_ready() -> bool {
    BRIDGE.with(|b| b.is_ready())
}

// =============================================================
// Commands
// =============================================================

#[wasm_bindgen(js_name = mouseDown)]
pub fn mouse_down(x: f64, y: f64) -> Result<(), JsValue> {
    send(Command::MouseDown { x, y }).map(|_| ())
}

#[wasm_bindgen(js_name = mouseUp)]
pub fn mouse_up() -> Result<(), JsValue> {
    send(Command::MouseUp).map(|_| ())
}

#[wasm_bindgen(js_name = mouseMove)]
pub fn mouse_move(x: f64, y: f64) -> Result<(), JsValue> {
    send(Command::MouseMove { x, y }).map(|_| ())
}

#[wasm_bindgen(js_name = editTransform)]
pub fn edit_transform(id: u32, x: f64, y: f64, rotation: f64, sx: f64, sy: f64) -> Result<(), JsValue> {
    send(Command::EditTransform { id: ObjectId(id), position: (x, y), rotation, scale: (sx, sy) }).map(|_| ())
}

#[wasm_bindgen]
pub fn rename(id: u32, name: String) -> Result<(), JsValue> {
    send(Command::Rename { id: ObjectId(id), name }).map(|_| ())
}

#[wasm_bindgen]
pub fn select(ids: Vec<u32>) -> Result<(), JsValue> {
    let ids: BTreeSet<ObjectId> = ids.into_iter().map(ObjectId).collect();
    send(Command::Select { ids }).map(|_| ())
}

#[wasm_bindgen(js_name = removeObject)]
pub fn remove_object(id: u32) -> Result<(), JsValue> {
    send(Command::Delete { id: ObjectId(id) }).map(|_| ())
}

#[wasm_bindgen(js_name = uploadImage)]
pub fn upload_image(name: String, parent: u32, bytes: Vec<u8>) -> Result<Option<u32>, JsValue> {
    send(Command::UploadImage { name, parent: ObjectId(parent), bytes })
}

#[wasm_bindgen(js_name = uploadSvg)]
pub fn upload_svg(name: String, parent: u32, svg: String) -> Result<Option<u32>, JsValue> {
    send(Command::UploadSvg { name, parent: ObjectId(parent), svg })
}

#[wasm_bindgen(js_name = uploadText)]
pub fn upload_text(name: String, parent: u32, text: String) -> Result<Option<u32>, JsValue> {
    send(Command::UploadText { name, parent: ObjectId(parent), text })
}

#[wasm_bindgen(js_name = switchDocument)]
pub fn switch_document(id: u32) -> Result<(), JsValue> {
    send(Command::SwitchDocument { id: DocumentId(id) }).map(|_| ())
}

// =============================================================
// Queries
// =============================================================

/// The active stage as JSON.
#[wasm_bindgen(js_name = getStage)]
pub fn get_stage() -> Result<String, JsValue> {
    to_json(&with_bridge(Bridge::get_stage)?)
}

/// Region descriptor as JSON. `kind` is `"Frame"` or
/// `{"Pattern":{"seed":1,"width":64,"height":64}}`.
#[wasm_bindgen(js_name = getRegion)]
pub fn get_region(kind: &str) -> Result<String, JsValue> {
    let kind = parse_region(kind)?;
    to_json(&with_bridge(|b| b.get_region(kind))?)
}

/// Zero-copy view of the engine's pixel memory. Offsets returned by
/// `getRegion` index into it.
///
/// The view aliases engine memory. It is valid only until the next call into
/// this module, so copy out what you need before sending a command or asking
/// for another region.
#[wasm_bindgen(js_name = getBuffer)]
pub fn get_buffer() -> Result<Uint8Array, JsValue> {
    with_bridge(|b| {
        let view = b.get_buffer()?;
        // SAFETY: the arena is only moved or freed by a later call into this
        // module, and JS cannot make one while it is still reading the view.
        Ok(unsafe { Uint8Array::view(view.bytes()) })
    })
}

/// Copy of a region's RGBA8 pixels.
#[wasm_bindgen(js_name = readRegion)]
pub fn read_region(kind: &str) -> Result<Vec<u8>, JsValue> {
    let kind = parse_region(kind)?;
    with_bridge(|b| b.read_region(kind)).map(|copy| copy.bytes)
}

// =============================================================
// Notifications
// =============================================================

/// Register `callback` for the notification named `tag`. The callback is
/// invoked with the tag string. Returns a handle for
/// `unsubscribeNotification`, or `undefined` for an unknown tag.
#[wasm_bindgen(js_name = subscribeNotification)]
pub fn subscribe_notification(tag: &str, callback: Function) -> Option<u32> {
    let key = NEXT_CALLBACK.with(|next| {
        let key = next.get();
        next.set(key.wrapping_add(1));
        key
    });
    let subscribed = BRIDGE.with(|b| b.notifications().subscribe_tag(tag, move |kind| call_js(key, kind)));
    let id = subscribed?;
    CALLBACKS.with(|cbs| cbs.borrow_mut().insert(key, callback));
    SUBSCRIPTIONS.with(|subs| subs.borrow_mut().insert(key, id));
    Some(key)
}

#[wasm_bindgen(js_name = unsubscribeNotification)]
pub fn unsubscribe_notification(key: u32) -> bool {
    CALLBACKS.with(|cbs| cbs.borrow_mut().remove(&key));
    match SUBSCRIPTIONS.with(|subs| subs.borrow_mut().remove(&key)) {
        Some(id) => BRIDGE.with(|b| b.unsubscribe(id)),
        None => false,
    }
}

fn call_js(key: u32, kind: Notification) {
    // Clone out of the table so the callback may (un)subscribe.
    let Some(callback) = CALLBACKS.with(|cbs| cbs.borrow().get(&key).cloned()) else {
        return;
    };
    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(kind.tag())) {
        warn!(%kind, error = ?e, "notification callback threw");
    }
}
