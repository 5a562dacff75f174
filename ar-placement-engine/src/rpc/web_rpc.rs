use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use constants::session::JSONRPC_VERSION;

use crate::engine::core::frame_loop::FrameLoopSet;
use crate::engine::presentation::PresentationSignal;
use crate::engine::xr::bridge::HostBridge;
use crate::engine::xr::session::TrackingSession;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure. Host notifications have no `id`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Outgoing traffic to the host page, flushed once per frame.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<PresentationSignal>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(FrameLoopSet::Device),
            )
            .add_systems(
                Update,
                (
                    forward_bridge_commands,
                    forward_presentation_signals,
                    send_outgoing_messages,
                )
                    .chain()
                    .after(FrameLoopSet::Present),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(queue: Res<MessageQueue>) {
    let queue = queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                queue.push(message_str);
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, host messages will not arrive");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Ownership moves to JS for the lifetime of the page.
    closure.forget();
}

/// Raw host messages, filled by the page listener and drained every frame.
#[derive(Resource, Clone, Default)]
pub struct MessageQueue(Arc<Mutex<Vec<String>>>);

impl MessageQueue {
    pub fn push(&self, message: impl Into<String>) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(message.into());
        }
    }

    fn drain(&self) -> Vec<String> {
        match self.0.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Res<MessageQueue>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    for message_str in message_queue.drain() {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    bridge: Option<Res<HostBridge>>,
    session: Res<TrackingSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                debug!("Dropping malformed host message: {}", parse_error);
                continue;
            }
        };

        if let Some(bridge) = &bridge {
            match bridge.deliver(&request.method, &request.params) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    debug!("Dropping bridge message: {}", err);
                    continue;
                }
            }
        }

        if let Some(response) = handle_rpc_request(&request, &session) {
            rpc_interface.queue_response(response);
        }
    }
}

/// Answer a host request. Notifications (no `id`) that nothing handled are
/// logged and dropped.
fn handle_rpc_request(request: &RpcRequest, session: &TrackingSession) -> Option<RpcResponse> {
    let Some(id) = request.id.clone() else {
        debug!("Ignoring unknown notification {}", request.method);
        return None;
    };

    let result = match request.method.as_str() {
        "get_session_state" => handle_get_session_state(session),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                id,
                -32601,
                "Method not found",
                Some(json!({"method": request.method})),
            ));
        }
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_get_session_state(session: &TrackingSession) -> Result<Value, RpcError> {
    Ok(json!({
        "phase": session.phase().as_str(),
        "attempt": session.attempt(),
        "host_active": session.is_host_active(),
        "reticle_visible": session.reticle.visible,
        "plane_found": session.plane_found(),
        "placed": session.placed().is_some(),
    }))
}

fn create_error_response(id: Value, code: i32, message: &str, data: Option<Value>) -> RpcResponse {
    RpcResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Device requests issued by the bridge backend go out as notifications.
fn forward_bridge_commands(
    bridge: Option<Res<HostBridge>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(bridge) = bridge else {
        return;
    };
    for command in bridge.take_outbox() {
        rpc_interface.send_notification(command.method, command.params);
    }
}

fn forward_presentation_signals(
    mut signals: EventReader<PresentationSignal>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for signal in signals.read() {
        rpc_interface.send_notification(
            "presentation_signal",
            json!({
                "signal": signal.as_str(),
                "message": signal.guidance(),
            }),
        );
    }
}

fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Post a serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::xr::backend::{XrBackend, XrEvent};

    fn request(method: &str, id: Option<Value>) -> RpcRequest {
        RpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params: Value::Null,
            id,
        }
    }

    #[test]
    fn session_state_reports_phase() {
        let session = TrackingSession::new();
        let response = handle_rpc_request(&request("get_session_state", Some(json!(7))), &session)
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["phase"], "idle");
        assert_eq!(result["reticle_visible"], false);
        assert_eq!(result["placed"], false);
        assert_eq!(response.id, Some(json!(7)));
    }

    #[test]
    fn unknown_method_is_an_error_and_unknown_notification_is_dropped() {
        let session = TrackingSession::new();

        let response = handle_rpc_request(&request("get_fps", Some(json!(1))), &session).unwrap();
        assert_eq!(response.error.unwrap().code, -32601);

        assert!(handle_rpc_request(&request("get_fps", None), &session).is_none());
    }

    #[test]
    fn host_messages_reach_the_bridge() {
        let mut bridge = HostBridge::new();
        let mut app = App::new();
        app.insert_resource(bridge.clone())
            .init_resource::<TrackingSession>()
            .init_resource::<WebRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(Update, (process_incoming_messages, handle_rpc_messages).chain());

        let queue = app.world().resource::<MessageQueue>().clone();
        queue.push(r#"{"jsonrpc":"2.0","method":"xr_session_start","params":{}}"#);
        queue.push("not json");
        queue.push(r#"{"jsonrpc":"2.0","method":"xr_select","params":{}}"#);
        app.update();

        assert_eq!(bridge.drain_events(), vec![XrEvent::SessionStarted, XrEvent::Select]);
        assert!(app.world().resource::<WebRpcInterface>().pending_responses().is_empty());
    }

    #[test]
    fn host_messages_apply_in_the_update_they_arrive() {
        use crate::config::ArConfig;
        use crate::engine::assets::navigation::ModelLocator;
        use crate::engine::core::frame_loop::ArCorePlugin;
        use crate::engine::xr::backend::XrDevice;
        use crate::tools::placement::SelectEvent;

        let bridge = HostBridge::new();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(ArConfig::default())
            .insert_resource(ModelLocator::new(Some(1)))
            .insert_resource(XrDevice::new(bridge.clone()))
            .insert_resource(bridge)
            .add_plugins(ArCorePlugin)
            .add_plugins(WebRpcPlugin);

        let queue = app.world().resource::<MessageQueue>().clone();
        queue.push(r#"{"jsonrpc":"2.0","method":"xr_session_start","params":{}}"#);
        queue.push(r#"{"jsonrpc":"2.0","method":"xr_select","params":{}}"#);
        app.update();

        assert!(app.world().resource::<TrackingSession>().is_host_active());
        let selects = app.world().resource::<Events<SelectEvent>>();
        assert_eq!(selects.iter_current_update_events().count(), 1);
    }

    #[test]
    fn bridge_requests_and_signals_become_notifications() {
        let mut bridge = HostBridge::new();
        bridge.is_session_supported(crate::engine::xr::backend::SessionMode::ImmersiveAr);

        let mut app = App::new();
        app.insert_resource(bridge)
            .init_resource::<WebRpcInterface>()
            .add_event::<PresentationSignal>()
            .add_systems(
                Update,
                (forward_bridge_commands, forward_presentation_signals).chain(),
            );
        app.world_mut().send_event(PresentationSignal::SessionStart);
        app.update();

        let notifications = app.world().resource::<WebRpcInterface>().pending_notifications();
        assert_eq!(notifications.len(), 2);
        assert_eq!(notifications[0].method, "xr_query_support");
        assert_eq!(notifications[0].params["mode"], "immersive-ar");
        assert_eq!(notifications[1].method, "presentation_signal");
        assert_eq!(notifications[1].params["signal"], "session_start");
    }
}
