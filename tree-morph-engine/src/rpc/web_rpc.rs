use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::config::TreeConfig;
use crate::engine::scene::audio::ToggleAudio;
use crate::engine::scene::foliage::FoliageMorph;
use crate::engine::scene::frames::{FrameFocus, FrameFocusRequest};
use crate::engine::scene_mode::{MorphSet, SceneMode, ToggleSceneMode};
use crate::engine::systems::fps_tracking::smoothed_fps;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Scene state visible to the host, captured once per batch of requests and
/// advanced as each request in the batch is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStatus {
    pub mode: SceneMode,
    pub focused_frame: Option<usize>,
    pub morph_factor: f32,
    pub frame_count: usize,
    pub fps: f32,
}

/// Side effect requested by an RPC call, turned into an event by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCommand {
    ToggleMode,
    Focus(FrameFocusRequest),
    ToggleAudio,
}

/// Queue of outgoing messages to the parent page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage bridge for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    (process_incoming_messages, handle_rpc_messages)
                        .chain()
                        .before(MorphSet::Input),
                    send_outgoing_messages.after(MorphSet::Sync),
                ),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC bridge disabled");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // JS owns the closure from here on.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mode: Res<SceneMode>,
    focus: Res<FrameFocus>,
    morph: Option<Res<FoliageMorph>>,
    config: Option<Res<TreeConfig>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut mode_events: EventWriter<ToggleSceneMode>,
    mut focus_events: EventWriter<FrameFocusRequest>,
    mut audio_events: EventWriter<ToggleAudio>,
) {
    if events.is_empty() {
        return;
    }

    let mut status = SceneStatus {
        mode: *mode,
        focused_frame: focus.focused(),
        morph_factor: morph.map_or(0.0, |m| m.factor),
        frame_count: config.map_or(0, |c| c.photo_frame_count),
        fps: smoothed_fps(&diagnostics).unwrap_or(0.0),
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("RPC {}", request.method);
                let mut commands = Vec::new();
                if let Some(response) = handle_rpc_request(&request, &mut status, &mut commands) {
                    rpc_interface.queue_response(response);
                }
                for command in commands {
                    match command {
                        RpcCommand::ToggleMode => {
                            mode_events.write(ToggleSceneMode);
                        }
                        RpcCommand::Focus(request) => {
                            focus_events.write(request);
                        }
                        RpcCommand::ToggleAudio => {
                            audio_events.write(ToggleAudio);
                        }
                    }
                }
            }
            Err(parse_error) => {
                warn!("Dropping malformed RPC message: {}", parse_error);
            }
        }
    }
}

/// Answer one request against a status snapshot.
///
/// Actions are appended to `commands` whether or not the request carries an
/// id; only requests with an id get a response. Each action is also folded
/// into `status`, so later requests in the same batch see its effect.
pub fn handle_rpc_request(
    request: &RpcRequest,
    status: &mut SceneStatus,
    commands: &mut Vec<RpcCommand>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "toggle_mode" => {
            commands.push(RpcCommand::ToggleMode);
            status.mode = status.mode.toggled();
            Ok(serde_json::json!({
                "success": true,
                "mode": status.mode.as_str()
            }))
        }
        "select_frame" => handle_select_frame(&request.params, status, commands),
        "deselect_frame" => {
            commands.push(RpcCommand::Focus(FrameFocusRequest::Deselect));
            status.focused_frame = None;
            Ok(serde_json::json!({ "success": true }))
        }
        "toggle_audio" => {
            commands.push(RpcCommand::ToggleAudio);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_state" => Ok(serde_json::json!({
            "mode": status.mode.as_str(),
            "focused_frame": status.focused_frame,
            "morph_factor": status.morph_factor
        })),
        "get_fps" => Ok(serde_json::json!({ "fps": status.fps })),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    })
}

fn handle_select_frame(
    params: &serde_json::Value,
    status: &mut SceneStatus,
    commands: &mut Vec<RpcCommand>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SelectFrameParams {
        frame_id: usize,
    }

    let parsed = serde_json::from_value::<SelectFrameParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'frame_id' parameter"))?;

    if parsed.frame_id >= status.frame_count {
        return Err(RpcError::invalid_params(&format!(
            "Unknown frame: {} (scene has {})",
            parsed.frame_id, status.frame_count
        )));
    }

    commands.push(RpcCommand::Focus(FrameFocusRequest::Select(parsed.frame_id)));
    status.focused_frame = Some(parsed.frame_id);
    Ok(serde_json::json!({
        "success": true,
        "frame_id": parsed.frame_id
    }))
}

/// Responses go out after notifications so a host sees state changes first.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

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

impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> SceneStatus {
        SceneStatus {
            mode: SceneMode::Scattered,
            focused_frame: None,
            morph_factor: 0.25,
            frame_count: 6,
            fps: 60.0,
        }
    }

    fn request(json: &str) -> RpcRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn toggle_mode_queues_one_command() {
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"toggle_mode","id":1}"#),
            &mut status(),
            &mut commands,
        )
        .unwrap();
        assert_eq!(commands, vec![RpcCommand::ToggleMode]);
        assert_eq!(response.result.unwrap()["mode"], "tree_shape");
    }

    #[test]
    fn notification_acts_without_response() {
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"deselect_frame"}"#),
            &mut status(),
            &mut commands,
        );
        assert!(response.is_none());
        assert_eq!(commands, vec![RpcCommand::Focus(FrameFocusRequest::Deselect)]);
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"explode","id":"a"}"#),
            &mut status(),
            &mut commands,
        )
        .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
        assert!(commands.is_empty());
    }

    #[test]
    fn select_frame_validates_params() {
        let mut commands = Vec::new();
        for bad in [
            r#"{"jsonrpc":"2.0","method":"select_frame","params":{},"id":2}"#,
            r#"{"jsonrpc":"2.0","method":"select_frame","params":{"frame_id":9},"id":2}"#,
        ] {
            let response =
                handle_rpc_request(&request(bad), &mut status(), &mut commands).unwrap();
            assert_eq!(response.error.unwrap().code, -32602);
        }
        assert!(commands.is_empty());

        handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"select_frame","params":{"frame_id":3},"id":3}"#),
            &mut status(),
            &mut commands,
        );
        assert_eq!(commands, vec![RpcCommand::Focus(FrameFocusRequest::Select(3))]);
    }

    #[test]
    fn get_state_reports_snapshot() {
        let mut commands = Vec::new();
        let response = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"get_state","id":4}"#),
            &mut status(),
            &mut commands,
        )
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["mode"], "scattered");
        assert!(result["focused_frame"].is_null());
        assert_eq!(result["morph_factor"], 0.25);
    }

    #[test]
    fn toggles_in_one_batch_report_the_final_mode() {
        let mut status = status();
        let mut commands = Vec::new();
        let toggle = request(r#"{"jsonrpc":"2.0","method":"toggle_mode","id":5}"#);
        let first = handle_rpc_request(&toggle, &mut status, &mut commands).unwrap();
        let second = handle_rpc_request(&toggle, &mut status, &mut commands).unwrap();
        assert_eq!(first.result.unwrap()["mode"], "tree_shape");
        assert_eq!(second.result.unwrap()["mode"], "scattered");
        assert_eq!(commands, vec![RpcCommand::ToggleMode; 2]);

        let state = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"get_state","id":6}"#),
            &mut status,
            &mut commands,
        )
        .unwrap();
        assert_eq!(state.result.unwrap()["mode"], "scattered");
    }

    #[test]
    fn focus_changes_are_visible_to_later_requests() {
        let mut status = status();
        let mut commands = Vec::new();
        handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"select_frame","params":{"frame_id":2}}"#),
            &mut status,
            &mut commands,
        );
        let state = handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"get_state","id":7}"#),
            &mut status,
            &mut commands,
        )
        .unwrap();
        assert_eq!(state.result.unwrap()["focused_frame"], 2);

        handle_rpc_request(
            &request(r#"{"jsonrpc":"2.0","method":"deselect_frame"}"#),
            &mut status,
            &mut commands,
        );
        assert_eq!(status.focused_frame, None);
    }
}
