use super::handlers::AppState;
use super::types::*;
use crate::ai::{TextProcessingRequest, VisionProcessingRequest};
use crate::storage::UploadedDocument;
use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

const DEFAULT_FILENAME: &str = "file.bin";

/// Turns one inbound text frame into exactly one reply frame.
pub async fn handle_frame(state: &AppState, frame: &str) -> WsReply {
    let request: WsRequest = match serde_json::from_str(frame) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejected malformed frame: {}", e);
            return WsReply::error(e.to_string());
        }
    };

    let action = request.action.clone();
    match dispatch(state, request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Action {} failed: {}", action, e);
            WsReply::error(e.to_string())
        }
    }
}

async fn dispatch(state: &AppState, request: WsRequest) -> Result<WsReply> {
    debug!("Dispatching action: {}", request.action);

    match request.action.as_str() {
        "get_settings" => {
            let settings = state.store.get_settings().await?;
            Ok(WsReply::data("settings", settings))
        }
        "update_settings" => update_settings(state, request.payload).await,
        "list_documents" => {
            let documents = state.store.list_documents().await?;
            Ok(WsReply::data("documents", documents))
        }
        "upload_document" => upload_document(state, parse_payload(request.payload)?).await,
        "list_modules" => {
            let modules = state.store.list_data_modules().await?;
            Ok(WsReply::data("modules", modules))
        }
        "get_module" => {
            let ModuleRef { dmc } = parse_payload(request.payload)?;
            let module = state
                .store
                .get_data_module(&dmc)
                .await?
                .ok_or_else(|| Error::not_found(format!("data module {dmc}")))?;
            Ok(WsReply::data("module", module))
        }
        "save_module" => save_module(state, request.payload).await,
        "list_providers" => Ok(WsReply::data("providers", state.providers.listing())),
        "process_text" => process_text(state, parse_payload(request.payload)?).await,
        "process_image" => process_image(state, parse_payload(request.payload)?).await,
        _ => Ok(WsReply::error("unknown action")),
    }
}

fn parse_payload<T: DeserializeOwned>(payload: Option<Value>) -> Result<T> {
    let payload = payload.ok_or_else(|| Error::invalid_request("missing payload"))?;
    serde_json::from_value(payload).map_err(|e| Error::invalid_request(e.to_string()))
}

async fn update_settings(state: &AppState, payload: Option<Value>) -> Result<WsReply> {
    let settings = match payload {
        Some(settings @ Value::Object(_)) => settings,
        _ => return Err(Error::invalid_request("settings payload must be an object")),
    };

    if let Some(name) = settings.get("text_provider").and_then(Value::as_str) {
        state.providers.text(name)?;
    }
    if let Some(name) = settings.get("vision_provider").and_then(Value::as_str) {
        state.providers.vision(name)?;
    }

    state.store.save_settings(&settings).await?;
    info!("Settings updated");
    Ok(WsReply::data("settings", settings))
}

async fn upload_document(state: &AppState, payload: UploadPayload) -> Result<WsReply> {
    let content = STANDARD.decode(payload.content.as_bytes())?;
    let filename = payload
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());

    let mut document = UploadedDocument::new(filename, String::new(), &content);
    let path = state
        .upload_dir
        .join(format!("{}_{}", document.id, document.filename));

    tokio::fs::create_dir_all(&state.upload_dir).await?;
    tokio::fs::write(&path, &content).await?;
    document.file_path = path.to_string_lossy().into_owned();

    state
        .store
        .insert_document(&document.id, &serde_json::to_value(&document)?)
        .await?;

    info!(
        "Uploaded document {} ({} bytes) as {}",
        document.filename, document.file_size, document.id
    );
    Ok(WsReply::data("uploaded", document))
}

async fn save_module(state: &AppState, payload: Option<Value>) -> Result<WsReply> {
    let module = payload.ok_or_else(|| Error::invalid_request("missing payload"))?;
    let dmc = module
        .get("dmc")
        .and_then(Value::as_str)
        .filter(|dmc| !dmc.is_empty())
        .ok_or_else(|| Error::invalid_request("data module requires a non-empty dmc"))?
        .to_string();

    state.store.insert_data_module(&dmc, &module).await?;
    info!("Saved data module {}", dmc);
    Ok(WsReply::data("module_saved", module))
}

/// Provider name stored in the settings under `key`, if any.
async fn selected_provider(state: &AppState, key: &str) -> Result<Option<String>> {
    Ok(state
        .store
        .get_settings()
        .await?
        .and_then(|settings| settings.get(key).and_then(Value::as_str).map(str::to_string)))
}

async fn process_text(state: &AppState, payload: TextTaskPayload) -> Result<WsReply> {
    let name = match payload.provider {
        Some(name) => Some(name),
        None => selected_provider(state, "text_provider").await?,
    };
    let provider = state.providers.text_or_default(name.as_deref())?;

    let request = TextProcessingRequest {
        text: payload.text,
        task: payload.task,
        context: payload.context,
    };
    let response = provider.process(request).await;
    Ok(WsReply::data("text_result", response))
}

async fn process_image(state: &AppState, payload: ImageTaskPayload) -> Result<WsReply> {
    let name = match payload.provider {
        Some(name) => Some(name),
        None => selected_provider(state, "vision_provider").await?,
    };
    let provider = state.providers.vision_or_default(name.as_deref())?;

    let mut request = VisionProcessingRequest::new(payload.task, payload.image_data);
    if let Some(media_type) = payload.media_type {
        request.media_type = media_type;
    }
    request.context = payload.context;

    let response = provider.process(request).await;
    Ok(WsReply::data("vision_result", response))
}
