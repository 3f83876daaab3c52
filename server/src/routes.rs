//! HTTP route handlers for the dataset and applet API.
//!
//! Store calls take blocking locks, write files and may run slow layouts,
//! so every handler hands its work to `spawn_blocking`.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use hpg_store::{
    EdgeId, FaceId, LayoutAlgorithm, MoveKind, MoveRequest, ProjectionKind, StoreError, StoreResult,
    VertexId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::{AppState, ChangeEvent, DatasetGateway};

type ApiResult<T> = Result<T, ApiError>;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/datasets", get(list_datasets).post(create_dataset))
        .route("/datasets/duplicate", post(duplicate_dataset))
        .route("/datasets/{name}", get(get_dataset).delete(delete_dataset))
        .route("/datasetsApplet/getData/{name}", get(datasets_applet_data))
        .route("/editorApplet/getData/{name}", get(editor_applet_data))
        .route("/editorApplet/saveData/{name}", post(editor_save))
        .route("/editorApplet/tutteLayout/{name}", post(editor_tutte_layout))
        .route("/analyzerApplet/getData/{name}", get(analyzer_applet_data))
        .route("/analyzerApplet/tutte_layout", post(analyzer_tutte_layout))
        .route("/analyzerApplet/lloyd_layout", post(analyzer_lloyd_layout))
        .route("/analyzerApplet/cycle_face", post(analyzer_cycle_face))
        .route("/analyzerApplet/square_move", post(analyzer_square_move))
        .route(
            "/analyzerApplet/separation_labeling",
            post(analyzer_separation_labeling),
        )
        .route("/analyzerApplet/get_trip", post(analyzer_get_trip))
        .route("/analyzerApplet/get_edge_trips", post(analyzer_get_edge_trips))
}

async fn health() -> &'static str {
    "ok"
}

/// Run `f` on the blocking pool with a handle to the gateway.
async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(DatasetGateway) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let gateway = state.gateway.clone();
    tokio::task::spawn_blocking(move || f(gateway))
        .await
        .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
        .map_err(ApiError::from)
}

/// Parse a JSON body leniently: an empty body reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(raw)
        .map_err(|err| StoreError::invalid(format!("malformed request body: {err}")).into())
}

fn named(name: &str, data: Value) -> Json<Value> {
    Json(json!({ "name": name, "data": data }))
}

/// GET /datasets
async fn list_datasets(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let names = blocking(&state, |gateway| Ok(gateway.store().list())).await?;
    Ok(Json(json!({ "datasets": names })))
}

fn one() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct CreateRequest {
    name: Option<String>,
    #[serde(rename = "boundaryVertices", default = "one")]
    boundary_vertices: usize,
}

/// POST /datasets
async fn create_dataset(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: CreateRequest = parse_body(&body)?;
    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StoreError::invalid("missing 'name'"))?;
    let boundary = request.boundary_vertices;
    let data = {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.store().create(&name, boundary)).await?
    };
    state.publish(ChangeEvent::DatasetCreated { name: name.clone() });
    Ok((StatusCode::CREATED, named(&name, data)))
}

#[derive(Debug, Deserialize)]
struct DuplicateRequest {
    #[serde(rename = "sourceName")]
    source_name: Option<String>,
    #[serde(rename = "newName")]
    new_name: Option<String>,
}

/// POST /datasets/duplicate
async fn duplicate_dataset(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let request: DuplicateRequest = parse_body(&body)?;
    let source = request
        .source_name
        .ok_or_else(|| StoreError::invalid("missing 'sourceName'"))?;
    let target = request
        .new_name
        .ok_or_else(|| StoreError::invalid("missing 'newName'"))?;
    {
        let (source, target) = (source.clone(), target.clone());
        blocking(&state, move |gateway| gateway.store().duplicate(&source, &target)).await?;
    }
    state.publish(ChangeEvent::DatasetCreated {
        name: target.clone(),
    });
    Ok((
        StatusCode::CREATED,
        Json(json!({ "sourceName": source, "newName": target })),
    ))
}

async fn projected(state: &AppState, name: String, kind: ProjectionKind) -> ApiResult<Json<Value>> {
    let data = {
        let name = name.clone();
        blocking(state, move |gateway| gateway.store().project(&name, kind)).await?
    };
    Ok(named(&name, data))
}

/// GET /datasets/{name}
async fn get_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    projected(&state, name, ProjectionKind::Raw).await
}

/// DELETE /datasets/{name}
async fn delete_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.store().remove(&name)).await?;
    }
    state.publish(ChangeEvent::DatasetDeleted { name: name.clone() });
    Ok(Json(json!({ "deleted": name })))
}

/// GET /datasetsApplet/getData/{name}
async fn datasets_applet_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    projected(&state, name, ProjectionKind::Raw).await
}

/// GET /editorApplet/getData/{name}
async fn editor_applet_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    projected(&state, name, ProjectionKind::Raw).await
}

/// GET /analyzerApplet/getData/{name}
async fn analyzer_applet_data(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    projected(&state, name, ProjectionKind::Analysis).await
}

/// POST /editorApplet/saveData/{name} - overwrite or create from a full record.
async fn editor_save(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let record: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        parse_body(&body)?
    };
    let existed = {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.save_full(&name, &record)).await?
    };
    let event = if existed {
        ChangeEvent::DatasetUpdated { name: name.clone() }
    } else {
        ChangeEvent::DatasetCreated { name: name.clone() }
    };
    state.publish(event);
    Ok(Json(json!({ "name": name, "message": "Saved successfully" })))
}

/// POST /editorApplet/tutteLayout/{name} - answered with the raw projection.
async fn editor_tutte_layout(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let data = {
        let name = name.clone();
        blocking(&state, move |gateway| {
            gateway.apply_layout_as(&name, LayoutAlgorithm::Tutte, ProjectionKind::Raw)
        })
        .await?
    };
    state.publish(ChangeEvent::DatasetUpdated { name: name.clone() });
    Ok(named(&name, data))
}

/// Body shared by the analyzer endpoints. Each endpoint reads the fields it
/// needs and reports the missing ones.
#[derive(Debug, Default, Deserialize)]
struct AnalyzerRequest {
    dataset: Option<String>,
    face_id: Option<FaceId>,
    #[serde(default)]
    inverse: bool,
    #[serde(rename = "vertexId")]
    vertex_id: Option<VertexId>,
    #[serde(rename = "tripIndex")]
    trip_index: Option<usize>,
    #[serde(rename = "edgeId")]
    edge_id: Option<EdgeId>,
}

impl AnalyzerRequest {
    fn parse(body: &[u8]) -> ApiResult<(String, Self)> {
        let mut request: Self = parse_body(body)?;
        let dataset = request
            .dataset
            .take()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StoreError::invalid("missing 'dataset' name in request"))?;
        Ok((dataset, request))
    }
}

async fn analyzer_layout(
    state: AppState,
    body: Bytes,
    algorithm: LayoutAlgorithm,
) -> ApiResult<Json<Value>> {
    let (name, _) = AnalyzerRequest::parse(&body)?;
    let data = {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.apply_layout(&name, algorithm)).await?
    };
    state.publish(ChangeEvent::DatasetUpdated { name: name.clone() });
    Ok(named(&name, data))
}

/// POST /analyzerApplet/tutte_layout
async fn analyzer_tutte_layout(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    analyzer_layout(state, body, LayoutAlgorithm::Tutte).await
}

/// POST /analyzerApplet/lloyd_layout
async fn analyzer_lloyd_layout(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    analyzer_layout(state, body, LayoutAlgorithm::Lloyd).await
}

async fn analyzer_move(state: AppState, name: String, request: MoveRequest) -> ApiResult<Json<Value>> {
    let outcome = {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.propose_move(&name, request)).await?
    };
    if outcome.applied {
        state.publish(ChangeEvent::DatasetUpdated { name: name.clone() });
    }
    Ok(Json(json!({
        "name": name,
        "data": outcome.analysis,
        "applied": outcome.applied,
    })))
}

/// POST /analyzerApplet/cycle_face
async fn analyzer_cycle_face(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let (name, request) = AnalyzerRequest::parse(&body)?;
    let request = MoveRequest {
        kind: MoveKind::Cycle,
        face: request.face_id,
        inverse: request.inverse,
    };
    analyzer_move(state, name, request).await
}

/// POST /analyzerApplet/square_move
async fn analyzer_square_move(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let (name, request) = AnalyzerRequest::parse(&body)?;
    let request = MoveRequest {
        kind: MoveKind::Square,
        face: request.face_id,
        inverse: false,
    };
    analyzer_move(state, name, request).await
}

/// POST /analyzerApplet/separation_labeling
async fn analyzer_separation_labeling(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let (name, request) = AnalyzerRequest::parse(&body)?;
    let data = {
        let name = name.clone();
        blocking(&state, move |gateway| gateway.apply_labeling(&name, request.face_id)).await?
    };
    state.publish(ChangeEvent::DatasetUpdated { name: name.clone() });
    Ok(named(&name, data))
}

/// POST /analyzerApplet/get_trip - read-only.
async fn analyzer_get_trip(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let (name, request) = AnalyzerRequest::parse(&body)?;
    let trip = blocking(&state, move |gateway| {
        gateway.query_trip(&name, request.vertex_id, request.trip_index)
    })
    .await?;
    Ok(Json(json!({ "trip": trip })))
}

/// POST /analyzerApplet/get_edge_trips - read-only.
async fn analyzer_get_edge_trips(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let (name, request) = AnalyzerRequest::parse(&body)?;
    let trips = blocking(&state, move |gateway| {
        gateway.query_edge_trips(&name, request.edge_id)
    })
    .await?;
    Ok(Json(json!({ "trips": trips })))
}
