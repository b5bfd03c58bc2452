//! One-shot asynchronous asset results and glTF model loading.
//!
//! A loader fills an [`AssetPromise`] exactly once; the frame loop polls the
//! matching [`AssetHandle`] each tick and takes the result when it lands.
//! Natively the work runs on a background thread, in the browser it runs on
//! the event loop through `fetch`.

use std::sync::{Arc, Mutex, MutexGuard};

use gltf::mesh::util::ReadIndices;

use crate::error::{DemoError, Result};
use crate::model::AnimationClip;
use crate::view::mesh::{Mesh, Vertex};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

enum LoadState<T> {
    Pending,
    Ready(Result<T>),
    Taken,
}

/// Consumer side of a pending asset
pub struct AssetHandle<T> {
    slot: Arc<Mutex<LoadState<T>>>,
}

/// Producer side of a pending asset
pub struct AssetPromise<T> {
    slot: Arc<Mutex<LoadState<T>>>,
}

fn lock<T>(slot: &Mutex<LoadState<T>>) -> MutexGuard<'_, LoadState<T>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<T> AssetHandle<T> {
    pub fn pending() -> (Self, AssetPromise<T>) {
        let slot = Arc::new(Mutex::new(LoadState::Pending));
        (Self { slot: slot.clone() }, AssetPromise { slot })
    }

    pub fn ready(result: Result<T>) -> Self {
        Self { slot: Arc::new(Mutex::new(LoadState::Ready(result))) }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*lock(&self.slot), LoadState::Pending)
    }

    /// Yields the result the first time it is available, `None` before and
    /// after that.
    pub fn take(&self) -> Option<Result<T>> {
        let mut state = lock(&self.slot);
        match std::mem::replace(&mut *state, LoadState::Taken) {
            LoadState::Ready(result) => Some(result),
            other => {
                *state = other;
                None
            }
        }
    }
}

impl<T> AssetPromise<T> {
    pub fn complete(self, result: Result<T>) {
        *lock(&self.slot) = LoadState::Ready(result);
    }
}

impl<T> Drop for AssetPromise<T> {
    fn drop(&mut self) {
        let mut state = lock(&self.slot);
        if matches!(*state, LoadState::Pending) {
            *state = LoadState::Ready(Err(DemoError::LoaderStopped));
        }
    }
}

/// Un-skinned geometry and clip metadata of a model
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub meshes: Vec<Mesh>,
    pub clips: Vec<AnimationClip>,
}

impl LoadedModel {
    pub fn clip(&self, index: usize) -> Result<AnimationClip> {
        self.clips.get(index).cloned().ok_or(DemoError::MissingClip {
            requested: index,
            available: self.clips.len(),
        })
    }
}

/// Parse a glTF document (`.glb` or `.gltf` with embedded buffers)
pub fn parse_model(bytes: &[u8]) -> Result<LoadedModel> {
    // Validation rejects every unknown required extension, so look for
    // Draco before it runs
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice_without_validation(bytes)?;
    if document.extensions_required().any(|ext| ext == DRACO_EXTENSION) {
        return Err(DemoError::DracoUnsupported);
    }
    let document = gltf::Document::from_json(document.into_json())?;
    let buffers = gltf::import_buffers(&document, None, blob)?;

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for prim in mesh.primitives() {
            let reader = prim.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(it) => it.collect(),
                None => continue,
            };
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(it) => it.collect(),
                None => vec![[0.0, 1.0, 0.0]; positions.len()],
            };
            let vertices = positions
                .iter()
                .zip(normals.iter())
                .map(|(pos, normal)| Vertex { pos: *pos, normal: *normal })
                .collect::<Vec<_>>();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(ReadIndices::U8(it)) => it.map(u32::from).collect(),
                Some(ReadIndices::U16(it)) => it.map(u32::from).collect(),
                Some(ReadIndices::U32(it)) => it.collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            meshes.push(Mesh { vertices, indices });
        }
    }

    let clips = document
        .animations()
        .enumerate()
        .map(|(i, anim)| {
            let duration = anim
                .channels()
                .filter_map(|channel| {
                    let reader = channel.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
                    reader.read_inputs().map(|times| times.fold(0.0f32, f32::max))
                })
                .fold(0.0f32, f32::max);
            AnimationClip {
                name: anim.name().map(str::to_string).unwrap_or_else(|| format!("clip{i}")),
                duration,
            }
        })
        .collect::<Vec<_>>();

    tracing::info!(
        meshes = meshes.len(),
        clips = ?clips.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        "parsed model"
    );
    Ok(LoadedModel { meshes, clips })
}

/// Start loading a model; the handle resolves on a later frame.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_model(path: &str) -> AssetHandle<LoadedModel> {
    let (handle, promise) = AssetHandle::pending();
    let path = std::path::PathBuf::from(path);
    tracing::info!(path = %path.display(), "loading model");
    let spawned = std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            let result = std::fs::read(&path)
                .map_err(DemoError::from)
                .and_then(|bytes| parse_model(&bytes));
            promise.complete(result);
        });
    if let Err(e) = spawned {
        // The promise was dropped with the closure, so the handle reports it
        tracing::error!("failed to spawn model loader: {e}");
    }
    handle
}

/// Start loading a model; the handle resolves on a later frame.
#[cfg(target_arch = "wasm32")]
pub fn load_model(url: &str) -> AssetHandle<LoadedModel> {
    let (handle, promise) = AssetHandle::pending();
    let url = url.to_string();
    tracing::info!(%url, "fetching model");
    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_bytes(&url).await.and_then(|bytes| parse_model(&bytes));
        promise.complete(result);
    });
    handle
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or_else(|| DemoError::Web("no global `window`".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(DemoError::Web(format!("GET {url} returned {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
