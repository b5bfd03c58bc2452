/// Errors raised while setting up a demo scene.
///
/// Nothing inside the per-frame update returns these; a failed model load
/// is logged and the scene keeps running without animation.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("model primitive uses unsupported Draco compression")]
    DracoUnsupported,
    #[error("asset loader stopped before producing a result")]
    LoaderStopped,
    #[error("model has {available} animation clips, clip {requested} requested")]
    MissingClip { requested: usize, available: usize },
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("unknown scene `{0}`")]
    UnknownScene(String),
    #[error("{0}")]
    Web(String),
}

pub type Result<T> = std::result::Result<T, DemoError>;

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for DemoError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        DemoError::Web(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DemoError> for wasm_bindgen::JsValue {
    fn from(err: DemoError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
