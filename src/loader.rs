//! # Asset Loading
//!
//! Fetches one model file and decodes it into plain mesh data off the render
//! thread. A load is started with [`ModelLoader::spawn`], which returns a
//! [`PendingLoad`]. The render loop polls it once per frame with
//! [`PendingLoad::try_complete`]; it can also be awaited as a future.
//!
//! ## Supported formats
//!
//! - `.glb` / `.gltf`: every mesh of the default scene, node transforms baked in
//! - `.obj`: triangulated, with `.mtl` diffuse colors when the file is local

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};
use futures::channel::oneshot;
use log::{debug, error, info};

use crate::error::{AssetLoadError, FetchError, LoadFailureCause};
use crate::gfx::geometry::BoundingExtent;
use crate::gfx::scene::{Mesh, Object};

const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const READ_CHUNK: usize = 64 * 1024;
/// Upper bound on the up-front buffer; a reported length is only a hint
const MAX_PREALLOC: u64 = 16 * READ_CHUNK as u64;

/// Scheme of the place an asset is fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    File,
    Http,
}

/// A model path resolved against the configured asset base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    origin: Origin,
    uri: String,
}

impl AssetLocation {
    /// Joins `path` onto `base`.
    ///
    /// `base` is an `http://`/`https://` URL, a `file://` URL or a plain
    /// directory. An absolute URL in `path` wins over the base.
    pub fn resolve(base: &str, path: &str) -> Self {
        if is_http(path) {
            return Self {
                origin: Origin::Http,
                uri: path.to_string(),
            };
        }

        if is_http(base) {
            let uri = format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches("./").trim_start_matches('/')
            );
            return Self {
                origin: Origin::Http,
                uri,
            };
        }

        let directory = base.strip_prefix("file://").unwrap_or(base);
        let joined = Path::new(directory).join(path);
        Self {
            origin: Origin::File,
            uri: joined.to_string_lossy().into_owned(),
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Lowercased file extension, ignoring any URL query or fragment
    pub fn extension(&self) -> Option<String> {
        let path = match self.origin {
            Origin::Http => self.uri.split(['?', '#']).next().unwrap_or(&self.uri),
            Origin::File => &self.uri,
        };
        Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// Directory of a local asset, used to find sidecar files
    pub fn parent_dir(&self) -> Option<PathBuf> {
        match self.origin {
            Origin::File => Path::new(&self.uri).parent().map(Path::to_path_buf),
            Origin::Http => None,
        }
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

fn is_http(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Bytes received so far and, when known, the total size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    /// Completed fraction in `0.0..=1.0`, if the total is known
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).min(1.0) as f32),
            _ => None,
        }
    }

    pub fn percent(&self) -> Option<u32> {
        self.fraction().map(|f| (f * 100.0).round() as u32)
    }
}

/// Source of asset bytes.
///
/// Implementations run on the loader thread and may block.
pub trait AssetFetcher: Send + Sync {
    fn fetch(
        &self,
        location: &AssetLocation,
        progress: &dyn Fn(LoadProgress),
    ) -> Result<Vec<u8>, FetchError>;
}

/// Reads local files with `std::fs` and remote ones with a blocking HTTP GET
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemeFetcher;

impl AssetFetcher for SchemeFetcher {
    fn fetch(
        &self,
        location: &AssetLocation,
        progress: &dyn Fn(LoadProgress),
    ) -> Result<Vec<u8>, FetchError> {
        match location.origin() {
            Origin::File => {
                let file = std::fs::File::open(location.as_str())?;
                let total = file.metadata().ok().map(|m| m.len());
                Ok(read_with_progress(file, total, progress)?)
            }
            Origin::Http => {
                let response = reqwest::blocking::get(location.as_str())?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }
                let total = response.content_length();
                Ok(read_with_progress(response, total, progress)?)
            }
        }
    }
}

/// Reads everything from `reader`, reporting progress after every chunk
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    progress: &dyn Fn(LoadProgress),
) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(total.map_or(0, |t| t.min(MAX_PREALLOC) as usize));
    let mut chunk = vec![0u8; READ_CHUNK];

    progress(LoadProgress { loaded: 0, total });
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        bytes.extend_from_slice(&chunk[..read]);
        progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}

/// One decoded triangle mesh, positions already in model space
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub color: [f32; 4],
}

impl MeshData {
    /// Builds a mesh, computing normals when the source has none
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Option<Vec<[f32; 3]>>,
        indices: Vec<u32>,
        color: [f32; 4],
    ) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => Mesh::calculate_vertex_normals(&positions, &indices),
        };
        Self {
            positions,
            normals,
            indices,
            color,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A decoded model, independent of any GPU state so it can cross threads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }

    pub fn extent(&self) -> BoundingExtent {
        BoundingExtent::from_points(self.meshes.iter().flat_map(|m| m.positions.iter().copied()))
    }

    pub fn into_object(self, name: impl Into<String>) -> Object {
        let meshes = self
            .meshes
            .into_iter()
            .map(|m| Mesh::new(&m.positions, &m.normals, m.indices, m.color))
            .collect();
        Object::new(name, meshes)
    }
}

/// Decodes model bytes based on the file extension.
///
/// `base_dir` is where sidecar files (external glTF buffers, OBJ material
/// libraries) are looked up; without it those are skipped or rejected.
pub fn decode_model(
    bytes: &[u8],
    extension: Option<&str>,
    base_dir: Option<&Path>,
) -> Result<ModelData, LoadFailureCause> {
    let model = match extension {
        Some("glb") | Some("gltf") => decode_gltf(bytes, base_dir)?,
        Some("obj") => decode_obj(bytes, base_dir)?,
        other => {
            return Err(LoadFailureCause::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            ))
        }
    };

    if model.triangle_count() == 0 {
        return Err(LoadFailureCause::EmptyModel);
    }
    Ok(model)
}

fn decode_gltf(bytes: &[u8], base_dir: Option<&Path>) -> Result<ModelData, LoadFailureCause> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(|e| LoadFailureCause::Decode(e.to_string()))?;
    let buffers = gltf::import_buffers(&document, base_dir, blob)
        .map_err(|e| LoadFailureCause::Decode(e.to_string()))?;

    let mut model = ModelData::default();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Matrix4::identity(), &buffers, &mut model)?;
            }
        }
        // Scene-less files still carry meshes worth showing
        None => {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Matrix4::identity(), &buffers, &mut model)?;
            }
        }
    }
    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) -> Result<(), LoadFailureCause> {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, model)?;
    }
    for child in node.children() {
        collect_node(&child, world, buffers, model)?;
    }
    Ok(())
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) -> Result<(), LoadFailureCause> {
    let normal_matrix = normal_matrix(&world);

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let Some(positions) = reader.read_positions() else {
            return Err(LoadFailureCause::Decode(format!(
                "primitive {} of mesh {} has no positions",
                primitive.index(),
                mesh.index()
            )));
        };

        let positions: Vec<[f32; 3]> = positions
            .map(|p| {
                let moved = world * Vector4::new(p[0], p[1], p[2], 1.0);
                [moved.x, moved.y, moved.z]
            })
            .collect();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| {
            iter.map(|n| {
                let turned = normal_matrix * Vector3::from(n);
                normalize_or_up(turned)
            })
            .collect()
        });
        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        model
            .meshes
            .push(MeshData::new(positions, normals, indices, color));
    }
    Ok(())
}

/// Inverse transpose of the upper 3x3, so normals survive non-uniform scale
fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::new(
        world.x.x, world.x.y, world.x.z, world.y.x, world.y.y, world.y.z, world.z.x, world.z.y,
        world.z.z,
    );
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

fn normalize_or_up(v: Vector3<f32>) -> [f32; 3] {
    if v.magnitude2() > 0.0 {
        v.normalize().into()
    } else {
        [0.0, 1.0, 0.0]
    }
}

fn decode_obj(bytes: &[u8], base_dir: Option<&Path>) -> Result<ModelData, LoadFailureCause> {
    let mut reader = BufReader::new(Cursor::new(bytes));
    let (models, materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |mtl_path| match base_dir {
            Some(dir) => tobj::load_mtl(dir.join(mtl_path)),
            None => Err(tobj::LoadError::OpenFileFailed),
        },
    )
    .map_err(|e| LoadFailureCause::Decode(e.to_string()))?;

    let materials = materials.unwrap_or_else(|_| {
        debug!("No MTL file found, using default colors");
        Vec::new()
    });

    let meshes = models
        .into_iter()
        .map(|m| {
            let mesh = m.mesh;
            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|mtl| {
                    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
                    [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)]
                })
                .unwrap_or(DEFAULT_COLOR);

            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let normals = (!mesh.normals.is_empty()).then(|| {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            });
            MeshData::new(positions, normals, mesh.indices, color)
        })
        .collect();

    Ok(ModelData { meshes })
}

/// Fetches and decodes one asset on the calling thread
pub fn load_blocking(
    fetcher: &dyn AssetFetcher,
    location: &AssetLocation,
    progress: &dyn Fn(LoadProgress),
) -> Result<ModelData, AssetLoadError> {
    let bytes = fetcher
        .fetch(location, progress)
        .map_err(|e| AssetLoadError::new(location.clone(), e))?;
    let extension = location.extension();
    let base_dir = location.parent_dir();
    decode_model(&bytes, extension.as_deref(), base_dir.as_deref())
        .map_err(|cause| AssetLoadError::new(location.clone(), cause))
}

/// Starts loads on a background thread
#[derive(Clone)]
pub struct ModelLoader {
    fetcher: Arc<dyn AssetFetcher>,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(Arc::new(SchemeFetcher))
    }
}

impl ModelLoader {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { fetcher }
    }

    /// Starts loading `location` and returns immediately.
    ///
    /// If the worker thread can't be started the returned load resolves to
    /// an [`LoadFailureCause::Interrupted`] failure on the first poll.
    pub fn spawn(&self, location: AssetLocation) -> PendingLoad {
        let (sender, receiver) = oneshot::channel();
        let progress = Arc::new(Mutex::new(LoadProgress::default()));

        let fetcher = Arc::clone(&self.fetcher);
        let worker_location = location.clone();
        let worker_progress = Arc::clone(&progress);

        info!("Loading model from {location}");
        let spawned = std::thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                let last_percent = Cell::new(None);
                let report = |update: LoadProgress| {
                    if let Ok(mut shared) = worker_progress.lock() {
                        *shared = update;
                    }
                    let percent = update.percent();
                    if percent != last_percent.replace(percent) {
                        if let Some(percent) = percent {
                            debug!("{percent}% loaded");
                        }
                    }
                };
                let result = load_blocking(fetcher.as_ref(), &worker_location, &report);
                // The receiver is gone when the controller was dropped mid-load
                let _ = sender.send(result);
            });

        if let Err(e) = spawned {
            error!("Failed to start loader thread: {e}");
        }

        PendingLoad {
            location,
            receiver,
            progress,
        }
    }
}

/// An in-flight load
pub struct PendingLoad {
    location: AssetLocation,
    receiver: oneshot::Receiver<Result<ModelData, AssetLoadError>>,
    progress: Arc<Mutex<LoadProgress>>,
}

impl PendingLoad {
    pub fn location(&self) -> &AssetLocation {
        &self.location
    }

    pub fn progress(&self) -> LoadProgress {
        match self.progress.lock() {
            Ok(progress) => *progress,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Returns the result once the worker has finished, without blocking
    pub fn try_complete(&mut self) -> Option<Result<ModelData, AssetLoadError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(self.interrupted())),
        }
    }

    fn interrupted(&self) -> AssetLoadError {
        AssetLoadError::new(self.location.clone(), LoadFailureCause::Interrupted)
    }
}

impl Future for PendingLoad {
    type Output = Result<ModelData, AssetLoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(self.interrupted())),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves assets from memory; unknown paths fail like a missing file
    #[derive(Default)]
    pub struct MemoryFetcher {
        pub files: HashMap<String, Vec<u8>>,
    }

    impl AssetFetcher for MemoryFetcher {
        fn fetch(
            &self,
            location: &AssetLocation,
            progress: &dyn Fn(LoadProgress),
        ) -> Result<Vec<u8>, FetchError> {
            match self.files.get(location.as_str()) {
                Some(bytes) => {
                    Ok(read_with_progress(&bytes[..], Some(bytes.len() as u64), progress)?)
                }
                None => Err(FetchError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{location} not found"),
                ))),
            }
        }
    }

    /// A 2 x 3 x 1 box whose corner sits at (10, 10, 10)
    pub const BOX_OBJ: &str = "\
o box
v 10 10 10
v 12 10 10
v 12 13 10
v 10 13 10
v 10 10 11
v 12 10 11
v 12 13 11
v 10 13 11
f 1 2 3 4
f 5 8 7 6
f 1 5 6 2
f 2 6 7 3
f 3 7 8 4
f 5 1 4 8
";

    /// Builds a binary glTF with one triangle under a translated node
    pub fn triangle_glb(translation: [f32; 3]) -> Vec<u8> {
        let mut bin = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u32, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"nodes":[{{"mesh":0,"translation":[{},{},{}]}}],"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"buffers":[{{"byteLength":48}}],"bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36}},{{"buffer":0,"byteOffset":36,"byteLength":12}}],"accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0,0,0],"max":[1,2,0]}},{{"bufferView":1,"componentType":5125,"count":3,"type":"SCALAR"}}]}}"#,
            translation[0], translation[1], translation[2]
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn test_resolve_file_and_http_locations() {
        let local = AssetLocation::resolve("site", "assets/3d/bk.glb");
        assert_eq!(local.origin(), Origin::File);
        assert_eq!(Path::new(local.as_str()), Path::new("site/assets/3d/bk.glb"));

        let file_url = AssetLocation::resolve("file:///srv/site", "bk.glb");
        assert_eq!(file_url.origin(), Origin::File);
        assert_eq!(Path::new(file_url.as_str()), Path::new("/srv/site/bk.glb"));

        let remote = AssetLocation::resolve("http://localhost:8000/", "./assets/3d/bk.glb");
        assert_eq!(remote.origin(), Origin::Http);
        assert_eq!(remote.as_str(), "http://localhost:8000/assets/3d/bk.glb");

        let absolute = AssetLocation::resolve(".", "HTTPS://cdn.example.com/bk.glb");
        assert_eq!(absolute.origin(), Origin::Http);
    }

    #[test]
    fn test_extension_ignores_query() {
        let remote = AssetLocation::resolve("https://cdn.example.com", "m/bk.GLB?v=3#top");
        assert_eq!(remote.extension().as_deref(), Some("glb"));
        assert_eq!(AssetLocation::resolve(".", "noext").extension(), None);
    }

    #[test]
    fn test_progress_fraction() {
        let half = LoadProgress {
            loaded: 50,
            total: Some(100),
        };
        assert_eq!(half.percent(), Some(50));
        assert_eq!(LoadProgress { loaded: 5, total: None }.fraction(), None);
        assert_eq!(LoadProgress { loaded: 5, total: Some(0) }.fraction(), None);
    }

    #[test]
    fn test_read_with_progress_reports_every_chunk() {
        let data = vec![7u8; READ_CHUNK * 2 + 10];
        let seen = Mutex::new(Vec::new());
        let bytes = read_with_progress(&data[..], Some(data.len() as u64), &|p: LoadProgress| {
            seen.lock().unwrap().push(p.loaded)
        })
        .unwrap();

        assert_eq!(bytes, data);
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&(data.len() as u64)));
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_read_with_progress_ignores_bogus_length() {
        let total = Some(u64::MAX / 2);
        let last = Mutex::new(None);
        let bytes = read_with_progress(&b"abc"[..], total, &|p: LoadProgress| {
            *last.lock().unwrap() = Some(p)
        })
        .unwrap();

        assert_eq!(bytes, b"abc");
        assert!(bytes.capacity() as u64 <= 2 * MAX_PREALLOC);
        assert_eq!(last.into_inner().unwrap(), Some(LoadProgress { loaded: 3, total }));
    }

    #[test]
    fn test_decode_obj_box() {
        let model = decode_model(BOX_OBJ.as_bytes(), Some("obj"), None).unwrap();
        assert_eq!(model.triangle_count(), 12);

        let extent = model.extent();
        assert_eq!(extent.size(), Vector3::new(2.0, 3.0, 1.0));
        assert_eq!(extent.center(), Vector3::new(11.0, 11.5, 10.5));

        let mesh = &model.meshes[0];
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_decode_glb_bakes_node_transform() {
        let glb = triangle_glb([5.0, 0.0, 0.0]);
        let model = decode_model(&glb, Some("glb"), None).unwrap();
        assert_eq!(model.triangle_count(), 1);

        let extent = model.extent();
        assert_eq!(extent.min, Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(extent.max, Vector3::new(6.0, 2.0, 0.0));
        assert_eq!(model.meshes[0].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_model(b"hello", Some("fbx"), None),
            Err(LoadFailureCause::UnsupportedFormat(ext)) if ext == "fbx"
        ));
        assert!(matches!(
            decode_model(b"not a glb", Some("glb"), None),
            Err(LoadFailureCause::Decode(_))
        ));
        assert!(matches!(
            decode_model(b"# nothing here\n", Some("obj"), None),
            Err(LoadFailureCause::EmptyModel)
        ));
    }

    #[test]
    fn test_spawned_load_resolves_as_future() {
        let mut files = HashMap::new();
        let location = AssetLocation::resolve("http://test", "box.obj");
        files.insert(location.as_str().to_string(), BOX_OBJ.as_bytes().to_vec());
        let loader = ModelLoader::new(Arc::new(MemoryFetcher { files }));

        let pending = loader.spawn(location);
        let model = pollster::block_on(pending).unwrap();
        assert_eq!(model.triangle_count(), 12);
    }

    #[test]
    fn test_spawned_load_reports_missing_file() {
        let loader = ModelLoader::new(Arc::new(MemoryFetcher {
            files: HashMap::new(),
        }));
        let pending = loader.spawn(AssetLocation::resolve(".", "missing.glb"));
        let error = pollster::block_on(pending).unwrap_err();
        assert!(error.cause.is_fetch());
        assert_eq!(error.location.origin(), Origin::File);
    }

    #[test]
    fn test_scheme_fetcher_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("box.obj"), BOX_OBJ).unwrap();

        let base = dir.path().to_string_lossy().into_owned();
        let location = AssetLocation::resolve(&base, "box.obj");
        let model = load_blocking(&SchemeFetcher, &location, &|_: LoadProgress| {}).unwrap();
        assert_eq!(model.triangle_count(), 12);
    }

    #[test]
    fn test_obj_picks_up_local_material() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("box.mtl"),
            "newmtl purple\nKd 0.5 0.0 1.0\n",
        )
        .unwrap();
        let obj = format!("mtllib box.mtl\nusemtl purple\n{BOX_OBJ}");
        std::fs::write(dir.path().join("box.obj"), obj).unwrap();

        let base = dir.path().to_string_lossy().into_owned();
        let location = AssetLocation::resolve(&base, "box.obj");
        let model = load_blocking(&SchemeFetcher, &location, &|_: LoadProgress| {}).unwrap();
        assert_eq!(model.meshes[0].color, [0.5, 0.0, 1.0, 1.0]);
    }
}
