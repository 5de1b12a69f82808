use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::{self, FutureExt, LocalBoxFuture};
use glam::{Mat4, Vec3};

use crate::assets::{ImageDecoder, Texture, WrapMode};
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::geometry::{GeometryDescriptor, MeshData};
use crate::render::programs;
use crate::uniforms::{UniformRegistry, UniformSet, UniformValue};

use super::{DirectionalLight, ElementKind, Mesh, Scene, SceneNode, ShaderMaterial, Side};

/// A visual element still waiting on its textures.
pub type ElementFuture = LocalBoxFuture<'static, Result<SceneNode, SceneError>>;

/// Outcome of building elements: what made it into the scene and what did not.
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub installed: Vec<ElementKind>,
    pub failures: Vec<SceneError>,
}

impl AssemblyReport {
    /// True if nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: AssemblyReport) {
        self.installed.extend(other.installed);
        self.failures.extend(other.failures);
    }

    fn record(&mut self, result: Result<ElementKind, SceneError>) {
        match result {
            Ok(kind) => self.installed.push(kind),
            Err(e) => self.failures.push(e),
        }
    }
}

/// Builds the sky, ground and grass elements and wires them into a scene.
///
/// The sky needs no external resources and is built synchronously. Ground and
/// grass wait for their textures; each is an independent future, so one failed
/// decode only drops its own element.
pub struct SceneAssembler<D> {
    config: SceneConfig,
    decoder: D,
}

impl<D: ImageDecoder> SceneAssembler<D> {
    pub fn new(config: SceneConfig, decoder: D) -> Self {
        Self { config, decoder }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn light(&self) -> DirectionalLight {
        DirectionalLight::new(Vec3::ONE, self.config.light_intensity, self.config.light_position)
    }

    /// Sky dome, drawn from the inside.
    pub fn build_sky(&self) -> SceneNode {
        let mesh = MeshData::sphere(
            self.config.sky_radius,
            self.config.sky_width_segments,
            self.config.sky_height_segments,
        );
        let uniforms = UniformSet::builder("sky").with_shared().build();
        let material = ShaderMaterial::new(programs::SKY, uniforms).with_side(Side::Back);

        SceneNode::new(ElementKind::Sky, Mesh::Indexed(Rc::new(mesh)), material)
    }

    /// Unit plane lying in XZ, scaled up, with a repeating diffuse texture.
    pub fn build_ground(&self) -> ElementFuture {
        let segments = self.config.ground_segments;
        let scale = self.config.ground_scale;
        let texture = self.decoder.load_async(&self.config.ground_texture_path());

        async move {
            let image = texture.await.map_err(|source| SceneError::ResourceLoad {
                kind: ElementKind::Ground,
                source,
            })?;
            let diffuse = Texture::new("ground diffuse", image).with_wrap(WrapMode::Repeat);

            let uniforms = UniformSet::builder("ground")
                .with_shared()
                .param("diffuseTexture", UniformValue::Texture(Rc::new(diffuse)))
                .build();
            let material = ShaderMaterial::new(programs::GROUND, uniforms);

            let mesh = MeshData::plane(1.0, 1.0, segments, segments);
            let transform = Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_rotation_x(-FRAC_PI_2);

            Ok(SceneNode::new(ElementKind::Ground, Mesh::Indexed(Rc::new(mesh)), material)
                .with_transform(transform))
        }
        .boxed_local()
    }

    /// Instanced blade field. Invalid field parameters fail before the tile
    /// texture is requested.
    pub fn build_grass(&self) -> ElementFuture {
        let field = &self.config.field;
        let geometry = match GeometryDescriptor::from_field(field) {
            Ok(geometry) => geometry,
            Err(source) => {
                return future::ready(Err(SceneError::Configuration {
                    kind: ElementKind::Grass,
                    source,
                }))
                .boxed_local();
            }
        };

        let params = field.shader_params();
        let texture = self.decoder.load_async(&self.config.grass_tile_texture_path());

        async move {
            let image = texture.await.map_err(|source| SceneError::ResourceLoad {
                kind: ElementKind::Grass,
                source,
            })?;
            let tile_data = Texture::new("grass tile data", image).as_data();

            let uniforms = UniformSet::builder("grass")
                .param("grassParams", UniformValue::Vec4(params))
                .param("tileDataTexture", UniformValue::Texture(Rc::new(tile_data)))
                .with_shared()
                .build();
            let material = ShaderMaterial::new(programs::GRASS, uniforms).with_side(Side::Front);

            Ok(SceneNode::new(ElementKind::Grass, Mesh::Instanced(Rc::new(geometry)), material))
        }
        .boxed_local()
    }

    /// Adds the light and the sky, then hands back the texture-bound elements
    /// for the caller to poll between frames.
    pub fn start(&self, scene: &mut Scene, registry: &mut UniformRegistry) -> PendingElements {
        scene.add_light(self.light());
        install(self.build_sky(), scene, registry);

        PendingElements {
            pending: vec![
                (ElementKind::Ground, self.build_ground()),
                (ElementKind::Grass, self.build_grass()),
            ],
        }
    }

    /// Builds every element in order, awaiting each one. Failures are collected
    /// in the report; this never fails as a whole.
    pub async fn assemble(&self, scene: &mut Scene, registry: &mut UniformRegistry) -> AssemblyReport {
        let mut report = AssemblyReport::default();
        let pending = self.start(scene, registry);
        report.installed.push(ElementKind::Sky);

        for (_, element) in pending.pending {
            let result = element
                .await
                .map(|node| install(node, scene, registry))
                .inspect_err(log_failure);
            report.record(result);
        }
        report
    }
}

/// Registers the node's uniform set and inserts the node into the scene.
pub fn install(node: SceneNode, scene: &mut Scene, registry: &mut UniformRegistry) -> ElementKind {
    let kind = node.kind;
    registry.register(node.material.uniforms());
    scene.add(node);
    log::info!("{kind} built");
    kind
}

fn log_failure(error: &SceneError) {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    log::warn!("{message}; element left out of the scene");
}

/// Elements whose futures have not resolved yet.
pub struct PendingElements {
    pending: Vec<(ElementKind, ElementFuture)>,
}

impl PendingElements {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ElementKind> + '_ {
        self.pending.iter().map(|(kind, _)| *kind)
    }

    /// Polls every pending element once without blocking and installs those
    /// that finished. Decoder threads complete on their own, so a no-op waker
    /// is enough; the frame loop polls again next tick.
    pub fn poll_install(&mut self, scene: &mut Scene, registry: &mut UniformRegistry) -> AssemblyReport {
        let mut report = AssemblyReport::default();
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());

        self.pending.retain_mut(|(_, element)| match element.poll_unpin(&mut cx) {
            Poll::Pending => true,
            Poll::Ready(result) => {
                let result = result
                    .map(|node| install(node, scene, registry))
                    .inspect_err(log_failure);
                report.record(result);
                false
            }
        });
        report
    }
}

impl std::fmt::Debug for PendingElements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::assets::DecodedImage;
    use crate::error::{ConfigurationError, ResourceLoadError};
    use crate::uniforms::SharedValue;

    /// Serves a solid image for every path, except paths containing `fail`
    /// (not found) or `hold` (never resolves).
    #[derive(Default)]
    struct StubDecoder {
        fail: Option<&'static str>,
        hold: Option<&'static str>,
    }

    impl ImageDecoder for StubDecoder {
        fn load_async(
            &self,
            path: &Path,
        ) -> impl Future<Output = Result<DecodedImage, ResourceLoadError>> + 'static {
            let path: PathBuf = path.to_path_buf();
            let matches = |pattern: Option<&str>| {
                pattern.is_some_and(|p| path.to_string_lossy().contains(p))
            };
            let fail = matches(self.fail);
            let hold = matches(self.hold);

            async move {
                if hold {
                    future::pending::<()>().await;
                }
                if fail {
                    return Err(ResourceLoadError::Io {
                        path,
                        source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    });
                }
                Ok(DecodedImage::solid(2, 2, [255; 4]))
            }
        }
    }

    fn small_config() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.sky_width_segments = 8;
        config.sky_height_segments = 4;
        config.ground_segments = 4;
        config
    }

    fn assemble(decoder: StubDecoder, config: SceneConfig) -> (Scene, UniformRegistry, AssemblyReport) {
        let assembler = SceneAssembler::new(config, decoder);
        let mut scene = Scene::new();
        let mut registry = UniformRegistry::new();
        let report = pollster::block_on(assembler.assemble(&mut scene, &mut registry));
        (scene, registry, report)
    }

    // ── full assembly ─────────────────────────────────────────────────────

    #[test]
    fn builds_all_three_elements_in_order() {
        let (scene, registry, report) = assemble(StubDecoder::default(), small_config());

        assert!(report.is_complete());
        assert_eq!(report.installed, ElementKind::ALL.to_vec());
        assert_eq!(scene.len(), 3);
        assert_eq!(registry.len(), 3);
        assert_eq!(scene.lights().len(), 1);
    }

    #[test]
    fn ground_decode_failure_leaves_sky_and_grass() {
        let decoder = StubDecoder { fail: Some("grid"), ..Default::default() };
        let (scene, registry, report) = assemble(decoder, small_config());

        assert!(scene.contains(ElementKind::Sky));
        assert!(scene.contains(ElementKind::Grass));
        assert!(!scene.contains(ElementKind::Ground));
        assert_eq!(registry.len(), 2);

        assert_eq!(report.installed, vec![ElementKind::Sky, ElementKind::Grass]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind(), ElementKind::Ground);
        assert!(matches!(report.failures[0], SceneError::ResourceLoad { .. }));
    }

    #[test]
    fn invalid_field_skips_grass_only() {
        let mut config = small_config();
        config.field.segment_count = 0;
        let (scene, _, report) = assemble(StubDecoder::default(), config);

        assert!(scene.contains(ElementKind::Sky));
        assert!(scene.contains(ElementKind::Ground));
        assert!(!scene.contains(ElementKind::Grass));
        assert!(matches!(
            report.failures[0],
            SceneError::Configuration {
                kind: ElementKind::Grass,
                source: ConfigurationError::SegmentCount(0),
            }
        ));
    }

    #[test]
    fn registered_sets_receive_broadcasts() {
        let (scene, registry, _) = assemble(StubDecoder::default(), small_config());

        assert_eq!(registry.broadcast(SharedValue::Time(2.5)), 3);
        for node in scene.nodes() {
            assert_eq!(node.material.uniforms().time(), Some(2.5));
        }
    }

    // ── element setup ─────────────────────────────────────────────────────

    #[test]
    fn sky_is_rendered_from_inside() {
        let assembler = SceneAssembler::new(small_config(), StubDecoder::default());
        let sky = assembler.build_sky();

        assert_eq!(sky.material.side(), Side::Back);
        assert!(sky.material.uniforms().declares(crate::uniforms::SharedUniform::Time));
        assert!(matches!(sky.mesh, Mesh::Indexed(_)));
    }

    #[test]
    fn ground_texture_repeats_and_plane_lies_flat() {
        let assembler = SceneAssembler::new(small_config(), StubDecoder::default());
        let ground = pollster::block_on(assembler.build_ground()).unwrap();

        let texture = ground.material.uniforms().texture("diffuseTexture").unwrap();
        assert_eq!(texture.wrap_u, WrapMode::Repeat);
        assert_eq!(texture.wrap_v, WrapMode::Repeat);

        // The plane's +Y corner ends up on -Z, scaled to the ground size.
        let corner = ground.transform.transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!(corner.y.abs() < 1e-3);
        assert!((corner.x - 500.0).abs() < 1e-3);
        assert!((corner.z + 500.0).abs() < 1e-3);
    }

    #[test]
    fn grass_carries_field_parameters() {
        let assembler = SceneAssembler::new(small_config(), StubDecoder::default());
        let grass = pollster::block_on(assembler.build_grass()).unwrap();

        assert_eq!(
            grass.material.uniforms().param("grassParams"),
            Some(UniformValue::Vec4([6.0, 25.0, 0.25, 2.0]))
        );
        assert!(grass.material.uniforms().texture("tileDataTexture").is_some());
        let Mesh::Instanced(geometry) = &grass.mesh else { panic!("grass should be instanced") };
        assert_eq!(geometry.instance_count(), 32 * 1024);
    }

    // ── pending elements ──────────────────────────────────────────────────

    #[test]
    fn start_installs_sky_and_defers_the_rest() {
        let assembler = SceneAssembler::new(small_config(), StubDecoder::default());
        let mut scene = Scene::new();
        let mut registry = UniformRegistry::new();

        let pending = assembler.start(&mut scene, &mut registry);

        assert_eq!(scene.len(), 1);
        assert!(scene.contains(ElementKind::Sky));
        assert_eq!(pending.kinds().collect::<Vec<_>>(), vec![ElementKind::Ground, ElementKind::Grass]);
    }

    #[test]
    fn poll_installs_ready_elements_and_keeps_the_rest() {
        let decoder = StubDecoder { hold: Some("ijc_logo"), ..Default::default() };
        let assembler = SceneAssembler::new(small_config(), decoder);
        let mut scene = Scene::new();
        let mut registry = UniformRegistry::new();

        let mut pending = assembler.start(&mut scene, &mut registry);
        let report = pending.poll_install(&mut scene, &mut registry);

        assert_eq!(report.installed, vec![ElementKind::Ground]);
        assert_eq!(pending.len(), 1);
        assert!(!scene.contains(ElementKind::Grass));

        let report = pending.poll_install(&mut scene, &mut registry);
        assert!(report.installed.is_empty());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn poll_reports_failures_once() {
        let decoder = StubDecoder { fail: Some("grid"), ..Default::default() };
        let assembler = SceneAssembler::new(small_config(), decoder);
        let mut scene = Scene::new();
        let mut registry = UniformRegistry::new();

        let mut pending = assembler.start(&mut scene, &mut registry);
        let report = pending.poll_install(&mut scene, &mut registry);

        assert_eq!(report.failures.len(), 1);
        assert!(pending.is_empty());
        assert!(pending.poll_install(&mut scene, &mut registry).failures.is_empty());
    }
}
