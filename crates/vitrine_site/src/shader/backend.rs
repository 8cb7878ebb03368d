//! Render backend abstraction
//!
//! The shader background talks to the GPU through [`RenderBackend`]. Each
//! resource is created and released explicitly and identified by a slotmap
//! key, so leaks show up as non-zero live counts.

use slotmap::{new_key_type, SlotMap};
use tracing::trace;
use vitrine_core::Size;

use super::gradient::GradientUniforms;
use crate::error::{Result, SiteError};

new_key_type! {
    /// Render surface handle
    pub struct SurfaceId;
    /// Geometry buffer handle
    pub struct GeometryId;
    /// Material (compiled shader + uniform buffer) handle
    pub struct MaterialId;
}

/// Backend operations used by the shader background
pub trait RenderBackend {
    /// Create a render surface of the given pixel size
    fn create_surface(&mut self, size: Size) -> Result<SurfaceId>;

    /// Create the full-viewport quad
    fn create_geometry(&mut self) -> Result<GeometryId>;

    /// Compile the gradient material with its initial uniforms
    fn create_material(&mut self, uniforms: &GradientUniforms) -> Result<MaterialId>;

    /// Resize a surface
    fn resize(&mut self, surface: SurfaceId, size: Size) -> Result<()>;

    /// Draw one frame
    fn draw(
        &mut self,
        surface: SurfaceId,
        geometry: GeometryId,
        material: MaterialId,
        uniforms: &GradientUniforms,
    ) -> Result<()>;

    fn release_surface(&mut self, surface: SurfaceId);
    fn release_geometry(&mut self, geometry: GeometryId);
    fn release_material(&mut self, material: MaterialId);
}

/// Which construction step a [`HeadlessBackend`] should refuse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailPoint {
    Surface,
    Geometry,
    Material,
}

/// Live resource counts of a [`HeadlessBackend`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendCounts {
    pub surfaces: usize,
    pub geometries: usize,
    pub materials: usize,
}

impl BackendCounts {
    pub fn total(&self) -> usize {
        self.surfaces + self.geometries + self.materials
    }
}

/// In-memory backend that records resource lifetimes and draws
#[derive(Default)]
pub struct HeadlessBackend {
    surfaces: SlotMap<SurfaceId, Size>,
    geometries: SlotMap<GeometryId, ()>,
    materials: SlotMap<MaterialId, GradientUniforms>,
    fail: Option<FailPoint>,
    frames_drawn: u64,
    mismatched_frames: u64,
    last_uniforms: Option<GradientUniforms>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose construction fails at `point`
    pub fn failing(point: FailPoint) -> Self {
        Self {
            fail: Some(point),
            ..Self::default()
        }
    }

    pub fn set_fail_point(&mut self, point: Option<FailPoint>) {
        self.fail = point;
    }

    pub fn counts(&self) -> BackendCounts {
        BackendCounts {
            surfaces: self.surfaces.len(),
            geometries: self.geometries.len(),
            materials: self.materials.len(),
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Frames whose surface size differed from the uniform resolution
    pub fn mismatched_frames(&self) -> u64 {
        self.mismatched_frames
    }

    pub fn last_uniforms(&self) -> Option<GradientUniforms> {
        self.last_uniforms
    }

    pub fn surface_size(&self, surface: SurfaceId) -> Option<Size> {
        self.surfaces.get(surface).copied()
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.fail == Some(point) {
            return Err(SiteError::Render(format!("{point:?} creation refused")));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_surface(&mut self, size: Size) -> Result<SurfaceId> {
        self.check(FailPoint::Surface)?;
        Ok(self.surfaces.insert(size))
    }

    fn create_geometry(&mut self) -> Result<GeometryId> {
        self.check(FailPoint::Geometry)?;
        Ok(self.geometries.insert(()))
    }

    fn create_material(&mut self, uniforms: &GradientUniforms) -> Result<MaterialId> {
        self.check(FailPoint::Material)?;
        Ok(self.materials.insert(*uniforms))
    }

    fn resize(&mut self, surface: SurfaceId, size: Size) -> Result<()> {
        let slot = self
            .surfaces
            .get_mut(surface)
            .ok_or_else(|| SiteError::Render("resize of released surface".into()))?;
        *slot = size;
        Ok(())
    }

    fn draw(
        &mut self,
        surface: SurfaceId,
        geometry: GeometryId,
        material: MaterialId,
        uniforms: &GradientUniforms,
    ) -> Result<()> {
        let size = self
            .surfaces
            .get(surface)
            .copied()
            .ok_or_else(|| SiteError::Render("draw to released surface".into()))?;
        if !self.geometries.contains_key(geometry) {
            return Err(SiteError::Render("draw with released geometry".into()));
        }
        let slot = self
            .materials
            .get_mut(material)
            .ok_or_else(|| SiteError::Render("draw with released material".into()))?;
        *slot = *uniforms;

        if size != uniforms.resolution {
            self.mismatched_frames += 1;
        }
        self.frames_drawn += 1;
        self.last_uniforms = Some(*uniforms);
        trace!(frame = self.frames_drawn, progress = uniforms.progress, "gradient drawn");
        Ok(())
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(surface);
    }

    fn release_geometry(&mut self, geometry: GeometryId) {
        self.geometries.remove(geometry);
    }

    fn release_material(&mut self, material: MaterialId) {
        self.materials.remove(material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_track_lifetimes() {
        let mut backend = HeadlessBackend::new();
        let uniforms = GradientUniforms::new(Size::new(1440.0, 900.0));
        let surface = backend.create_surface(Size::new(1440.0, 900.0)).unwrap();
        let geometry = backend.create_geometry().unwrap();
        let material = backend.create_material(&uniforms).unwrap();
        assert_eq!(backend.counts().total(), 3);

        backend.draw(surface, geometry, material, &uniforms).unwrap();
        assert_eq!(backend.frames_drawn(), 1);
        assert_eq!(backend.mismatched_frames(), 0);

        backend.release_material(material);
        backend.release_geometry(geometry);
        backend.release_surface(surface);
        backend.release_surface(surface);
        assert_eq!(backend.counts(), BackendCounts::default());
        assert!(backend.draw(surface, geometry, material, &uniforms).is_err());
    }

    #[test]
    fn test_mismatched_resolution_is_recorded() {
        let mut backend = HeadlessBackend::new();
        let uniforms = GradientUniforms::new(Size::new(1440.0, 900.0));
        let surface = backend.create_surface(Size::new(1440.0, 900.0)).unwrap();
        let geometry = backend.create_geometry().unwrap();
        let material = backend.create_material(&uniforms).unwrap();

        backend.resize(surface, Size::new(1280.0, 800.0)).unwrap();
        backend.draw(surface, geometry, material, &uniforms).unwrap();
        assert_eq!(backend.mismatched_frames(), 1);
    }

    #[test]
    fn test_fail_point() {
        let mut backend = HeadlessBackend::failing(FailPoint::Material);
        assert!(backend.create_surface(Size::new(10.0, 10.0)).is_ok());
        let err = backend
            .create_material(&GradientUniforms::new(Size::new(10.0, 10.0)))
            .unwrap_err();
        assert!(matches!(err, SiteError::Render(_)));
    }
}
