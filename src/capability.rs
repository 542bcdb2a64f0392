/// Shown instead of the scene when no usable GPU backend exists
pub const UNSUPPORTED_MESSAGE: &str = "Your graphics card does not seem to support the \
rendering backends this demo needs (Vulkan, Metal, DirectX 12 or OpenGL).";

/// Rendering capability is missing. This is the only startup failure the
/// demo models; it is reported once and the scene is never built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rendering capability unavailable: {reason}")]
pub struct CapabilityError {
    reason: String,
}

impl CapabilityError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Human-readable text for the user
    pub fn message(&self) -> String {
        format!("{UNSUPPORTED_MESSAGE}\n({})", self.reason)
    }
}

/// Checks, once, whether rendering is possible
pub trait CapabilityProbe {
    /// Whatever the probe found that the renderer needs next
    type Output;

    fn probe(self) -> Result<Self::Output, CapabilityError>;
}

/// Result of a gated startup
#[derive(Debug)]
pub enum Launch<T> {
    Ready(T),
    Unsupported(CapabilityError),
}

/// Run `bootstrap` only if the probe succeeds. A failed probe is left to the
/// caller to report; it is only traced here.
pub fn launch<P, T, F>(probe: P, bootstrap: F) -> Launch<T>
where
    P: CapabilityProbe,
    F: FnOnce(P::Output) -> T,
{
    match probe.probe() {
        Ok(output) => Launch::Ready(bootstrap(output)),
        Err(e) => {
            log::debug!("{e}");
            Launch::Unsupported(e)
        }
    }
}

/// A surface plus an adapter that can present to it
pub struct GpuTarget {
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
}

/// Asks wgpu for an adapter compatible with the window surface
pub struct SurfaceProbe {
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
}

impl SurfaceProbe {
    pub fn new(instance: wgpu::Instance, surface: wgpu::Surface<'static>) -> Self {
        Self { instance, surface }
    }
}

impl CapabilityProbe for SurfaceProbe {
    type Output = GpuTarget;

    fn probe(self) -> Result<GpuTarget, CapabilityError> {
        let adapter = pollster::block_on(self.instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&self.surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| CapabilityError::new(format!("no compatible adapter: {e:?}")))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        Ok(GpuTarget {
            instance: self.instance,
            surface: self.surface,
            adapter,
        })
    }
}
