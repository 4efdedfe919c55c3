use crate::types::SurfaceSize;
use crate::uniforms::LineUniforms;

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("rendering context lost")]
    ContextLost,
    #[error("draw failed: {0}")]
    Draw(String),
    #[error("context disposal unavailable: {0}")]
    DisposeUnavailable(String),
}

/// Host-provided drawing target (a canvas with its GL context, an offscreen
/// texture, a recorder in tests).
pub trait LineSurface {
    /// Resizes the backing store to `backing` while keeping the displayed
    /// size at `display` (the element's layout box).
    fn resize(&mut self, backing: SurfaceSize, display: SurfaceSize) -> Result<(), SurfaceError>;
    fn draw(&mut self, uniforms: &LineUniforms) -> Result<(), SurfaceError>;
    /// Detaches the surface and releases the context.
    fn dispose(&mut self) -> Result<(), SurfaceError>;
}

/// Headless surface that keeps the last frame and a resize log.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub backing: SurfaceSize,
    pub display: SurfaceSize,
    pub resizes: Vec<(SurfaceSize, SurfaceSize)>,
    pub frames_drawn: u64,
    pub last_frame: Option<LineUniforms>,
    pub disposed: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineSurface for RecordingSurface {
    fn resize(&mut self, backing: SurfaceSize, display: SurfaceSize) -> Result<(), SurfaceError> {
        self.backing = backing;
        self.display = display;
        self.resizes.push((backing, display));
        Ok(())
    }

    fn draw(&mut self, uniforms: &LineUniforms) -> Result<(), SurfaceError> {
        if self.disposed {
            return Err(SurfaceError::ContextLost);
        }
        self.frames_drawn += 1;
        self.last_frame = Some(*uniforms);
        Ok(())
    }

    fn dispose(&mut self) -> Result<(), SurfaceError> {
        self.disposed = true;
        Ok(())
    }
}
