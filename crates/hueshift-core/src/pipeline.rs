//! Stage orchestration: compose, then color, then export.
//!
//! Stages run strictly in that order and each consumes the previous stage's
//! raster. A failing stage stops the run; nothing partial is handed on.

use thiserror::Error;

use crate::adjustments::{apply_color, ColorError};
use crate::config::PipelineConfig;
use crate::export::{ExportAdapter, ExportError, ExportReceipt, PhotoLibrary};
use crate::preview::render_preview;
use crate::raster::RasterImage;
use crate::transform::{compose, ComposeError};
use crate::{ParameterError, TransformParameters};

/// Errors from any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source raster cannot enter the pipeline
    #[error("Invalid source image: {0}")]
    InvalidSource(String),

    /// A transform parameter is unusable
    #[error("Invalid transform parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// The three-stage photo pipeline for one editing session.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the geometry and color stages.
    ///
    /// The canvas bound is the smaller of `params.max_output_dimension` and
    /// the session's configured bound.
    pub fn render(
        &self,
        source: &RasterImage,
        params: &TransformParameters,
    ) -> Result<RasterImage, PipelineError> {
        validate_source(source)?;
        params.validate()?;

        let max_dimension = params
            .max_output_dimension
            .min(self.config.max_output_dimension);
        log::debug!(
            "render: {}x{} source, rotation {} deg, max {}",
            source.width(),
            source.height(),
            params.rotation_degrees,
            max_dimension
        );

        let composed = compose(
            source,
            params.rotation_degrees,
            max_dimension,
            self.config.interpolation,
        )?;
        Ok(apply_color(&composed, params)?)
    }

    /// Render a small color-only preview for the live editing view.
    pub fn preview(
        &self,
        source: &RasterImage,
        params: &TransformParameters,
    ) -> Result<RasterImage, PipelineError> {
        render_preview(
            source,
            params,
            self.config.preview_max_edge,
            self.config.interpolation,
        )
    }

    /// Render and then export through `adapter`.
    pub async fn export<L: PhotoLibrary + 'static>(
        &self,
        source: &RasterImage,
        params: &TransformParameters,
        adapter: &ExportAdapter<L>,
    ) -> Result<ExportReceipt, PipelineError> {
        let rendered = self.render(source, params)?;
        Ok(adapter.export(rendered).await?)
    }
}

fn validate_source(source: &RasterImage) -> Result<(), PipelineError> {
    if source.is_empty() {
        return Err(PipelineError::InvalidSource(format!(
            "source is {}x{}",
            source.width(),
            source.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportFormat;
    use crate::export::{AuthorizationStatus, EncodedAsset, SinkError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct MemoryLibrary {
        status: AuthorizationStatus,
        saved: Mutex<Vec<EncodedAsset>>,
    }

    impl MemoryLibrary {
        fn new(status: AuthorizationStatus) -> Self {
            Self {
                status,
                saved: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PhotoLibrary for MemoryLibrary {
        async fn request_authorization(&self) -> AuthorizationStatus {
            self.status
        }

        async fn save(&self, asset: EncodedAsset) -> Result<(), SinkError> {
            self.saved.lock().unwrap().push(asset);
            Ok(())
        }
    }

    #[test]
    fn test_render_bounds_large_source() {
        init_logging();
        let source = RasterImage::filled(5000, 3000, [40, 80, 120, 255]);

        let out = Pipeline::new()
            .render(&source, &TransformParameters::new())
            .unwrap();
        assert_eq!((out.width(), out.height()), (4000, 2400));
        assert_eq!(out.pixel(2000, 1200), Some([40, 80, 120, 255]));
    }

    #[test]
    fn test_render_hue_half_turn() {
        init_logging();
        let source = RasterImage::filled(100, 100, [255, 0, 0, 255]);
        let params = TransformParameters::with_color(180.0, 1.0, 0.0);

        let out = Pipeline::new().render(&source, &params).unwrap();
        assert_eq!((out.width(), out.height()), (100, 100));
        assert!(out.pixels().chunks_exact(4).all(|p| p == [0, 255, 255, 255]));
    }

    #[test]
    fn test_render_rotation_clips_corners() {
        let source = RasterImage::filled(200, 100, [255, 255, 255, 255]);
        let mut params = TransformParameters::new();
        params.rotation_degrees = 90.0;

        let out = Pipeline::new().render(&source, &params).unwrap();
        assert_eq!((out.width(), out.height()), (200, 100));
        assert_eq!(out.pixel(100, 50), Some([255, 255, 255, 255]));
        assert_eq!(out.pixel(2, 50).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_config_bound_caps_parameters() {
        let config = PipelineConfig {
            max_output_dimension: 50,
            ..PipelineConfig::default()
        };
        let source = RasterImage::filled(200, 100, [0, 0, 0, 255]);

        let out = Pipeline::with_config(config)
            .render(&source, &TransformParameters::new())
            .unwrap();
        assert_eq!((out.width(), out.height()), (50, 25));
    }

    #[test]
    fn test_render_rejects_empty_source() {
        let source = RasterImage::new(0, 10, vec![]).unwrap();
        let result = Pipeline::new().render(&source, &TransformParameters::new());
        assert!(matches!(result, Err(PipelineError::InvalidSource(_))));
    }

    #[test]
    fn test_render_rejects_non_finite_parameters() {
        let source = RasterImage::filled(8, 8, [200, 100, 50, 255]);
        let pipeline = Pipeline::new();

        for rotation in [f64::NAN, f64::INFINITY] {
            let mut params = TransformParameters::new();
            params.rotation_degrees = rotation;
            assert!(matches!(
                pipeline.render(&source, &params),
                Err(PipelineError::InvalidParameters(ParameterError::NonFinite {
                    field: "rotationDegrees"
                }))
            ));
        }

        let cases = [
            (TransformParameters::with_color(f32::NAN, 1.0, 0.0), "hueDegrees"),
            (TransformParameters::with_color(0.0, f32::NAN, 0.0), "saturationFactor"),
            (
                TransformParameters::with_color(0.0, 1.0, f32::NEG_INFINITY),
                "brightnessOffset",
            ),
        ];
        for (params, expected) in cases {
            match pipeline.render(&source, &params) {
                Err(PipelineError::InvalidParameters(ParameterError::NonFinite { field })) => {
                    assert_eq!(field, expected)
                }
                other => panic!("expected {} to be rejected, got {:?}", expected, other),
            }
            assert!(matches!(
                pipeline.preview(&source, &params),
                Err(PipelineError::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn test_zero_max_dimension_is_compose_error() {
        let source = RasterImage::filled(4, 4, [0, 0, 0, 255]);
        let mut params = TransformParameters::new();
        params.max_output_dimension = 0;

        let result = Pipeline::new().render(&source, &params);
        assert!(matches!(
            result,
            Err(PipelineError::Compose(ComposeError::ZeroMaxDimension))
        ));
    }

    #[test]
    fn test_preview_uses_config_edge() {
        let config = PipelineConfig {
            preview_max_edge: 32,
            ..PipelineConfig::default()
        };
        let source = RasterImage::filled(128, 64, [255, 0, 0, 255]);
        let out = Pipeline::with_config(config)
            .preview(&source, &TransformParameters::new())
            .unwrap();
        assert_eq!((out.width(), out.height()), (32, 16));
    }

    #[tokio::test]
    async fn test_export_end_to_end() {
        init_logging();
        let adapter = ExportAdapter::new(
            MemoryLibrary::new(AuthorizationStatus::Authorized),
            ExportFormat::default(),
        );
        let source = RasterImage::filled(64, 48, [255, 0, 0, 255]);
        let params = TransformParameters::with_color(180.0, 1.0, 0.0);

        let receipt = Pipeline::new()
            .export(&source, &params, &adapter)
            .await
            .unwrap();
        assert!(receipt.byte_len > 0);

        let saved = adapter.library().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        let decoded = image::load_from_memory(&saved[0].bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 48));
        let center = decoded.get_pixel(32, 24);
        assert!(center[0] < 10 && center[1] > 245 && center[2] > 245);
    }

    #[tokio::test]
    async fn test_export_denied_saves_nothing() {
        let adapter = ExportAdapter::new(
            MemoryLibrary::new(AuthorizationStatus::Denied),
            ExportFormat::default(),
        );
        let source = RasterImage::filled(8, 8, [1, 2, 3, 255]);

        let result = Pipeline::new()
            .export(&source, &TransformParameters::new(), &adapter)
            .await;
        assert!(matches!(
            result,
            Err(PipelineError::Export(ExportError::PermissionDenied))
        ));
        assert!(adapter.library().saved.lock().unwrap().is_empty());
    }
}
