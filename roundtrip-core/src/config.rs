//! Run configuration: parameters, working-directory layout, and the
//! placeholder value maps consumed by the configuration renderer.
//!
//! All configuration is passed explicitly; nothing here is process-global.
//! The file names inside the working directory are fixed for a given run so
//! that each phase hands its output to the next one at a known location.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Parameters supplied once at harness start, immutable for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParameters {
    /// Number of frames to capture and encode.
    pub frames: u32,
    /// Frames per second for capture and playback.
    pub frame_rate: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl RunParameters {
    /// Validates that all four parameters are positive.
    pub fn new(frames: u32, frame_rate: u32, width: u32, height: u32) -> CoreResult<Self> {
        for (name, value) in [
            ("frame count", frames),
            ("frame rate", frame_rate),
            ("width", width),
            ("height", height),
        ] {
            if value == 0 {
                return Err(CoreError::InvalidParameters(format!(
                    "{name} must be positive"
                )));
            }
        }
        Ok(Self {
            frames,
            frame_rate,
            width,
            height,
        })
    }
}

/// Object-detection values forwarded verbatim into the encoder configuration.
///
/// The harness does not interpret these; the encoder's detection feature is
/// an opaque collaborator configured through its own config keys.
#[derive(Debug, Clone)]
pub struct DetectionSettings {
    pub enable: u8,
    pub min_width: u32,
    pub min_height: u32,
    pub search_hysteresis: u32,
    pub tracking_hysteresis: u32,
    pub training_file: PathBuf,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            enable: 1,
            min_width: 30,
            min_height: 30,
            search_hysteresis: 10,
            tracking_hysteresis: 30,
            training_file: PathBuf::from("haarcascade_frontalface_alt.xml"),
        }
    }
}

/// Fixed file layout inside the working directory.
///
/// Each intermediate file is written to completion by one phase before the
/// next phase opens it for reading.
#[derive(Debug, Clone)]
pub struct RunPaths {
    /// Raw frames written by the capture pipeline; encoder input.
    pub capture_output: PathBuf,
    /// Bitstream written by the encoder; decoder input.
    pub encoded_bitstream: PathBuf,
    /// Reconstructed raw frames written by the decoder; playback input.
    pub decoded_output: PathBuf,
    pub capture_config: PathBuf,
    pub encoder_config: PathBuf,
    pub decoder_config: PathBuf,
    pub playback_config: PathBuf,
}

impl RunPaths {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            capture_output: work_dir.join("recorded.yuv"),
            encoded_bitstream: work_dir.join("encoded.264"),
            decoded_output: work_dir.join("decoded.yuv"),
            capture_config: work_dir.join("capture.cfg"),
            encoder_config: work_dir.join("encoder.cfg"),
            decoder_config: work_dir.join("decoder.cfg"),
            playback_config: work_dir.join("playback.cfg"),
        }
    }
}

/// Everything the orchestrator needs for one run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub params: RunParameters,
    pub detection: DetectionSettings,
    pub template_dir: PathBuf,
    pub work_dir: PathBuf,
    pub encoder: PathBuf,
    pub decoder: PathBuf,
}

/// Placeholder name to value mapping for one template.
pub type TemplateValues = BTreeMap<String, String>;

impl HarnessConfig {
    pub fn new(
        params: RunParameters,
        template_dir: PathBuf,
        work_dir: PathBuf,
        encoder: PathBuf,
        decoder: PathBuf,
    ) -> Self {
        Self {
            params,
            detection: DetectionSettings::default(),
            template_dir,
            work_dir,
            encoder,
            decoder,
        }
    }

    pub fn paths(&self) -> RunPaths {
        RunPaths::new(&self.work_dir)
    }

    /// Creates the working directory if it does not exist yet.
    pub fn ensure_work_dir(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        Ok(())
    }

    pub fn capture_template(&self) -> PathBuf {
        self.template_dir.join("capture.cfg.template")
    }

    pub fn encoder_template(&self) -> PathBuf {
        self.template_dir.join("encoder.cfg.template")
    }

    pub fn decoder_template(&self) -> PathBuf {
        self.template_dir.join("decoder.cfg.template")
    }

    pub fn playback_template(&self) -> PathBuf {
        self.template_dir.join("playback.cfg.template")
    }

    pub fn capture_values(&self) -> TemplateValues {
        let paths = self.paths();
        let mut values = self.parameter_values();
        values.insert(
            "OutputFile".into(),
            paths.capture_output.display().to_string(),
        );
        values
    }

    /// Encoder placeholder names follow the JM reference configuration; the
    /// input file is referenced twice in the template.
    pub fn encoder_values(&self) -> TemplateValues {
        let paths = self.paths();
        let input = paths.capture_output.display().to_string();
        let mut values = TemplateValues::new();
        values.insert("InputFile1".into(), input.clone());
        values.insert("InputFile2".into(), input);
        values.insert("FramesToBeEncoded".into(), self.params.frames.to_string());
        values.insert("FrameRate".into(), self.params.frame_rate.to_string());
        values.insert("SourceWidth".into(), self.params.width.to_string());
        values.insert("SourceHeight".into(), self.params.height.to_string());
        values.insert("OutputWidth".into(), self.params.width.to_string());
        values.insert("OutputHeight".into(), self.params.height.to_string());
        values.insert(
            "OutputFile".into(),
            paths.encoded_bitstream.display().to_string(),
        );
        values.insert(
            "object_detection_enable".into(),
            self.detection.enable.to_string(),
        );
        values.insert(
            "object_detection_min_width".into(),
            self.detection.min_width.to_string(),
        );
        values.insert(
            "object_detection_min_height".into(),
            self.detection.min_height.to_string(),
        );
        values.insert(
            "object_detection_search_hysteresis".into(),
            self.detection.search_hysteresis.to_string(),
        );
        values.insert(
            "object_detection_tracking_hysteresis".into(),
            self.detection.tracking_hysteresis.to_string(),
        );
        values.insert(
            "object_detection_training_file".into(),
            self.detection.training_file.display().to_string(),
        );
        values
    }

    /// The decoder reads the encoder's bitstream and checks the
    /// reconstruction against the original capture.
    pub fn decoder_values(&self) -> TemplateValues {
        let paths = self.paths();
        let mut values = TemplateValues::new();
        values.insert(
            "InputFile".into(),
            paths.encoded_bitstream.display().to_string(),
        );
        values.insert(
            "OutputFile".into(),
            paths.decoded_output.display().to_string(),
        );
        values.insert(
            "RefFile".into(),
            paths.capture_output.display().to_string(),
        );
        values
    }

    pub fn playback_values(&self) -> TemplateValues {
        let paths = self.paths();
        let mut values = self.parameter_values();
        values.insert(
            "InputFile".into(),
            paths.decoded_output.display().to_string(),
        );
        values
    }

    fn parameter_values(&self) -> TemplateValues {
        let mut values = TemplateValues::new();
        values.insert("FrameCount".into(), self.params.frames.to_string());
        values.insert("FrameRate".into(), self.params.frame_rate.to_string());
        values.insert("Width".into(), self.params.width.to_string());
        values.insert("Height".into(), self.params.height.to_string());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_parameters() {
        assert!(RunParameters::new(0, 30, 176, 144).is_err());
        assert!(RunParameters::new(10, 0, 176, 144).is_err());
        assert!(RunParameters::new(10, 30, 0, 144).is_err());
        assert!(RunParameters::new(10, 30, 176, 0).is_err());
        assert!(RunParameters::new(10, 30, 176, 144).is_ok());
    }

    #[test]
    fn paths_are_fixed_relative_to_work_dir() {
        let paths = RunPaths::new(Path::new("tmp"));
        assert_eq!(paths.capture_output, Path::new("tmp/recorded.yuv"));
        assert_eq!(paths.encoded_bitstream, Path::new("tmp/encoded.264"));
        assert_eq!(paths.decoded_output, Path::new("tmp/decoded.yuv"));
    }

    #[test]
    fn encoder_values_carry_detection_settings() {
        let params = RunParameters::new(10, 30, 176, 144).unwrap();
        let config = HarnessConfig::new(
            params,
            PathBuf::from("templates"),
            PathBuf::from("tmp"),
            PathBuf::from("lencod"),
            PathBuf::from("ldecod"),
        );
        let values = config.encoder_values();
        assert_eq!(values["FramesToBeEncoded"], "10");
        assert_eq!(values["SourceWidth"], "176");
        assert_eq!(values["object_detection_enable"], "1");
        assert_eq!(values["object_detection_tracking_hysteresis"], "30");
        assert_eq!(values["InputFile1"], values["InputFile2"]);
    }

    #[test]
    fn decoder_reference_is_the_original_capture() {
        let params = RunParameters::new(10, 30, 176, 144).unwrap();
        let config = HarnessConfig::new(
            params,
            PathBuf::from("templates"),
            PathBuf::from("tmp"),
            PathBuf::from("lencod"),
            PathBuf::from("ldecod"),
        );
        let values = config.decoder_values();
        assert_eq!(values["InputFile"], config.paths().encoded_bitstream.display().to_string());
        assert_eq!(values["RefFile"], config.paths().capture_output.display().to_string());
    }
}
