use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use facelock_core::annotation::frame_annotator::FrameAnnotator;
use facelock_core::detection::domain::face_detector::FaceDetector;
use facelock_core::detection::infrastructure::cascade_face_detector::CascadeFaceDetector;
use facelock_core::detection::infrastructure::onnx_ssd_detector::OnnxSsdDetector;
use facelock_core::detection::infrastructure::rustface_cascade::RustfaceCascade;
use facelock_core::landmarks::domain::eye_locator::EyeLocator;
use facelock_core::landmarks::infrastructure::cascade_eye_locator::CascadeEyeLocator;
use facelock_core::landmarks::infrastructure::landmark_eye_locator::LandmarkEyeLocator;
use facelock_core::landmarks::infrastructure::onnx_landmark_model::OnnxLandmarkModel;
use facelock_core::pipeline::face_alignment_pipeline::FaceAlignmentPipeline;
use facelock_core::pipeline::pipeline_logger::LogPipelineLogger;
use facelock_core::pipeline::pipeline_settings::{DetectorKind, LocatorKind, PipelineSettings};
use facelock_core::pipeline::run_stream_use_case::RunStreamUseCase;
use facelock_core::shared::model_resolver;
use facelock_core::video::domain::frame_sink::FrameSink;
use facelock_core::video::domain::frame_source::FrameSource;
use facelock_core::video::infrastructure::ffmpeg_frame_source::FfmpegFrameSource;
use facelock_core::video::infrastructure::image_directory_sink::ImageDirectorySink;
use facelock_core::video::infrastructure::image_file_source::{is_image_file, ImageFileSource};

/// Progress lines are logged every this many frames.
const PROGRESS_INTERVAL: usize = 30;

/// Real-time face alignment for videos, capture devices and images.
#[derive(Parser, Debug)]
#[command(name = "facelock")]
struct Cli {
    /// Video file, capture device (e.g. /dev/video0), image or image directory.
    input: String,

    /// Force an ffmpeg input format, e.g. v4l2, avfoundation or dshow.
    #[arg(long)]
    input_format: Option<String>,

    /// Directory for annotated frames and aligned crops.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON settings file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective settings as JSON and continue.
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Face detector: cascade or ssd.
    #[arg(long)]
    detector: Option<DetectorKind>,

    /// Eye locator: landmarks or cascade.
    #[arg(long)]
    locator: Option<LocatorKind>,

    /// Detector confidence threshold, in (0.1, 1.0].
    #[arg(long)]
    confidence: Option<f32>,

    /// Aligned crop width in pixels (> 31).
    #[arg(long)]
    width: Option<u32>,

    /// Aligned crop height in pixels (> 31).
    #[arg(long)]
    height: Option<u32>,

    /// Left eye position in the crop as "x,y" fractions, e.g. 0.35,0.35.
    #[arg(long, value_delimiter = ',', num_args = 2)]
    eye_position: Option<Vec<f64>>,

    /// Draw the eye-corner landmarks on annotated frames.
    #[arg(long)]
    show_landmarks: bool,

    /// TrueType font for the status text overlay.
    #[arg(long)]
    overlay_font: Option<PathBuf>,

    /// SSD face detector model (path or cached file name).
    #[arg(long)]
    ssd_model: Option<String>,

    /// 68-point landmark model (path or cached file name).
    #[arg(long)]
    landmark_model: Option<String>,

    /// Face cascade model (path or cached file name).
    #[arg(long)]
    face_cascade: Option<String>,

    /// Eye cascade model, required by the cascade locator.
    ///
    /// Loaded through rustface, which only reads SeetaFace FuSt models.
    /// SeetaFace publishes no eye model, so this needs a FuSt cascade
    /// trained on eye crops; OpenCV Haar XML files are not accepted.
    #[arg(long)]
    eye_cascade: Option<String>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = build_settings(&cli)?;
    if let Some(path) = &cli.save_config {
        settings.save_json(path)?;
        log::info!("Settings written to {}", path.display());
    }

    let detector = build_detector(&settings)?;
    let locator = build_locator(&settings)?;
    let annotator = build_annotator(&settings)?;
    let pipeline = FaceAlignmentPipeline::new(detector, locator, annotator, &settings)?;

    let source = open_source(&cli)?;
    let sink: Option<Box<dyn FrameSink>> = match &cli.output {
        Some(dir) => Some(Box::new(ImageDirectorySink::create(dir)?)),
        None => None,
    };

    let mut use_case = RunStreamUseCase::new(
        source,
        pipeline,
        sink,
        Box::new(LogPipelineLogger::new(PROGRESS_INTERVAL)),
        Arc::new(AtomicBool::new(false)),
        cli.max_frames,
    );
    let snapshot = use_case.execute()?;
    if snapshot.frames_total == 0 {
        log::warn!("No frames read from {}", cli.input);
    }
    Ok(())
}

/// Defaults, then the optional config file, then individual flags.
fn build_settings(cli: &Cli) -> Result<PipelineSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => PipelineSettings::load_json(path)?,
        None => PipelineSettings::default(),
    };

    if let Some(detector) = cli.detector {
        settings.detector = detector;
    }
    if let Some(locator) = cli.locator {
        settings.locator = locator;
    }
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    if let Some(width) = cli.width {
        settings.target.width = width;
    }
    if let Some(height) = cli.height {
        settings.target.height = height;
    }
    if let Some([x, y]) = cli.eye_position.as_deref() {
        settings.target = settings.target.with_eye_position(*x, *y);
    }
    if cli.show_landmarks {
        settings.overlay.show_landmarks = true;
    }
    if let Some(font) = &cli.overlay_font {
        settings.overlay.font = Some(font.clone());
    }
    if let Some(model) = &cli.ssd_model {
        settings.models.ssd = model.clone();
    }
    if let Some(model) = &cli.landmark_model {
        settings.models.landmarks = model.clone();
    }
    if let Some(model) = &cli.face_cascade {
        settings.models.face_cascade = model.clone();
    }
    if let Some(model) = &cli.eye_cascade {
        settings.models.eye_cascade = Some(model.clone());
    }

    settings.validate()?;
    Ok(settings)
}

fn build_detector(
    settings: &PipelineSettings,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let models = &settings.models;
    match settings.detector {
        DetectorKind::Ssd => {
            let path = resolve_model(&models.ssd, models.ssd_url.as_deref())?;
            Ok(Box::new(OnnxSsdDetector::new(&path, settings.ssd)?))
        }
        DetectorKind::Cascade => {
            let path = resolve_model(&models.face_cascade, models.face_cascade_url.as_deref())?;
            let classifier = RustfaceCascade::new(&path)?;
            Ok(Box::new(CascadeFaceDetector::new(
                Box::new(classifier),
                settings.face_cascade,
            )?))
        }
    }
}

fn build_locator(
    settings: &PipelineSettings,
) -> Result<Box<dyn EyeLocator>, Box<dyn std::error::Error>> {
    let models = &settings.models;
    match settings.locator {
        LocatorKind::Landmarks => {
            let path = resolve_model(&models.landmarks, models.landmarks_url.as_deref())?;
            let model = OnnxLandmarkModel::new(&path, settings.landmark_margin)?;
            Ok(Box::new(LandmarkEyeLocator::new(Box::new(model))))
        }
        LocatorKind::Cascade => {
            let identifier = models
                .eye_cascade
                .as_deref()
                .ok_or("The cascade locator needs --eye-cascade")?;
            let path = resolve_model(identifier, None)?;
            let classifier = RustfaceCascade::new(&path)?;
            Ok(Box::new(CascadeEyeLocator::new(
                Box::new(classifier),
                settings.eye_cascade,
            )?))
        }
    }
}

fn build_annotator(
    settings: &PipelineSettings,
) -> Result<FrameAnnotator, Box<dyn std::error::Error>> {
    let annotator = FrameAnnotator::new(settings.overlay.show_landmarks);
    match &settings.overlay.font {
        Some(path) => {
            let font = FrameAnnotator::load_font(path)?;
            Ok(annotator.with_font(font, settings.overlay.font_size))
        }
        None => Ok(annotator),
    }
}

fn resolve_model(
    identifier: &str,
    url: Option<&str>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {identifier}");
    let path = model_resolver::resolve(identifier, url, Some(Box::new(download_progress)))?;
    Ok(path)
}

fn open_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    let path = Path::new(&cli.input);
    if cli.input_format.is_none() && (path.is_dir() || is_image_file(path)) {
        Ok(Box::new(ImageFileSource::open(path)?))
    } else {
        Ok(Box::new(FfmpegFrameSource::open(
            &cli.input,
            cli.input_format.as_deref(),
        )?))
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
