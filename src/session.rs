//! The interactive flow as an explicit state machine.
//!
//! ```text
//! Start -> AwaitInputFile -> AwaitEditChoice -> AwaitWatermarkChoice -> Start | Done
//! ```
//!
//! Declining the welcome question ends the session. Stage failures are
//! reported and the flow starts over; prompt I/O failures end the session.

use crate::cleanup::cleanup_intermediates;
use crate::config::{MissingOverlayPolicy, Settings};
use crate::edit::{apply_edit, parse_amount, EditSpec};
use crate::naming::Naming;
use crate::prompt::Prompter;
use crate::text::TextRenderer;
use crate::watermark::{WatermarkSpec, Watermarker};
use crate::{ImageAsset, Result, WatermarkError};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DEFAULT_INPUT: &str = "test.jpg";
const DEFAULT_OVERLAY: &str = "logo.png";
const DEFAULT_AMOUNT: &str = "0.5";

const EDIT_CHOICES: [&str; 4] = [
    "make image brighter",
    "increase contrast",
    "make image b&w",
    "invert image",
];
const WATERMARK_CHOICES: [&str; 2] = ["Text watermark", "Image watermark"];

const MSG_TRY_AGAIN: &str = "Something went wrong... Try again";
const MSG_BAD_INPUT: &str = "Something went wrong (with your input-file)... Try again";
const MSG_BAD_OVERLAY: &str = "Something went wrong (with your watermark file)... Try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    AwaitInputFile,
    AwaitEditChoice,
    AwaitWatermarkChoice,
    Done,
}

/// Choices accumulated during one pass through the flow.
#[derive(Debug, Default)]
struct Context {
    source: Option<ImageAsset>,
    naming: Naming,
    /// The image the watermark goes on: the source or its edited copy.
    working: Option<ImageAsset>,
}

pub struct Session<P> {
    settings: Settings,
    watermarker: Watermarker,
    prompter: P,
    outputs: Vec<PathBuf>,
}

impl<P: Prompter> Session<P> {
    pub fn new(settings: Settings, prompter: P) -> Result<Self> {
        settings.validate()?;
        let renderer = match &settings.font_path {
            Some(path) => TextRenderer::from_file(path)?,
            None => TextRenderer::new()?,
        };
        let watermarker = Watermarker::new(renderer)
            .with_font_size(settings.font_size)
            .with_overlay_width(settings.overlay_width)
            .with_opacity(settings.overlay_opacity);

        Ok(Self {
            settings,
            watermarker,
            prompter,
            outputs: Vec::new(),
        })
    }

    /// Watermarked files produced so far.
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    pub fn run(&mut self) -> Result<()> {
        let mut state = State::Start;
        let mut ctx = Context::default();
        loop {
            debug!(?state, "session step");
            state = match state {
                State::Start => {
                    ctx = Context::default();
                    self.start()?
                }
                State::AwaitInputFile => self.await_input_file(&mut ctx)?,
                State::AwaitEditChoice => self.await_edit_choice(&mut ctx)?,
                State::AwaitWatermarkChoice => self.await_watermark_choice(&mut ctx)?,
                State::Done => return Ok(()),
            };
        }
    }

    fn start(&mut self) -> Result<State> {
        let welcome = format!(
            "Hi! Welcome to \"Watermark manager\". Copy your image files to `{}` folder. \
             Then you'll be able to use them in the app. Are you ready?",
            self.settings.work_dir.display()
        );
        if self.prompter.confirm(&welcome)? {
            Ok(State::AwaitInputFile)
        } else {
            Ok(State::Done)
        }
    }

    fn await_input_file(&mut self, ctx: &mut Context) -> Result<State> {
        let name = self
            .prompter
            .input("What file do you want to mark?", Some(DEFAULT_INPUT))?;

        let source = match ImageAsset::source(&self.settings.work_dir, name.trim()) {
            Ok(source) => source,
            Err(e) => {
                debug!(error = %e, "input file rejected");
                self.prompter.notify(MSG_BAD_INPUT);
                return Ok(State::AwaitInputFile);
            }
        };

        match Naming::for_source(self.settings.naming, source.path()) {
            Ok(naming) => ctx.naming = naming,
            Err(e) => return Ok(self.report(e)),
        }
        ctx.working = Some(source.clone());
        ctx.source = Some(source);
        Ok(State::AwaitEditChoice)
    }

    fn await_edit_choice(&mut self, ctx: &mut Context) -> Result<State> {
        if !self.prompter.confirm("Do you want to edit your file?")? {
            return Ok(State::AwaitWatermarkChoice);
        }

        let choice = self.prompter.select("Choose an edit", &EDIT_CHOICES)?;
        let spec = match choice {
            0 => match self.ask_amount("Choose the brightness (between -1 and 1)")? {
                Ok(amount) => EditSpec::Brighten(amount),
                Err(e) => return Ok(self.report(e)),
            },
            1 => match self.ask_amount("Choose the contrast (between -1 and 1)")? {
                Ok(amount) => EditSpec::Contrast(amount),
                Err(e) => return Ok(self.report(e)),
            },
            2 => EditSpec::Greyscale,
            _ => EditSpec::Invert,
        };

        let Some(source) = ctx.source.as_ref() else {
            return Ok(State::AwaitInputFile);
        };
        match apply_edit(spec, source, &ctx.naming) {
            Ok(edited) => {
                ctx.working = Some(edited);
                Ok(State::AwaitWatermarkChoice)
            }
            Err(e) => Ok(self.report(e)),
        }
    }

    fn await_watermark_choice(&mut self, ctx: &mut Context) -> Result<State> {
        let Some(working) = ctx.working.as_ref() else {
            return Ok(State::AwaitInputFile);
        };

        let spec = match self.prompter.select("Choose a watermark", &WATERMARK_CHOICES)? {
            0 => WatermarkSpec::Text(self.prompter.input("Type your watermark text:", None)?),
            _ => {
                let name = self
                    .prompter
                    .input("Type your watermark name:", Some(DEFAULT_OVERLAY))?;
                WatermarkSpec::Image(self.settings.work_dir.join(name.trim()))
            }
        };

        match self.watermarker.apply(&spec, working, &ctx.naming) {
            Ok(output) => {
                self.sweep();
                self.prompter.notify(&format!(
                    "Success! Check folder {} and try one more.",
                    self.settings.work_dir.display()
                ));
                self.outputs.push(output.path().to_path_buf());
                if self.settings.loop_after_success {
                    Ok(State::Start)
                } else {
                    Ok(State::Done)
                }
            }
            Err(e) if e.is_missing_overlay() => {
                debug!(error = %e, policy = ?self.settings.missing_overlay, "watermark image missing");
                self.prompter.notify(MSG_BAD_OVERLAY);
                match self.settings.missing_overlay {
                    MissingOverlayPolicy::Abort => Err(e),
                    MissingOverlayPolicy::Retry => Ok(State::AwaitWatermarkChoice),
                }
            }
            Err(e) => Ok(self.report(e)),
        }
    }

    // Outer Err: prompt failed. Inner Err: the answer is not a number.
    fn ask_amount(&mut self, message: &str) -> Result<Result<f32>> {
        let raw = self.prompter.input(message, Some(DEFAULT_AMOUNT))?;
        Ok(parse_amount(&raw))
    }

    fn sweep(&mut self) {
        match cleanup_intermediates(&self.settings.work_dir) {
            Ok(removed) if !removed.is_empty() => info!(count = removed.len(), "swept intermediates"),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not sweep intermediates"),
        }
    }

    fn report(&mut self, error: WatermarkError) -> State {
        debug!(error = %error, "processing failed");
        self.prompter.notify(MSG_TRY_AGAIN);
        State::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::Path;

    fn settings(dir: &Path) -> Settings {
        Settings {
            work_dir: dir.to_path_buf(),
            loop_after_success: false,
            ..Settings::default()
        }
    }

    fn save_solid(dir: &Path, name: &str, px: [u8; 4]) {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba(px)));
        crate::codec::write_full_quality(&image, dir.join(name)).unwrap();
    }

    fn run(settings: Settings, answers: Vec<Answer>) -> (Result<()>, Vec<PathBuf>, ScriptedPrompter) {
        let mut session = Session::new(settings, ScriptedPrompter::new(answers)).unwrap();
        let result = session.run();
        let outputs = session.outputs().to_vec();
        (result, outputs, session.into_prompter())
    }

    #[test]
    fn declining_ends_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let (result, outputs, prompter) = run(settings(dir.path()), vec![Answer::No]);
        assert!(result.is_ok());
        assert!(outputs.is_empty());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn missing_input_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), "real.png", [255; 4]);
        let answers = vec![
            Answer::Yes,
            Answer::text("ghost.png"),
            Answer::text("real.png"),
            Answer::No,
            Answer::Choose(0),
            Answer::text("hi"),
        ];
        let (result, outputs, prompter) = run(settings(dir.path()), answers);
        assert!(result.is_ok());
        assert_eq!(outputs, vec![dir.path().join("real-with-watermark.png")]);
        assert_eq!(prompter.notes()[0], MSG_BAD_INPUT);
    }

    #[test]
    fn bad_amount_restarts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), "pic.png", [10, 10, 10, 255]);
        let answers = vec![
            Answer::Yes,
            Answer::text("pic.png"),
            Answer::Yes,
            Answer::Choose(0),
            Answer::text("abc"),
            // back at the welcome question
            Answer::No,
        ];
        let (result, outputs, prompter) = run(settings(dir.path()), answers);
        assert!(result.is_ok());
        assert!(outputs.is_empty());
        assert_eq!(prompter.notes(), [MSG_TRY_AGAIN]);
        assert!(!dir.path().join("pic-edit.png").exists());
    }

    #[test]
    fn missing_overlay_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), "pic.png", [10, 10, 10, 255]);
        let answers = vec![
            Answer::Yes,
            Answer::text("pic.png"),
            Answer::No,
            Answer::Choose(1),
            Answer::Default,
        ];
        let (result, outputs, prompter) = run(settings(dir.path()), answers);
        assert!(result.unwrap_err().is_missing_overlay());
        assert!(outputs.is_empty());
        assert_eq!(prompter.notes(), [MSG_BAD_OVERLAY]);
        assert!(!dir.path().join("pic-with-watermark.png").exists());
    }

    #[test]
    fn missing_overlay_retry_policy() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), "pic.png", [10, 10, 10, 255]);
        save_solid(dir.path(), "mark.png", [255, 0, 0, 255]);
        let answers = vec![
            Answer::Yes,
            Answer::text("pic.png"),
            Answer::No,
            Answer::Choose(1),
            Answer::Default,
            Answer::Choose(1),
            Answer::text("mark.png"),
        ];
        let settings = Settings {
            missing_overlay: MissingOverlayPolicy::Retry,
            ..settings(dir.path())
        };
        let (result, outputs, _) = run(settings, answers);
        assert!(result.is_ok());
        assert_eq!(outputs, vec![dir.path().join("pic-with-watermark.png")]);
    }

    #[test]
    fn loops_back_after_success() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), DEFAULT_INPUT, [200, 200, 200, 255]);
        let answers = vec![
            Answer::Yes,
            Answer::Default,
            Answer::No,
            Answer::Choose(0),
            Answer::text("one"),
            Answer::No,
        ];
        let mut settings = settings(dir.path());
        settings.loop_after_success = true;

        let (result, outputs, prompter) = run(settings, answers);
        assert!(result.is_ok());
        assert_eq!(outputs, vec![dir.path().join("test-with-watermark.jpg")]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn nested_input_writes_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        save_solid(&dir.path().join("sub"), "x.png", [255; 4]);
        let answers = vec![
            Answer::Yes,
            Answer::text("sub/x.png"),
            Answer::Yes,
            Answer::Choose(3),
            Answer::Choose(0),
            Answer::text("hi"),
        ];
        let (result, outputs, prompter) = run(settings(dir.path()), answers);
        assert!(result.is_ok());
        assert_eq!(outputs, vec![dir.path().join("sub").join("x-with-watermark.png")]);
        assert!(!prompter.notes().iter().any(|n| n == MSG_TRY_AGAIN));
    }

    #[test]
    fn misnamed_source_is_watermarked() {
        let dir = tempfile::tempdir().unwrap();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([255; 4])))
            .save_with_format(dir.path().join("photo.jpg"), image::ImageFormat::Png)
            .unwrap();
        let answers = vec![
            Answer::Yes,
            Answer::text("photo.jpg"),
            Answer::No,
            Answer::Choose(0),
            Answer::text("hi"),
        ];
        let (result, outputs, _) = run(settings(dir.path()), answers);
        assert!(result.is_ok());
        assert_eq!(outputs, vec![dir.path().join("photo-with-watermark.jpg")]);
        assert!(image::open(&outputs[0]).is_ok());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn user_mistakes_stay_below_warn() {
        let dir = tempfile::tempdir().unwrap();
        save_solid(dir.path(), "pic.png", [10, 10, 10, 255]);
        let answers = vec![
            Answer::Yes,
            Answer::text("typo.png"),
            Answer::text("pic.png"),
            Answer::Yes,
            Answer::Choose(1),
            Answer::text("abc"),
            Answer::No,
        ];

        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let (result, _, prompter) =
            tracing::subscriber::with_default(subscriber, || run(settings(dir.path()), answers));

        assert!(result.is_ok());
        assert_eq!(prompter.notes(), [MSG_BAD_INPUT, MSG_TRY_AGAIN]);
        assert!(logs.0.lock().unwrap().is_empty());
    }

    #[test]
    fn prompt_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (result, _, _) = run(settings(dir.path()), vec![Answer::Yes]);
        assert!(matches!(result, Err(WatermarkError::Prompt(_))));
    }
}
