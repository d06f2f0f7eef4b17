// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for command-line and UI callers.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives whether the caller should retry, ask for different
// input, or give up.

use crate::error::UprezError;

/// Severity of an error from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retrying (possibly with different parameters) may succeed.
    Transient,
    /// The caller must change something: the file, a flag, a setting.
    ActionRequired,
    /// Cannot be fixed by retrying or adjusting parameters.
    Permanent,
}

/// A human-readable error with a plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What to try next.
    pub suggestion: String,
    /// Whether an automatic retry makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n  {}", self.message, self.suggestion)
    }
}

/// Convert an `UprezError` into a `HumanError`.
pub fn humanize_error(err: &UprezError) -> HumanError {
    match err {
        // -- Input errors --
        UprezError::InvalidInput(detail) => HumanError {
            message: "The input can't be processed.".into(),
            suggestion: format!("Check the file and options you passed. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        UprezError::InvalidDensity(detail) => HumanError {
            message: "The requested resolution isn't usable.".into(),
            suggestion: format!(
                "Pick a target DPI between 72 and 2400, or pass --source-dpi if the scan has no resolution tag. ({detail})"
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        UprezError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a TIFF or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- External engines --
        UprezError::OcrError(_) => HumanError {
            message: "Text recognition didn't work on this scan.".into(),
            suggestion: "Check the OCR model directory. Text will be upscaled without reconstruction in the meantime.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        UprezError::SuperResolution(detail) => {
            if detail.contains("not found") || detail.contains("load") {
                HumanError {
                    message: "The super-resolution model couldn't be loaded.".into(),
                    suggestion: "Check the --sr-model path, or omit it to use plain resampling for pictures.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Upscaling the pictures on this page failed.".into(),
                    suggestion: format!("Try a smaller page or a different model. ({detail})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        UprezError::FontError(_) => HumanError {
            message: "The preferred font couldn't be loaded.".into(),
            suggestion: "Pass --font with a TrueType or OpenType file. A built-in font is used meanwhile.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Configuration --
        UprezError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix the setting and try again, or run `uprez config` for defaults. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Storage --
        UprezError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Permission denied reading or writing that file.".into(),
                    suggestion: "Check the file permissions, or write the output somewhere else.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        UprezError::Serialization(_) => HumanError {
            message: "A JSON file couldn't be read.".into(),
            suggestion: "Check the configuration file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_is_action_required() {
        let human = humanize_error(&UprezError::InvalidDensity("target 9000".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("target 9000"));
    }

    #[test]
    fn ocr_failure_is_transient() {
        let human = humanize_error(&UprezError::OcrError("engine crashed".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_model_is_action_required() {
        let err = UprezError::SuperResolution("model not found at /x.rten".into());
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn missing_file_is_action_required() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let human = humanize_error(&UprezError::Io(io));
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn corrupt_image_is_permanent() {
        let human = humanize_error(&UprezError::ImageError("bad header".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
