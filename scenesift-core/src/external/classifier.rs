// ============================================================================
// scenesift-core/src/external/classifier.rs
// ============================================================================
//
// CLASSIFIER: External Image Detector Integration
//
// The pipeline only needs the labels found in each sampled frame. The
// Classifier trait hides how they are obtained; CommandClassifier runs a
// detector program once per image and reads a JSON array from its stdout:
//
//   [{"box": [x1, y1, x2, y2], "score": 0.87, "label": "FACE_F"}, ...]
//
// Detectors written in Python often print the repr of a list of dicts, with
// single quotes. That form is accepted as well.

use crate::config::DetectorConfig;
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// One labelled region reported by the detector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub label: String,
    #[serde(default)]
    pub score: f32,
    #[serde(rename = "box", default)]
    pub bbox: Vec<f64>,
}

/// Something that can list the detections in an image.
///
/// Implementations are called from several worker threads at once.
pub trait Classifier: Sync {
    fn classify(&self, image: &Path) -> CoreResult<Vec<Detection>>;
}

/// Runs an external detector program per image.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

impl Classifier for CommandClassifier {
    fn classify(&self, image: &Path) -> CoreResult<Vec<Detection>> {
        log::debug!(
            "Running detector: {} {} {}",
            self.program,
            self.args.join(" "),
            image.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .map_err(|e| command_start_error(self.program.clone(), e))?;

        if !output.status.success() {
            return Err(command_failed_error(
                self.program.clone(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_detections(&stdout).map_err(|e| {
            CoreError::Classifier(format!("{} on {}: {e}", self.program, image.display()))
        })
    }
}

/// Parses detector output. Empty output means no detections.
pub fn parse_detections(text: &str) -> Result<Vec<Detection>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Vec<Detection>>(trimmed) {
        Ok(detections) => Ok(detections),
        Err(first_err) if trimmed.contains('\'') => {
            serde_json::from_str::<Vec<Detection>>(&trimmed.replace('\'', "\""))
                .map_err(|_| format!("unparseable detector output: {first_err}"))
        }
        Err(err) => Err(format!("unparseable detector output: {err}")),
    }
}

/// Labels of the detections scoring at least `min_score`, in first-seen
/// order without duplicates.
pub fn labels_above(detections: &[Detection], min_score: Option<f32>) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for detection in detections {
        if min_score.is_some_and(|min| detection.score < min) {
            continue;
        }
        if !labels.contains(&detection.label) {
            labels.push(detection.label.clone());
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_output() {
        let out = r#"[{"box": [1, 2, 30, 40], "score": 0.91, "label": "FACE_F"}]"#;
        let detections = parse_detections(out).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "FACE_F");
        assert_eq!(detections[0].bbox, vec![1.0, 2.0, 30.0, 40.0]);
    }

    #[test]
    fn test_parse_python_repr_output() {
        let out = "[{'box': [0, 0, 5, 5], 'score': 0.4, 'label': 'EXPOSED_FEET'},\n \
                   {'box': [1, 1, 2, 2], 'score': 0.8, 'label': 'FACE_M'}]\n";
        let detections = parse_detections(out).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[1].label, "FACE_M");
    }

    #[test]
    fn test_empty_output_means_nothing_detected() {
        assert!(parse_detections("  \n").unwrap().is_empty());
        assert!(parse_detections("[]").unwrap().is_empty());
    }

    #[test]
    fn test_garbage_output_is_rejected() {
        assert!(parse_detections("Traceback (most recent call last)").is_err());
    }

    #[test]
    fn test_labels_filtered_by_score_and_deduplicated() {
        let detections = parse_detections(
            r#"[{"score": 0.9, "label": "FACE_F"},
                {"score": 0.2, "label": "EXPOSED_BELLY"},
                {"score": 0.7, "label": "FACE_F"}]"#,
        )
        .unwrap();
        assert_eq!(labels_above(&detections, Some(0.5)), vec!["FACE_F"]);
        assert_eq!(labels_above(&detections, None), vec!["FACE_F", "EXPOSED_BELLY"]);
    }

    #[test]
    fn test_missing_detector_fails_to_start() {
        let classifier = CommandClassifier::new("scenesift-no-such-detector", vec![]);
        let err = classifier.classify(Path::new("frame.png")).unwrap_err();
        assert!(matches!(err, CoreError::CommandStart(..)));
    }
}
