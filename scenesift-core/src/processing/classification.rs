//! Classification of sampled frames and selection of matches.
//!
//! Frames are classified independently and in parallel; results are collected
//! in sample order, so the match list handed to the interval builder is
//! always sorted by timestamp.

use std::path::Path;

use rayon::prelude::*;

use crate::checkpoint::{Observation, Sample};
use crate::error::CoreResult;
use crate::external::Classifier;
use crate::external::classifier::labels_above;
use crate::tags::TagMatcher;
use crate::terminal;

/// Runs the classifier over every sample. The first failure aborts the stage.
pub fn classify_samples<C: Classifier>(
    classifier: &C,
    dir: &Path,
    samples: &[Sample],
    min_score: Option<f32>,
) -> CoreResult<Vec<Observation>> {
    terminal::start_progress("Classifying", samples.len() as u64);

    let observations = samples
        .par_iter()
        .map(|sample| {
            let detections = classifier.classify(&dir.join(&sample.image))?;
            let labels = labels_above(&detections, min_score);
            log::debug!("{}s: {}", sample.timestamp, labels.join(" "));
            terminal::advance_progress();
            Ok(Observation {
                timestamp: sample.timestamp,
                image: sample.image.clone(),
                labels,
            })
        })
        .collect::<CoreResult<Vec<_>>>();

    match observations {
        Ok(observations) => {
            terminal::finish_progress_bar();
            Ok(observations)
        }
        Err(e) => {
            terminal::clear_progress_bar();
            Err(e)
        }
    }
}

/// Keeps the observations the matcher accepts, in their original order.
pub fn select_matches(observations: &[Observation], matcher: &TagMatcher) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| matcher.matches(&o.labels))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockClassifier;
    use crate::processing::sampling::frame_file_name;
    use crate::tags::parse_tag_list;
    use std::path::PathBuf;

    fn samples(timestamps: &[f64]) -> Vec<Sample> {
        timestamps
            .iter()
            .map(|&timestamp| Sample {
                timestamp,
                image: PathBuf::from(frame_file_name(timestamp)),
            })
            .collect()
    }

    #[test]
    fn test_observations_keep_sample_order() {
        let classifier = MockClassifier::new();
        classifier.labels_at(20.0, &["FACE_F"]);
        classifier.labels_at(40.0, &["EXPOSED_BELLY", "FACE_M"]);

        let observations =
            classify_samples(&classifier, Path::new("/ws"), &samples(&[0.0, 20.0, 40.0]), None)
                .unwrap();

        let timestamps: Vec<f64> = observations.iter().map(|o| o.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 20.0, 40.0]);
        assert!(observations[0].labels.is_empty());
        assert_eq!(observations[2].labels, vec!["EXPOSED_BELLY", "FACE_M"]);
        assert_eq!(classifier.calls().len(), 3);
    }

    #[test]
    fn test_classifier_failure_aborts() {
        let classifier = MockClassifier::new();
        classifier.fail_at(20.0);
        let result = classify_samples(&classifier, Path::new("/ws"), &samples(&[0.0, 20.0]), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_matches_applies_unwanted() {
        let matcher = TagMatcher::new(
            parse_tag_list("EXPOSED_BELLY").unwrap(),
            parse_tag_list("FACE_M").unwrap(),
        );
        let observations = vec![
            Observation {
                timestamp: 1.0,
                image: PathBuf::from("a.png"),
                labels: vec!["EXPOSED_BELLY".into()],
            },
            Observation {
                timestamp: 2.0,
                image: PathBuf::from("b.png"),
                labels: vec!["EXPOSED_BELLY".into(), "FACE_M".into()],
            },
        ];
        let matches = select_matches(&observations, &matcher);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].timestamp, 1.0);
    }
}
