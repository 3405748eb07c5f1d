// ============================================================================
// scenesift-core/src/processing/pipeline.rs
// ============================================================================
//
// PIPELINE: Stage Sequencing for One or More Source Videos
//
// WORKFLOW (per video):
// 1. Short-circuit when the wanted tags are the NONE sentinel
// 2. Determine output paths; skip the video if an output already exists
// 3. Probe the duration and open the working directory
// 4. Sample -> Classify -> Match -> Segment, each writing its checkpoint.
//    Stages before `resume_from` are loaded from their checkpoints instead.
// 5. Classify the intervals (no match / whole stream / cut) and, for a cut,
//    extract and concatenate the clips (and the inverse, when requested)
// 6. Optionally write a note explaining why no video was produced
//
// External collaborators (ffmpeg, ffprobe, the detector) are generic
// parameters, so tests drive the whole pipeline with the mocks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::checkpoint::{
    self, DETECTIONS_FILE, MATCHES_FILE, Observation, SAMPLES_FILE, SEGMENTS_FILE, Sample, Stage,
};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{Classifier, FfmpegSpawner, FfprobeExecutor};
use crate::processing::classification::{classify_samples, select_matches};
use crate::processing::extract::{concat_clips, extract_clips};
use crate::processing::sampling::{sample_frames, sample_timestamps};
use crate::segments::{CutPlan, Interval, Inversion, build_intervals, invert_intervals};
use crate::tags::{TagMatcher, join_tags};
use crate::terminal;
use crate::utils::{format_duration, get_file_stem_safe, get_filename_safe, parent_dir};
use crate::workspace::Workspace;

/// How a video run ended. Only `Failed` is an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The wanted list is `NONE`; nothing was done.
    Disabled,
    /// An output file already exists; the video was not processed.
    OutputExists(PathBuf),
    /// No sample matched, or every run was shorter than the minimum duration.
    NoMatches,
    /// The kept material is the whole video; no file was written.
    WholeStream,
    /// The trimmed compilation (and its inverse, if requested) was written.
    Trimmed {
        output: PathBuf,
        inverse_output: Option<PathBuf>,
        intervals: Vec<Interval>,
    },
    /// A stage failed.
    Failed(String),
}

/// Result of processing one source video.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub source: PathBuf,
    pub outcome: RunOutcome,
    pub elapsed: Duration,
}

/// Where the artifacts of one source video go.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub output: PathBuf,
    pub inverse: PathBuf,
    pub note: PathBuf,
}

impl OutputPaths {
    /// `<stem>_<tag>.<ext>`, `<stem>_<tag>-inverse.<ext>` and
    /// `<stem>_scenesift.txt` in the output directory.
    pub fn for_source(source: &Path, config: &CoreConfig) -> CoreResult<Self> {
        let stem = get_file_stem_safe(source)?;
        let dir = config
            .output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(source).to_path_buf());
        let tag = config.output_tag();
        let ext = &config.video_ext;

        Ok(Self {
            output: dir.join(format!("{stem}_{tag}.{ext}")),
            inverse: dir.join(format!("{stem}_{tag}-inverse.{ext}")),
            note: dir.join(format!("{stem}_scenesift.txt")),
        })
    }

    fn existing(&self, inverse_enabled: bool) -> Option<&Path> {
        if self.output.exists() {
            Some(&self.output)
        } else if inverse_enabled && self.inverse.exists() {
            Some(&self.inverse)
        } else {
            None
        }
    }
}

/// Processes a list of source videos with a worker pool of `config.jobs` threads.
///
/// A failing video is reported and the next one is processed; its result
/// carries [`RunOutcome::Failed`]. Errors that affect every video (an invalid
/// configuration, a thread pool that cannot be built) are returned instead.
pub fn process_videos<S, P, C>(
    spawner: &S,
    ffprobe_executor: &P,
    classifier: &C,
    config: &CoreConfig,
    files: &[PathBuf],
) -> CoreResult<Vec<ProcessResult>>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    C: Classifier,
{
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("failed to build worker pool: {e}")))?;

    let mut results = Vec::with_capacity(files.len());
    for source in files {
        let started = Instant::now();
        let outcome = match pool.install(|| {
            process_video(spawner, ffprobe_executor, classifier, config, source)
        }) {
            Ok(outcome) => outcome,
            Err(e) => {
                terminal::clear_progress_bar();
                error!("Failed to process {}: {e}", source.display());
                terminal::print_error("Processing failed", &e.to_string(), None);
                RunOutcome::Failed(e.to_string())
            }
        };
        results.push(ProcessResult {
            source: source.clone(),
            outcome,
            elapsed: started.elapsed(),
        });
    }
    Ok(results)
}

/// Runs the whole pipeline for one source video.
pub fn process_video<S, P, C>(
    spawner: &S,
    ffprobe_executor: &P,
    classifier: &C,
    config: &CoreConfig,
    source: &Path,
) -> CoreResult<RunOutcome>
where
    S: FfmpegSpawner,
    P: FfprobeExecutor,
    C: Classifier,
{
    let filename = get_filename_safe(source)?;
    terminal::print_processing(&format!("Processing {filename}"));

    let Some(matcher) = config.matcher() else {
        info!("Wanted tags are {}; skipping {filename}", config.wanted);
        return Ok(RunOutcome::Disabled);
    };

    let paths = OutputPaths::for_source(source, config)?;
    if let Some(existing) = paths.existing(config.inverse) {
        error!(
            "Output file already exists: {}. Skipping {filename}.",
            existing.display()
        );
        return Ok(RunOutcome::OutputExists(existing.to_path_buf()));
    }

    let probed = ffprobe_executor.get_duration(source)?;
    let usable = (probed - config.skip_finish).max(0.0);
    terminal::print_status("Duration", &format_duration(probed), false);

    let keep = config.keep_workspace || config.resume_from > Stage::Sample;
    let location = Workspace::location(source, config.temp_dir.as_deref())?;
    let workspace = if config.resume_from == Stage::Sample {
        Workspace::create(location, keep)?
    } else {
        info!("Resuming at stage '{}' from {}", config.resume_from, location.display());
        Workspace::open_existing(location, keep)?
    };

    let run = Run {
        spawner,
        classifier,
        config,
        matcher: &matcher,
        source,
        workspace: &workspace,
        usable,
    };

    let intervals = run.intervals()?;
    let outcome = match CutPlan::from_intervals(intervals, usable) {
        CutPlan::NoMatches => {
            terminal::print_warning("No segment matched; no video produced");
            run.write_note(&paths.note, "no segment matched the wanted tags")?;
            RunOutcome::NoMatches
        }
        CutPlan::WholeStream => {
            terminal::print_warning("The whole video matched; no video produced");
            run.write_note(&paths.note, "the whole video matched the wanted tags")?;
            RunOutcome::WholeStream
        }
        CutPlan::Segments(intervals) => run.cut(&paths, intervals)?,
    };

    if let RunOutcome::Trimmed { output, .. } = &outcome {
        terminal::print_success(&format!("Wrote {}", output.display()));
    }
    Ok(outcome)
}

/// Per-video state shared by the stages.
struct Run<'a, S, C> {
    spawner: &'a S,
    classifier: &'a C,
    config: &'a CoreConfig,
    matcher: &'a TagMatcher,
    source: &'a Path,
    workspace: &'a Workspace,
    usable: f64,
}

impl<S: FfmpegSpawner, C: Classifier> Run<'_, S, C> {
    fn resumes_after(&self, stage: Stage) -> bool {
        self.config.resume_from > stage
    }

    fn samples(&self) -> CoreResult<Vec<Sample>> {
        let path = self.workspace.file(SAMPLES_FILE);
        if self.resumes_after(Stage::Sample) {
            return checkpoint::read_samples(&path);
        }

        let timestamps = sample_timestamps(
            self.config.skip_begin,
            self.config.sample_interval,
            self.usable,
            self.config.skip_finish,
        );
        info!("Sampling {} frames", timestamps.len());
        let samples = sample_frames(
            self.spawner,
            self.source,
            self.workspace.path(),
            &timestamps,
            self.config.sample_width,
        )?;
        if samples.len() < timestamps.len() {
            warn!("{} of {} frames could not be sampled", timestamps.len() - samples.len(), timestamps.len());
        }
        checkpoint::write_samples(&path, &samples)?;
        terminal::print_status("Samples", &samples.len().to_string(), false);
        Ok(samples)
    }

    fn observations(&self) -> CoreResult<Vec<Observation>> {
        let path = self.workspace.file(DETECTIONS_FILE);
        if self.resumes_after(Stage::Classify) {
            return checkpoint::read_observations(&path);
        }

        let samples = self.samples()?;
        let observations = classify_samples(
            self.classifier,
            self.workspace.path(),
            &samples,
            self.config.detector.min_score,
        )?;
        checkpoint::write_observations(&path, &observations)?;
        Ok(observations)
    }

    fn match_timestamps(&self) -> CoreResult<Vec<f64>> {
        let path = self.workspace.file(MATCHES_FILE);
        if self.resumes_after(Stage::Match) {
            return checkpoint::read_match_timestamps(&path);
        }

        let observations = self.observations()?;
        let matches = select_matches(&observations, self.matcher);
        checkpoint::write_observations(&path, &matches)?;
        terminal::print_status(
            "Matches",
            &format!("{} of {}", matches.len(), observations.len()),
            false,
        );
        info!(
            "Wanted: {}  Unwanted: {}",
            join_tags(self.matcher.wanted()),
            join_tags(self.matcher.unwanted())
        );
        Ok(matches.into_iter().map(|m| m.timestamp).collect())
    }

    fn intervals(&self) -> CoreResult<Vec<Interval>> {
        let path = self.workspace.file(SEGMENTS_FILE);
        if self.resumes_after(Stage::Segment) {
            let intervals = checkpoint::read_intervals(&path)?;
            check_loaded_intervals(&path, &intervals, self.usable)?;
            return Ok(intervals);
        }

        let timestamps = self.match_timestamps()?;
        let intervals = build_intervals(&timestamps, &self.config.segment_params(self.usable));
        checkpoint::write_intervals(&path, &intervals)?;

        let kept: f64 = intervals.iter().map(Interval::duration).sum();
        terminal::print_status("Segments", &intervals.len().to_string(), false);
        terminal::print_status("Kept", &format_duration(kept), true);
        for interval in &intervals {
            terminal::print_sub_item(&checkpoint::format_interval_line(interval));
        }
        Ok(intervals)
    }

    fn cut(&self, paths: &OutputPaths, intervals: Vec<Interval>) -> CoreResult<RunOutcome> {
        let ext = &self.config.video_ext;

        info!("Extracting {} segments", intervals.len());
        let clips = extract_clips(self.spawner, self.source, self.workspace.path(), &intervals, "clip", ext)?;
        concat_clips(self.spawner, self.workspace, &clips, &paths.output)?;

        let inverse_output = if self.config.inverse {
            match invert_intervals(&intervals, self.usable) {
                Inversion::FullyCovered => {
                    info!("Kept segments cover the whole video; no inverse written");
                    None
                }
                Inversion::Gaps(gaps) => {
                    info!("Extracting {} discarded segments", gaps.len());
                    let clips =
                        extract_clips(self.spawner, self.source, self.workspace.path(), &gaps, "gap", ext)?;
                    concat_clips(self.spawner, self.workspace, &clips, &paths.inverse)?;
                    Some(paths.inverse.clone())
                }
            }
        } else {
            None
        };

        Ok(RunOutcome::Trimmed {
            output: paths.output.clone(),
            inverse_output,
            intervals,
        })
    }

    fn write_note(&self, path: &Path, reason: &str) -> CoreResult<()> {
        if !self.config.write_note {
            return Ok(());
        }
        let c = self.config;
        let body = format!(
            "{source}\n\
             No video produced: {reason}.\n\
             Settings: -i {} -c {} -d {} -e {} -b {} -f {}\n\
             Wanted: {}\n\
             Unwanted: {}\n\
             Written: {}\n",
            c.sample_interval,
            c.gap_threshold,
            c.min_duration,
            c.extension,
            c.skip_begin,
            c.skip_finish,
            join_tags(self.matcher.wanted()),
            join_tags(self.matcher.unwanted()),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            source = self.source.display(),
        );
        fs::write(path, body)?;
        info!("Wrote note {}", path.display());
        Ok(())
    }
}

/// Intervals read back from disk must satisfy what the builder guarantees.
fn check_loaded_intervals(path: &Path, intervals: &[Interval], duration: f64) -> CoreResult<()> {
    let out_of_range = intervals.iter().find(|i| i.end > duration);
    if let Some(interval) = out_of_range {
        return Err(CoreError::Checkpoint(
            path.display().to_string(),
            format!("interval {interval} ends after the usable duration {duration}"),
        ));
    }
    if intervals.windows(2).any(|pair| pair[0].end >= pair[1].begin) {
        return Err(CoreError::Checkpoint(
            path.display().to_string(),
            "intervals are not ordered and disjoint".to_string(),
        ));
    }
    Ok(())
}
