// ============================================================================
// scenesift-core/src/processing/sampling.rs
// ============================================================================
//
// FRAME SAMPLING: Periodic Keyframe Grabs With ffmpeg
//
// One frame every `sample_interval` seconds from `skip_begin` up to the usable
// duration, plus a terminal frame one second before the end when the end of
// the video is not skipped. Each frame is the nearest keyframe at or after
// the seek point, scaled to the configured width and written as PNG.

use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::FfmpegCommand;
use rayon::prelude::*;

use crate::checkpoint::Sample;
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, run_ffmpeg};
use crate::terminal;

/// File name of the frame sampled at `timestamp`, e.g. `frame-0000021500.png`.
///
/// Millisecond precision, zero padded so names sort like timestamps.
pub fn frame_file_name(timestamp: f64) -> String {
    let millis = (timestamp * 1000.0).round().max(0.0) as u64;
    format!("frame-{millis:010}.png")
}

/// Seek points for the sampler.
///
/// `usable_duration` is the probed duration minus `skip_finish`. Points are
/// `skip_begin + k * interval` strictly below `usable_duration`. A terminal
/// point at `usable_duration - 1` is appended when `skip_finish < 1` and it
/// lies after the last regular point.
pub fn sample_timestamps(
    skip_begin: f64,
    interval: f64,
    usable_duration: f64,
    skip_finish: f64,
) -> Vec<f64> {
    assert!(interval > 0.0, "sample interval must be positive");

    let mut timestamps: Vec<f64> = (0u64..)
        .map(|k| skip_begin + k as f64 * interval)
        .take_while(|t| *t < usable_duration)
        .collect();

    if skip_finish < 1.0 {
        let terminal = usable_duration - 1.0;
        let after_last = timestamps.last().is_none_or(|last| terminal > *last);
        if terminal >= 0.0 && after_last {
            timestamps.push(terminal);
        }
    }

    timestamps
}

fn frame_command(source: &Path, timestamp: f64, width: u32, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-v", "error", "-y"]);
    cmd.args(["-skip_frame", "nokey"]);
    cmd.arg("-ss");
    cmd.arg(format!("{timestamp}"));
    cmd.input(source.to_string_lossy().as_ref());
    cmd.args([
        "-vf".to_string(),
        format!("select=eq(pict_type\\,I),scale={width}:-1"),
    ]);
    cmd.args(["-an", "-q:v", "3", "-frames:v", "1"]);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Grabs one frame per timestamp into `dir`.
///
/// Frames ffmpeg could not produce (typically no keyframe left before the end
/// of the stream) are skipped with a warning. Failing to start ffmpeg at all
/// is fatal. The result keeps timestamp order.
pub fn sample_frames<S: FfmpegSpawner>(
    spawner: &S,
    source: &Path,
    dir: &Path,
    timestamps: &[f64],
    width: u32,
) -> CoreResult<Vec<Sample>> {
    terminal::start_progress("Sampling", timestamps.len() as u64);

    let grabbed: Vec<Option<Sample>> = timestamps
        .par_iter()
        .map(|&timestamp| {
            let name = PathBuf::from(frame_file_name(timestamp));
            let output = dir.join(&name);
            let cmd = frame_command(source, timestamp, width, &output);
            let result = run_ffmpeg(spawner, cmd, "frame sampling");
            terminal::advance_progress();

            match result {
                Err(e @ CoreError::CommandStart(..)) => Err(e),
                Err(e) => {
                    log::warn!("No frame at {timestamp}s: {e}");
                    Ok(None)
                }
                Ok(()) if !output.is_file() => {
                    log::warn!("No frame at {timestamp}s: ffmpeg produced no image");
                    Ok(None)
                }
                Ok(()) => Ok(Some(Sample { timestamp, image: name })),
            }
        })
        .collect::<CoreResult<_>>()?;

    terminal::finish_progress_bar();
    Ok(grabbed.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;
    use tempfile::tempdir;

    #[test]
    fn test_timestamps_with_terminal_frame() {
        assert_eq!(sample_timestamps(1.0, 20.0, 65.0, 0.0), vec![1.0, 21.0, 41.0, 61.0, 64.0]);
    }

    #[test]
    fn test_skipped_finish_has_no_terminal_frame() {
        assert_eq!(sample_timestamps(1.0, 20.0, 55.0, 5.0), vec![1.0, 21.0, 41.0]);
    }

    #[test]
    fn test_terminal_frame_never_precedes_last_sample() {
        assert_eq!(sample_timestamps(0.0, 10.0, 25.0, 0.0), vec![0.0, 10.0, 20.0, 24.0]);
        assert_eq!(sample_timestamps(0.0, 10.0, 20.5, 0.0), vec![0.0, 10.0, 20.0]);
        assert_eq!(sample_timestamps(0.0, 10.0, 10.5, 0.0), vec![0.0, 10.0]);
    }

    #[test]
    fn test_video_shorter_than_skip_begin() {
        assert_eq!(sample_timestamps(30.0, 20.0, 10.0, 0.0), vec![9.0]);
        assert!(sample_timestamps(30.0, 20.0, 0.5, 0.0).is_empty());
    }

    #[test]
    fn test_frame_names_sort_by_time() {
        assert_eq!(frame_file_name(21.5), "frame-0000021500.png");
        assert!(frame_file_name(9.0) < frame_file_name(10.0));
    }

    #[test]
    fn test_missing_frames_are_skipped() {
        let dir = tempdir().unwrap();
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("frame-0000001000.png", vec![], true);
        spawner.add_success_expectation("frame-0000021000.png", vec![], false);
        spawner.add_exit_error_expectation("frame-0000041000.png", vec![], 1);

        let samples = sample_frames(
            &spawner,
            Path::new("/videos/in.mp4"),
            dir.path(),
            &[1.0, 21.0, 41.0],
            800,
        )
        .unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].timestamp, 1.0);

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .all(|call| call.iter().any(|a| a == "select=eq(pict_type\\,I),scale=800:-1")));
    }
}
