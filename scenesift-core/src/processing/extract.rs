// ============================================================================
// scenesift-core/src/processing/extract.rs
// ============================================================================
//
// SEGMENT EXTRACTION AND CONCATENATION
//
// Fan-out: one stream-copy cut per interval, run in parallel, each writing
// its own clip file. Fan-in: the clips, in interval order, are joined with
// ffmpeg's concat demuxer, again without re-encoding.
//
// A single clip whose container already matches the output is moved into
// place instead of being run through the concat demuxer.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ffmpeg_sidecar::command::FfmpegCommand;
use rayon::prelude::*;

use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, run_ffmpeg};
use crate::segments::Interval;
use crate::workspace::Workspace;

fn cut_command(source: &Path, interval: &Interval, output: &Path) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(["-v", "error", "-y"]);
    cmd.arg("-ss");
    cmd.arg(format!("{}", interval.begin));
    cmd.input(source.to_string_lossy().as_ref());
    cmd.arg("-t");
    cmd.arg(format!("{}", interval.duration()));
    cmd.args(["-c", "copy", "-avoid_negative_ts", "make_zero"]);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Cuts one clip per interval into `dir` and returns the ordered manifest.
///
/// Clips are named `<prefix>-<index>.<ext>`. The first failing cut stops the
/// remaining queued cuts and fails the stage.
pub fn extract_clips<S: FfmpegSpawner>(
    spawner: &S,
    source: &Path,
    dir: &Path,
    intervals: &[Interval],
    prefix: &str,
    ext: &str,
) -> CoreResult<Vec<PathBuf>> {
    intervals
        .par_iter()
        .enumerate()
        .map(|(index, interval)| {
            let clip = dir.join(format!("{prefix}-{index:04}.{ext}"));
            log::debug!("Cutting {interval} into {}", clip.display());
            run_ffmpeg(spawner, cut_command(source, interval, &clip), "segment extraction")?;

            if !clip.is_file() {
                return Err(CoreError::OperationFailed(format!(
                    "segment extraction produced no file for {interval}"
                )));
            }
            Ok(clip)
        })
        .collect()
}

/// One concat-demuxer manifest line. Single quotes in the path are escaped
/// the way the demuxer expects (`'\''`).
pub fn manifest_line(clip: &Path) -> String {
    let path = clip.to_string_lossy().replace('\'', r"'\''");
    format!("file '{path}'")
}

fn same_extension(a: &Path, b: &Path) -> bool {
    match (a.extension(), b.extension()) {
        (Some(x), Some(y)) => x.to_string_lossy().eq_ignore_ascii_case(&y.to_string_lossy()),
        _ => false,
    }
}

fn move_file(from: &Path, to: &Path) -> CoreResult<()> {
    if fs::rename(from, to).is_err() {
        // Different file systems.
        fs::copy(from, to)?;
        fs::remove_file(from)?;
    }
    Ok(())
}

/// Joins the clips, in manifest order, into `output`.
pub fn concat_clips<S: FfmpegSpawner>(
    spawner: &S,
    workspace: &Workspace,
    clips: &[PathBuf],
    output: &Path,
) -> CoreResult<()> {
    match clips {
        [] => Err(CoreError::OperationFailed(
            "nothing to concatenate".to_string(),
        )),
        [single] if same_extension(single, output) => {
            log::debug!("Single clip, moving {} to {}", single.display(), output.display());
            move_file(single, output)
        }
        _ => {
            let mut list = workspace.scratch_file("concat", "txt")?;
            for clip in clips {
                let absolute = clip.canonicalize().unwrap_or_else(|_| clip.clone());
                writeln!(list, "{}", manifest_line(&absolute))?;
            }
            list.flush()?;

            let mut cmd = FfmpegCommand::new();
            cmd.args(["-v", "error"]);
            cmd.args(["-f", "concat", "-safe", "0"]);
            cmd.input(list.path().to_string_lossy().as_ref());
            cmd.args(["-c", "copy"]);
            cmd.output(output.to_string_lossy().as_ref());

            run_ffmpeg(spawner, cmd, "concatenation")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockFfmpegSpawner;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_line_escapes_quotes() {
        assert_eq!(
            manifest_line(Path::new("/tmp/it's/clip-0000.mp4")),
            r"file '/tmp/it'\''s/clip-0000.mp4'"
        );
    }

    #[test]
    fn test_extracted_manifest_follows_interval_order() {
        let dir = tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        let intervals = [
            Interval::new(10.0, 20.0),
            Interval::new(40.0, 55.5),
            Interval::new(80.0, 90.0),
        ];

        let clips = extract_clips(&spawner, Path::new("in.mp4"), dir.path(), &intervals, "clip", "mp4")
            .unwrap();

        let names: Vec<String> = clips
            .iter()
            .map(|c| c.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["clip-0000.mp4", "clip-0001.mp4", "clip-0002.mp4"]);

        let calls = spawner.get_received_calls();
        let second = calls
            .iter()
            .find(|call| call.last().is_some_and(|a| a.ends_with("clip-0001.mp4")))
            .unwrap();
        let t = second.iter().position(|a| a == "-t").unwrap();
        assert_eq!(second[t + 1], "15.5");
        assert!(second.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }

    #[test]
    fn test_failed_cut_fails_the_stage() {
        let dir = tempdir().unwrap();
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("clip-0000", vec![], 1);

        let result = extract_clips(
            &spawner,
            Path::new("in.mp4"),
            dir.path(),
            &[Interval::new(0.0, 5.0)],
            "clip",
            "mp4",
        );
        assert!(matches!(result, Err(CoreError::CommandFailed(..))));
    }

    #[test]
    fn test_single_clip_is_moved() {
        let root = tempdir().unwrap();
        let ws = Workspace::create(root.path().join("~in"), false).unwrap();
        let clip = ws.file("clip-0000.mp4");
        fs::write(&clip, b"data").unwrap();
        let output = root.path().join("out.mp4");

        concat_clips(&MockFfmpegSpawner::new(), &ws, &[clip.clone()], &output).unwrap();

        assert!(!clip.exists());
        assert_eq!(fs::read(&output).unwrap(), b"data");
    }

    #[test]
    fn test_several_clips_use_concat_demuxer() {
        let root = tempdir().unwrap();
        let ws = Workspace::create(root.path().join("~in"), false).unwrap();
        let clips = vec![ws.file("clip-0000.mp4"), ws.file("clip-0001.mp4")];
        for clip in &clips {
            fs::write(clip, b"").unwrap();
        }
        let output = root.path().join("out.mp4");
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("concat", vec![], true);

        concat_clips(&spawner, &ws, &clips, &output).unwrap();

        assert!(output.is_file());
        let call = &spawner.get_received_calls()[0];
        assert!(call.windows(2).any(|w| w[0] == "-safe" && w[1] == "0"));
        assert_eq!(call.last().unwrap(), &output.to_string_lossy());
    }
}
