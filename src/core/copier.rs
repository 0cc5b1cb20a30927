//! The copy pass: mirrors directories and copies, touches or plans files.

use super::scanner::DirectoryScanner;
use super::{CopyEvent, CopyJob, CopySummary, CoreResult, OverwritePolicy, ProgressState};
use filetime::{set_file_times, FileTime};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// What happened to a single qualifying file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Copied,
    Placeholder,
    Planned,
    SkippedExisting,
}

/// Runs one mirror job to completion, reporting through `emit`.
///
/// Directories are visited in pre-order. A failing file is logged and the
/// pass moves on. The last event is always [`CopyEvent::Finished`]. Setting
/// `cancel` stops the pass before the next directory or file.
pub fn run_copy<F>(job: &CopyJob, cancel: &AtomicBool, mut emit: F) -> CoreResult<CopySummary>
where
    F: FnMut(CopyEvent),
{
    job.validate()?;

    let scan = DirectoryScanner::scan(&job.source)?;
    let mut progress = ProgressState::new(scan.count_matching(&job.filter));
    let mut summary = CopySummary {
        total: progress.total,
        ..Default::default()
    };

    tracing::info!(
        "Starting copy of {:?} -> {:?} ({} matching files, dry_run={})",
        job.source,
        job.destination,
        progress.total,
        job.dry_run
    );

    for (path, err) in &scan.unreadable {
        emit(CopyEvent::Log(format!(
            "Error reading {}: {}",
            path.display(),
            err
        )));
    }

    'dirs: for listing in &scan.listings {
        if cancel.load(Ordering::Relaxed) {
            summary.cancelled = true;
            break;
        }

        let relative = scan.relative(&listing.path)?;
        let dest_dir = mirrored_dir(&job.destination, relative);

        if job.dry_run {
            emit(CopyEvent::Log(format!(
                "Would create directory: {}",
                dest_dir.display()
            )));
            summary.directories += 1;
        } else {
            match fs::create_dir_all(&dest_dir) {
                Ok(()) => {
                    emit(CopyEvent::Log(format!(
                        "Created directory: {}",
                        dest_dir.display()
                    )));
                    summary.directories += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to create directory {:?}: {}", dest_dir, e);
                    emit(CopyEvent::Log(format!(
                        "Error creating directory {}: {}",
                        dest_dir.display(),
                        e
                    )));
                }
            }
        }

        for name in listing.files.iter().filter(|n| job.filter.matches_name(n)) {
            if cancel.load(Ordering::Relaxed) {
                summary.cancelled = true;
                break 'dirs;
            }

            let src_file = listing.path.join(name);
            let dest_file = dest_dir.join(output_name(name, job.keep_extensions));

            let line = match process_file(job, &src_file, &dest_file) {
                Ok(FileOutcome::Copied) => {
                    summary.files_copied += 1;
                    format!("Copied: {} -> {}", src_file.display(), dest_file.display())
                }
                Ok(FileOutcome::Placeholder) => {
                    summary.placeholders_created += 1;
                    format!("Created empty file: {}", dest_file.display())
                }
                Ok(FileOutcome::Planned) => {
                    summary.planned += 1;
                    format!("Would create: {}", dest_file.display())
                }
                Ok(FileOutcome::SkippedExisting) => {
                    summary.skipped += 1;
                    format!("Skipped existing: {}", dest_file.display())
                }
                Err(e) => {
                    tracing::warn!("Failed to process {:?}: {}", src_file, e);
                    summary.failed += 1;
                    format!("Error copying {}: {}", src_file.display(), e)
                }
            };
            emit(CopyEvent::Log(line));

            progress.advance();
            emit(CopyEvent::Progress(progress));
        }
    }

    if summary.cancelled {
        tracing::info!("Copy cancelled after {} files", progress.processed);
        emit(CopyEvent::Log("Copy cancelled.".to_string()));
    } else if progress.total == 0 {
        emit(CopyEvent::Progress(progress));
    }

    tracing::info!(
        "Copy finished: {} copied, {} placeholders, {} planned, {} skipped, {} failed",
        summary.files_copied,
        summary.placeholders_created,
        summary.planned,
        summary.skipped,
        summary.failed
    );
    emit(CopyEvent::Finished(summary.clone()));
    Ok(summary)
}

/// Joins `relative` onto the destination root; the source root maps to the root itself.
pub fn mirrored_dir(destination: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        destination.to_path_buf()
    } else {
        destination.join(relative)
    }
}

/// Output file name, with the last extension removed unless it is kept.
///
/// Names without an extension and dot-files such as `.bashrc` are unchanged.
pub fn output_name(name: &str, keep_extensions: bool) -> String {
    if keep_extensions {
        return name.to_string();
    }
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

fn process_file(job: &CopyJob, src: &Path, dest: &Path) -> io::Result<FileOutcome> {
    if dest.exists() {
        if is_same_file(src, dest)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} and {} are the same file", src.display(), dest.display()),
            ));
        }
        match job.overwrite {
            OverwritePolicy::Overwrite => {}
            OverwritePolicy::Skip => return Ok(FileOutcome::SkippedExisting),
            OverwritePolicy::Error => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("destination {} already exists", dest.display()),
                ));
            }
        }
    }

    if job.dry_run {
        return Ok(FileOutcome::Planned);
    }

    if job.copy_contents {
        copy_with_metadata(src, dest)?;
        Ok(FileOutcome::Copied)
    } else {
        fs::File::create(dest)?;
        Ok(FileOutcome::Placeholder)
    }
}

/// `true` when both paths resolve to one file, e.g. through a symlinked destination.
fn is_same_file(src: &Path, dest: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(src)? == fs::canonicalize(dest)?)
}

/// Copies bytes and permissions, then carries over access and modification times.
fn copy_with_metadata(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;
    let stat_src = fs::metadata(src)?;
    set_file_times(
        dest,
        FileTime::from_last_access_time(&stat_src),
        FileTime::from_last_modification_time(&stat_src),
    )
}
