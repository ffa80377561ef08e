use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tether_core::prelude::*;

/// One line of queue progress, e.g. `queued | position 3 of 5 | ~40s left`.
pub fn progress_line(status: JobStatus, queue: &QueueInfo) -> String {
    let status = match status {
        JobStatus::Queued => "queued",
        JobStatus::Processing => "processing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
    };

    let mut parts = vec![status.to_string()];
    match (queue.position, queue.queue_length) {
        (Some(position), Some(length)) => parts.push(format!("position {position} of {length}")),
        (Some(position), None) => parts.push(format!("position {position}")),
        _ => {}
    }
    if let Some(wait) = queue.estimated_wait_seconds {
        parts.push(format!("~{wait}s left"));
    }
    if queue.is_empty() {
        parts.push("working...".to_string());
    }

    let now = chrono::Local::now().format("%H:%M:%S");
    format!("[{now}] {}", parts.join(" | "))
}

/// Where a binary result goes when no `--output` was given.
pub fn default_path(job_id: &str, content_type: &str) -> PathBuf {
    let extension = mime_guess::get_mime_extensions_str(content_type)
        .and_then(|extensions| extensions.first())
        .copied()
        .unwrap_or("bin");
    PathBuf::from(format!("{}.{extension}", file_stem(job_id)))
}

/// Keeps a job id from escaping the working directory when used as a file name.
fn file_stem(job_id: &str) -> String {
    let stem: String = job_id
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if stem.is_empty() { "result".into() } else { stem }
}

/// Prints JSON results and writes binary ones to disk.
pub async fn save(job_id: &str, output: &JobOutput, path: Option<&Path>) -> Result<()> {
    match output {
        JobOutput::Json(value) => {
            let pretty = serde_json::to_string_pretty(value)?;
            match path {
                Some(path) => {
                    tokio::fs::write(path, pretty)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Result written to {}", path.display());
                }
                None => println!("{pretty}"),
            }
        }
        JobOutput::Binary { content_type, data } => {
            let path = path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_path(job_id, content_type));
            tokio::fs::write(&path, data)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} bytes of {content_type} written to {}",
                data.len(),
                path.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_with_full_queue_metadata() {
        let line = progress_line(
            JobStatus::Queued,
            &QueueInfo {
                position: Some(3),
                queue_length: Some(5),
                estimated_wait_seconds: Some(40),
            },
        );
        assert!(line.ends_with("queued | position 3 of 5 | ~40s left"));
    }

    #[test]
    fn progress_without_metadata_is_generic() {
        let line = progress_line(JobStatus::Processing, &QueueInfo::default());
        assert!(line.ends_with("processing | working..."));
    }

    #[test]
    fn binary_results_get_an_extension() {
        let audio = default_path("s1", "audio/wav");
        assert_eq!(audio.file_stem().and_then(|s| s.to_str()), Some("s1"));
        assert_ne!(audio.extension().and_then(|s| s.to_str()), Some("bin"));
        assert_eq!(
            default_path("s1", "application/x-unknown-thing"),
            PathBuf::from("s1.bin")
        );
    }

    #[test]
    fn job_ids_cannot_leave_the_working_directory() {
        assert_eq!(
            default_path("../../etc/passwd", "application/octet-stream").parent(),
            Some(Path::new(""))
        );
        assert_eq!(
            default_path("a/../b", "application/x-unknown-thing"),
            PathBuf::from("a____b.bin")
        );
        assert_eq!(
            default_path("", "application/x-unknown-thing"),
            PathBuf::from("result.bin")
        );
    }
}
