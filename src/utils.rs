use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::ResultModel;
use crate::render::{render_result, ResultView, SourceCell, NO_SOURCE};

pub fn is_supported_video_format(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::VIDEO)
        .unwrap_or(false)
}

/// Validates a local file for upload. The service has no upload endpoint, so
/// a valid file still ends in an error.
pub fn check_upload(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File does not exist: {}", path.display());
    }
    if !is_supported_video_format(path) {
        anyhow::bail!("Not a video file: {}", path.display());
    }
    anyhow::bail!(
        "Uploading local videos is not supported by the service yet: {}",
        path.display()
    )
}

pub fn save_markdown_export(
    result: &ResultModel,
    reference: &str,
    service_url: &str,
    output_path: &Path,
) -> Result<PathBuf> {
    let rows = match render_result(result, service_url) {
        ResultView::Table(rows) => rows,
        ResultView::ErrorPanel(message) => {
            anyhow::bail!("Nothing to export, the job failed: {}", message)
        }
    };

    // Total duration is the end of the last segment
    let duration = result
        .segments()
        .and_then(|segments| segments.last())
        .map(|seg| seg.end_time)
        .unwrap_or(0.0);
    let minutes = (duration / 60.0).floor();
    let seconds = (duration % 60.0).round();

    let mut markdown = String::new();
    markdown.push_str("# YTAChunker segments\n\n");
    markdown.push_str(&format!("- **Source Video:** {}\n", reference));
    markdown.push_str(&format!("- **Segments:** {}\n", rows.len()));
    markdown.push_str(&format!("- **Duration:** {}:{:02}\n", minutes, seconds));
    markdown.push_str(&format!(
        "- **Exported:** {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    markdown.push_str("\n---\n");

    for row in &rows {
        markdown.push_str(&format!(
            "\n## {} ({}s - {}s)\n\n",
            row.name, row.start, row.end
        ));
        markdown.push_str(&row.text);
        markdown.push_str("\n\n");
        markdown.push_str(&format!("**Summary:** {}\n\n", row.summary));
        match &row.source {
            SourceCell::Link(url) => markdown.push_str(&format!("**Source:** <{}>\n\n", url)),
            SourceCell::Missing => markdown.push_str(&format!("**Source:** {}\n\n", NO_SOURCE)),
        }
        markdown.push_str(&format!(
            "**Audio:** [{}]({})\n",
            row.download.file_name, row.download.url
        ));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create export directory")?;
        }
    }
    std::fs::write(output_path, markdown).context("Failed to write export file")?;

    Ok(output_path.to_path_buf())
}
