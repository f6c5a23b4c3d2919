use crate::client::segment_url;
use crate::models::{ResultModel, Segment};

pub const NO_SUMMARY: &str = "No summary available.";
pub const NO_SOURCE: &str = "No source found.";

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCell {
    Link(String),
    Missing,
}

/// Download address of a row. Chunks are numbered by row position, not by
/// the file name the service reported.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRef {
    pub index: usize,
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub name: String,
    pub start: String,
    pub end: String,
    pub text: String,
    pub summary: String,
    pub source: SourceCell,
    pub download: DownloadRef,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Table(Vec<SegmentRow>),
    ErrorPanel(String),
}

pub fn format_seconds(seconds: f64) -> String {
    format!("{:.2}", seconds)
}

pub fn segment_row(segment: &Segment, index: usize, service_url: &str) -> SegmentRow {
    let number = index + 1;
    SegmentRow {
        name: segment.display_name().to_string(),
        start: format_seconds(segment.start_time),
        end: format_seconds(segment.end_time),
        text: segment.text.clone(),
        summary: segment
            .summary
            .clone()
            .unwrap_or_else(|| NO_SUMMARY.to_string()),
        source: match &segment.source {
            Some(url) => SourceCell::Link(url.clone()),
            None => SourceCell::Missing,
        },
        download: DownloadRef {
            index: number,
            file_name: format!("chunk_{}.wav", number),
            url: segment_url(service_url, number),
        },
    }
}

/// One row per segment in service order, or the error panel.
pub fn render_result(result: &ResultModel, service_url: &str) -> ResultView {
    match result {
        ResultModel::Segments(segments) => ResultView::Table(
            segments
                .iter()
                .enumerate()
                .map(|(index, segment)| segment_row(segment, index, service_url))
                .collect(),
        ),
        ResultModel::Error(message) => ResultView::ErrorPanel(message.clone()),
    }
}
