/*!
 * Title extraction from FCPXML project documents.
 *
 * Titles live inside `asset-clip` elements on a sequence spine. Each title's
 * position on the master timeline is derived from its clip's placement and
 * trim point, then the whole set is re-based so that the earliest title
 * starts at `00:00:00:00`.
 *
 * Element names are matched without a namespace, so a namespaced
 * `<x:title>` or a `title` under a default `xmlns` is not a title.
 */

use std::fmt;

use log::{debug, trace};
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::errors::ExtractError;
use crate::timecode::{self, DEFAULT_TITLE_DURATION, ZERO_TIME};

/// A single on-screen title with its rendered timecodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    /// Start timecode (HH:MM:SS:FF)
    pub start_timecode: String,

    /// End timecode (HH:MM:SS:FF)
    pub end_timecode: String,

    /// Concatenated title text
    pub text: String,
}

impl TitleRecord {
    pub fn new(start_timecode: String, end_timecode: String, text: String) -> Self {
        TitleRecord {
            start_timecode,
            end_timecode,
            text,
        }
    }
}

impl fmt::Display for TitleRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}: {}", self.start_timecode, self.end_timecode, self.text)
    }
}

/// Result of one extraction pass, with the counters the caller reports
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Records in timeline order
    pub records: Vec<TitleRecord>,

    /// Number of title elements found on the timeline
    pub titles_found: usize,

    /// Number of titles dropped because they carried no text
    pub titles_dropped: usize,

    /// Raw timeline position (seconds) that was re-based to zero
    pub base_position_seconds: Option<f64>,
}

// @struct: Title located on the timeline, before re-basing
struct PlacedTitle<'a, 'input> {
    raw_position: f64,
    node: Node<'a, 'input>,
}

/// Extract every title in `xml_text` as an ordered list of records.
///
/// Only a document that is not well-formed XML is an error. Missing or
/// malformed time attributes fall back to defaults, titles without text are
/// skipped and a project without titles yields an empty list.
pub fn extract(xml_text: &str) -> Result<Vec<TitleRecord>, ExtractError> {
    extract_with_stats(xml_text).map(|extraction| extraction.records)
}

/// Same as [`extract`], also returning how many titles were found and dropped.
pub fn extract_with_stats(xml_text: &str) -> Result<Extraction, ExtractError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml_text, options)
        .map_err(|e| ExtractError::Parse(format!("failed to parse project XML: {}", e)))?;

    debug!("Parsing project, root element: {}", doc.root_element().tag_name().name());

    let mut placed = collect_titles(&doc);
    // Vec::sort_by is stable, so titles at the same position keep document order
    placed.sort_by(|a, b| a.raw_position.total_cmp(&b.raw_position));

    debug!("Found {} title element(s) on the timeline", placed.len());

    let mut extraction = Extraction {
        titles_found: placed.len(),
        ..Extraction::default()
    };

    // The base comes from every located title, including those dropped below
    let Some(base_position) = placed.first().map(|t| t.raw_position) else {
        return Ok(extraction);
    };
    extraction.base_position_seconds = Some(base_position);
    debug!("First title timeline position: {:.2}s", base_position);

    for (i, title) in placed.iter().enumerate() {
        let adjusted_position = title.raw_position - base_position;

        match build_record(title.node, adjusted_position) {
            Some(record) => {
                debug!(
                    "Title {}: {} ({} - {}) [adjusted: {:.2}s]",
                    i + 1,
                    record.text.chars().take(30).collect::<String>(),
                    record.start_timecode,
                    record.end_timecode,
                    adjusted_position
                );
                extraction.records.push(record);
            }
            None => {
                debug!("Title {} has no text, skipping", i + 1);
                extraction.titles_dropped += 1;
            }
        }
    }

    debug!("Extracted {} title(s)", extraction.records.len());

    Ok(extraction)
}

// Walk project -> sequence -> spine -> asset-clip -> title, recording raw positions
fn collect_titles<'a, 'input>(doc: &'a Document<'input>) -> Vec<PlacedTitle<'a, 'input>> {
    let mut placed = Vec::new();

    for project in descendants_named(doc.root(), "project") {
        for sequence in descendants_named(project, "sequence") {
            for spine in descendants_named(sequence, "spine") {
                for clip in spine.children().filter(|n| has_tag(n, "asset-clip")) {
                    let clip_offset = time_attribute(clip, "offset", ZERO_TIME);
                    let clip_start = time_attribute(clip, "start", ZERO_TIME);
                    trace!("asset-clip at offset {:.3}s, start {:.3}s", clip_offset, clip_start);

                    for title in descendants_named(clip, "title") {
                        let title_offset = time_attribute(title, "offset", ZERO_TIME);
                        placed.push(PlacedTitle {
                            raw_position: clip_offset + (title_offset - clip_start),
                            node: title,
                        });
                    }
                }
            }
        }
    }

    placed
}

fn build_record(title: Node, adjusted_position: f64) -> Option<TitleRecord> {
    let text = title_text(title);
    if text.is_empty() {
        return None;
    }

    // A negative duration would end the title before it starts
    let duration = time_attribute(title, "duration", DEFAULT_TITLE_DURATION).max(0.0);
    let end_position = adjusted_position + duration;

    Some(TitleRecord::new(
        timecode::render_timecode(adjusted_position),
        timecode::render_timecode(end_position),
        text,
    ))
}

/// Concatenate the trimmed `text-style` runs of every `text` block in a title.
fn title_text(title: Node) -> String {
    let mut content = String::new();

    for text in descendants_named(title, "text") {
        for style in descendants_named(text, "text-style") {
            if let Some(run) = style.text().map(str::trim).filter(|s| !s.is_empty()) {
                content.push_str(run);
            }
        }
    }

    content.trim().to_string()
}

fn time_attribute(node: Node, name: &str, default: &str) -> f64 {
    timecode::parse_time(node.attribute(name).unwrap_or(default))
}

// Only un-namespaced elements match; FCPXML declares no namespace
fn has_tag(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().namespace().is_none() && node.tag_name().name() == name
}

// Includes `node` itself when it matches, like a tree-wide iter() search
fn descendants_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants().filter(move |n| has_tag(n, name))
}
