use anyhow::Result;
use log::debug;

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    select::WantEntry,
};

use super::converter::Converter;

/// Most lines the converter and the marketplace accept in one paste.
pub const CHUNK_SIZE: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WantListFormat {
    Simple,
    Marketplace,
    Decklist,
    Converted,
}

impl WantListFormat {
    pub const ALL: [WantListFormat; 4] = [
        WantListFormat::Simple,
        WantListFormat::Marketplace,
        WantListFormat::Decklist,
        WantListFormat::Converted,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            WantListFormat::Simple => "simple",
            WantListFormat::Marketplace => "marketplace",
            WantListFormat::Decklist => "decklist",
            WantListFormat::Converted => "converted",
        }
    }
}

/// Turns a decklist into marketplace lines.
pub trait Convert {
    fn convert(&self, decklist: &str) -> Result<String>;
}

impl Convert for Converter {
    fn convert(&self, decklist: &str) -> Result<String> {
        Converter::convert(self, decklist)
    }
}

/// Splits `items` into ordered runs of at most [`CHUNK_SIZE`].
pub fn chunk<T>(items: &[T]) -> Vec<&[T]> {
    items.chunks(CHUNK_SIZE).collect()
}

pub fn decklist_line(entry: &WantEntry) -> String {
    format!(
        "1 {} {} {}",
        entry.name,
        entry.set_code,
        entry.number.export_form()
    )
}

pub fn marketplace_line(entry: &WantEntry) -> String {
    format!("{} [{}]", entry.name, entry.set_code)
}

fn manual_line(entry: &WantEntry) -> String {
    format!("{} [ABILITY] [{}]", entry.name, entry.set_code)
}

fn header(title: &str, entries: &[WantEntry]) -> String {
    format!("# Card want list ({title})\n# {} cards\n\n", entries.len())
}

pub fn render_simple(entries: &[WantEntry]) -> String {
    let mut out = header("simple", entries);

    let mut current = None;
    for entry in entries {
        if current != Some(&entry.set_code) {
            if current.is_some() {
                out.push('\n');
            }
            let title = entry.set_name.as_deref().unwrap_or(entry.set_code.as_str());
            out.push_str(&format!("## {} ({})\n", title, entry.set_code));
            current = Some(&entry.set_code);
        }
        out.push_str(&format!("{} {}\n", entry.number, entry.name));
    }

    out
}

pub fn render_marketplace(entries: &[WantEntry]) -> String {
    let mut sorted: Vec<&WantEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| (&a.name, &a.set_code).cmp(&(&b.name, &b.set_code)));

    let mut out = header("marketplace", entries);
    for entry in sorted {
        out.push_str(&marketplace_line(entry));
        out.push('\n');
    }
    out.push_str("\n# Cards with several printings may need their ability added by hand:\n");
    out.push_str("# Exeggcute [Precocious Evolution] [SSP]\n");
    out
}

pub fn render_decklist(entries: &[WantEntry]) -> String {
    let chunks = chunk(entries);
    let mut out = header("decklist", entries);

    for (idx, part) in chunks.iter().enumerate() {
        out.push_str(&format!(
            "# Part {}/{} ({} cards)\n",
            idx + 1,
            chunks.len(),
            part.len()
        ));
        for entry in part.iter() {
            out.push_str(&decklist_line(entry));
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Converts each chunk separately. A chunk that fails to convert is written
/// as its decklist plus a manual `Name [ABILITY] [SET]` list.
pub fn render_converted(
    entries: &[WantEntry],
    converter: Option<&dyn Convert>,
    diagnostics: &mut Diagnostics,
) -> String {
    let chunks = chunk(entries);
    let mut out = header("converted", entries);
    if converter.is_none() {
        out.push_str("# Conversion disabled, manual format only\n\n");
    }

    for (idx, part) in chunks.iter().enumerate() {
        let label = format!("Part {}/{}", idx + 1, chunks.len());
        let decklist = part
            .iter()
            .map(decklist_line)
            .collect::<Vec<_>>()
            .join("\n");

        let converted = match converter {
            Some(converter) => match converter.convert(&decklist) {
                Ok(text) => Some(text),
                Err(e) => {
                    diagnostics.report(Diagnostic::ExternalConversionFailure {
                        reason: format!("{}: {:#}", label.to_lowercase(), e),
                    });
                    None
                }
            },
            None => None,
        };

        match converted {
            Some(text) => {
                debug!("converted {}", label);
                out.push_str(&format!("# {label}: converted\n{text}\n\n"));
            }
            None => {
                out.push_str(&format!(
                    "# {label}: decklist (paste into the converter)\n{decklist}\n\n"
                ));
                out.push_str(&format!("# {label}: manual format (fill in abilities)\n"));
                for entry in part.iter() {
                    out.push_str(&manual_line(entry));
                    out.push('\n');
                }
                out.push('\n');
            }
        }
    }

    out
}
