//! Plain-text rendering of gallery frames.
//!
//! Every function returns a `String`; callers decide where it goes. Column
//! fitting measures display width, so names in non-Latin scripts line up.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use volunteer_directory::{GalleryView, LoadOutcome, Notice, ViewMode, VolunteerRecord};

/// Inner width of one grid card.
const CARD_WIDTH: usize = 30;

/// Gap between grid cards.
const CARD_GAP: usize = 2;

/// Fallback terminal width when `COLUMNS` is unset.
const DEFAULT_TERMINAL_WIDTH: usize = 100;

const ADDRESS_MAX_WIDTH: usize = 32;
const NAME_MAX_WIDTH: usize = 24;

/// Terminal width from `COLUMNS`, or a fixed default.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|w| *w >= CARD_WIDTH + 2)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

/// Truncate to `width` display columns (with `…`) and pad with spaces.
pub fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    if text.width() <= width {
        out.push_str(text);
    } else if width > 0 {
        let mut used = 0;
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w + 1 > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('…');
    }
    let pad = width.saturating_sub(out.width());
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

fn card_lines(record: &VolunteerRecord) -> Vec<String> {
    let border = "─".repeat(CARD_WIDTH + 2);
    let row = |text: &str| format!("│ {} │", fit(text, CARD_WIDTH));
    vec![
        format!("┌{border}┐"),
        row(&record.name),
        row(&format!("AAK: {}", record.membership_code)),
        row(&format!("Mobile: {}", record.mobile_number)),
        row(&record.address),
        row(&format!("ID: {}", record.id)),
        format!("└{border}┘"),
    ]
}

/// Cards laid out left to right, as many per row as fit in `width`.
pub fn render_grid(records: &[VolunteerRecord], width: usize) -> String {
    let per_row = (width / (CARD_WIDTH + 4 + CARD_GAP)).max(1);
    let gap = " ".repeat(CARD_GAP);
    let mut out = String::new();
    for chunk in records.chunks(per_row) {
        let cards: Vec<Vec<String>> = chunk.iter().map(card_lines).collect();
        let height = cards.first().map_or(0, Vec::len);
        for line in 0..height {
            let row: Vec<&str> = cards.iter().map(|c| c[line].as_str()).collect();
            out.push_str(row.join(&gap).trim_end());
            out.push('\n');
        }
    }
    out
}

/// One row per record with fitted columns.
pub fn render_list(records: &[VolunteerRecord]) -> String {
    let header = ["#", "Name", "AAK No", "Mobile", "Address", "ID"];
    let rows: Vec<[String; 6]> = records
        .iter()
        .map(|r| {
            [
                r.sequence_number.to_string(),
                r.name.clone(),
                r.membership_code.clone(),
                r.mobile_number.clone(),
                r.address.clone(),
                r.id.clone(),
            ]
        })
        .collect();

    let caps = [
        usize::MAX,
        NAME_MAX_WIDTH,
        usize::MAX,
        usize::MAX,
        ADDRESS_MAX_WIDTH,
        usize::MAX,
    ];
    let mut widths: [usize; 6] = header.map(UnicodeWidthStr::width);
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width().min(caps[i]));
        }
    }

    let line = |cells: [&str; 6]| {
        let fitted: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| fit(cell, w))
            .collect();
        format!("{}\n", fitted.join("  ").trim_end())
    };

    let mut out = line(header);
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in &rows {
        let cells: [&str; 6] = std::array::from_fn(|i| row[i].as_str());
        out.push_str(&line(cells));
    }
    out
}

/// ID card for a single volunteer.
pub fn render_detail(record: &VolunteerRecord) -> String {
    const WIDTH: usize = 44;
    let border = "═".repeat(WIDTH + 2);
    let row = |label: &str, value: &str| {
        format!("║ {} ║\n", fit(&format!("{label:<10}{value}"), WIDTH))
    };

    let mut out = format!("╔{border}╗\n");
    out.push_str(&format!("║ {} ║\n", fit("VOLUNTEER ID CARD", WIDTH)));
    out.push_str(&format!("╟{}╢\n", "─".repeat(WIDTH + 2)));
    out.push_str(&row("Name", &record.name));
    out.push_str(&row("AAK No", &record.membership_code));
    out.push_str(&row("Member #", &record.sequence_number.to_string()));
    out.push_str(&row("Mobile", &record.mobile_number));
    out.push_str(&row("Address", &record.address));
    if let Some(joined) = record.join_date.or(record.created_at) {
        out.push_str(&row("Joined", &joined.format("%d %b %Y").to_string()));
    }
    out.push_str(&row("ID", &record.id));
    if record.is_local_only() {
        out.push_str(&row("Status", "saved locally, not yet on server"));
    }
    out.push_str(&format!("╚{border}╝\n"));
    out.push_str(&format!("Photo: {}\n", photo_label(&record.image_url)));
    out
}

fn photo_label(image_url: &str) -> String {
    if image_url.starts_with("data:") {
        let mime = image_url
            .trim_start_matches("data:")
            .split(';')
            .next()
            .unwrap_or_default();
        format!("embedded {mime}")
    } else {
        image_url.to_string()
    }
}

pub fn render_delete_prompt(record: &VolunteerRecord) -> String {
    format!(
        "Delete volunteer {} ({}, {})? This cannot be undone. [y/N] ",
        record.name, record.membership_code, record.id
    )
}

pub fn render_empty(filtered: bool) -> String {
    let mut out = String::from("No volunteers found\n");
    if filtered {
        out.push_str("Try adjusting your search or filter (`clear` resets both)\n");
    } else {
        out.push_str("Add the first volunteer with `add`\n");
    }
    out
}

/// Summary line followed by the grid or list body.
pub fn render_view(view: &GalleryView, width: usize) -> String {
    let mut out = format!("{}\n", view.summary);
    if view.query.is_active() {
        out.push_str(&format!(
            "{}\n",
            volunteer_directory::projector::match_count_label(view.records.len())
        ));
    }
    out.push('\n');
    if view.is_empty() {
        out.push_str(&render_empty(view.query.is_active()));
        return out;
    }
    match view.view_mode {
        ViewMode::Grid => out.push_str(&render_grid(&view.records, width)),
        ViewMode::List => out.push_str(&render_list(&view.records)),
    }
    out
}

pub fn render_source(outcome: &LoadOutcome) -> String {
    format!(
        "Loaded {} volunteers from {}",
        outcome.count(),
        outcome.source_label()
    )
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(message) => format!("✓ {message}"),
        Notice::Error(message) => format!("✗ {message}"),
    }
}
