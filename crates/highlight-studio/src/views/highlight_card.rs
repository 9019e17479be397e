//! One highlight in the highlight list.

use shared::display::format_duration;
use shared::Highlight;

pub fn render(highlight: &Highlight, index: usize, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let thumbnail = highlight
        .thumbnail_path
        .as_deref()
        .map(|path| format!(" [thumb: {}]", path))
        .unwrap_or_default();

    let mut text = format!(
        "{} {:>2}. {} ({})  {} - {}{}\n",
        marker,
        index + 1,
        highlight.title,
        format_duration(Some(highlight.duration())),
        format_duration(Some(highlight.start_time)),
        format_duration(Some(highlight.end_time)),
        thumbnail,
    );

    if let Some(description) = highlight.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("       {}\n", description));
    }

    text
}
