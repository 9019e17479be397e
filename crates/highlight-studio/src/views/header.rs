//! Navigation header.

use crate::routes::Route;

const NAV: [(&str, &str); 2] = [("Dashboard", "/"), ("Upload Video", "/upload")];

/// Render the header with the link for `current` marked active
pub fn render(current: &Route) -> String {
    let current = current.path();
    let links: Vec<String> = NAV
        .iter()
        .map(|(label, path)| {
            if *path == current {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        })
        .collect();

    format!("== Video Highlight AI ==  {}\n", links.join(" | "))
}
