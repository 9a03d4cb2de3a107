use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::models::Paste;

const STYLE: &str = "
body {
    background: #0f0f0f;
    color: #eee;
    font-family: monospace;
    padding: 30px;
}
pre {
    background: #1e1e1e;
    padding: 20px;
    border-radius: 8px;
    white-space: pre-wrap;
}
";

/// Render a paste as a standalone HTML page.
///
/// The content is escaped, so markup in a paste shows up as text.
pub fn paste_page(paste: &Paste) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Paste " (paste.id) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h3 { "Paste ID: " (paste.id) }
                pre { (paste.content) }
            }
        }
    }
}
