//! Static assets compiled into the binary.

/// CSS reset inlined into HTML renderings.
pub const RESET_CSS: &str = include_str!("../assets/reset.css");

/// Layout rules applied on top of [`RESET_CSS`].
pub const DOCUMENT_CSS: &str = "\
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 0 auto; padding: 2rem 1rem; }
h1 { font-size: 1.6rem; margin-bottom: 1rem; }
h2 { font-size: 1.15rem; margin: 1.5rem 0 0.5rem; }
ul { padding-left: 1.25rem; list-style: disc; }
code { font-family: ui-monospace, monospace; }
.meta { color: #555; }
.empty { color: #888; font-style: italic; }
";
