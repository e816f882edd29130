//! Plain HTML rendering for the dashboard pages.

use std::fmt::Write;
use std::path::Path;

use url::form_urlencoded;

use crate::index::{EntryKind, IndexStats, TreeNode, BYTES_PER_KIB};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Link to `route` with the path as its `file` query parameter.
#[must_use]
pub fn file_link(route: &str, path: &Path) -> String {
    let encoded: String =
        form_urlencoded::byte_serialize(path.to_string_lossy().as_bytes()).collect();
    format!("{route}?file={encoded}")
}

/// Render the tree page.
#[must_use]
pub fn render_dashboard(
    root: &Path,
    tree: &[TreeNode],
    stats: IndexStats,
    ready: bool,
    with_assets: bool,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>Logs</h1>\n<p class=\"summary\">{} &middot; {} files in {} directories &middot; {:.2} KB</p>\n",
        escape_html(&root.display().to_string()),
        stats.files,
        stats.directories,
        total_kib(stats),
    );

    if !ready {
        body.push_str("<p class=\"notice\">Initial scan in progress.</p>\n");
    } else if tree.is_empty() {
        body.push_str("<p class=\"notice\">No log files found.</p>\n");
    } else {
        render_nodes(&mut body, tree);
    }

    page("Logs Dashboard", &body, with_assets)
}

/// Render a single file's contents.
#[must_use]
pub fn render_file_view(path: &Path, contents: &str, with_assets: bool) -> String {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let mut body = String::new();
    let _ = write!(
        body,
        "<nav><a href=\"/logs\">&larr; All logs</a> | <a href=\"{}\">Download</a></nav>\n\
         <h1>{}</h1>\n<pre class=\"log-content\">{}</pre>\n",
        escape_html(&file_link("/logs/download", path)),
        escape_html(&name),
        escape_html(contents),
    );

    page(&name, &body, with_assets)
}

fn render_nodes(out: &mut String, nodes: &[TreeNode]) {
    out.push_str("<ul class=\"log-tree\">\n");
    for node in nodes {
        match node.kind {
            EntryKind::Directory => {
                let _ = write!(
                    out,
                    "<li class=\"log-dir\"><details open><summary>{}</summary>\n",
                    escape_html(&node.name)
                );
                if let Some(children) = node.children.as_deref().filter(|c| !c.is_empty()) {
                    render_nodes(out, children);
                }
                out.push_str("</details></li>\n");
            }
            EntryKind::File => {
                let _ = writeln!(
                    out,
                    "<li class=\"log-entry\"><a href=\"{view}\">{name}</a> \
                     <span class=\"size\">{size:.2} KB</span> \
                     <span class=\"modified\">{modified}</span> \
                     <a class=\"download\" href=\"{download}\">download</a></li>",
                    view = escape_html(&file_link("/logs/view", &node.path)),
                    name = escape_html(&node.name),
                    size = node.size_kib,
                    modified = node.modified.format(TIMESTAMP_FORMAT),
                    download = escape_html(&file_link("/logs/download", &node.path)),
                );
            }
        }
    }
    out.push_str("</ul>\n");
}

fn page(title: &str, body: &str, with_assets: bool) -> String {
    let assets = if with_assets {
        "<link rel=\"stylesheet\" href=\"/assets/css/style.css\">\n\
         <script src=\"/assets/js/app.js\" defer></script>\n"
    } else {
        ""
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n{assets}</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title),
    )
}

#[allow(clippy::cast_precision_loss)]
fn total_kib(stats: IndexStats) -> f64 {
    stats.total_bytes as f64 / BYTES_PER_KIB
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn file(path: &str, size_kib: f64) -> TreeNode {
        let path = PathBuf::from(path);
        TreeNode {
            name: path.file_name().unwrap().to_string_lossy().into_owned(),
            path,
            size_kib,
            modified: Utc::now(),
            kind: EntryKind::File,
            children: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_file_link_encodes_path() {
        let link = file_link("/logs/view", Path::new("/logs/my app/a&b.log"));
        assert_eq!(link, "/logs/view?file=%2Flogs%2Fmy+app%2Fa%26b.log");
    }

    #[test]
    fn test_render_dashboard_nested() {
        let tree = vec![
            file("/logs/app.log", 1.5),
            TreeNode {
                name: "archive".to_string(),
                path: PathBuf::from("/logs/archive"),
                size_kib: 0.0,
                modified: Utc::now(),
                kind: EntryKind::Directory,
                children: Some(vec![file("/logs/archive/old.log", 0.25)]),
            },
        ];
        let stats = IndexStats {
            files: 2,
            directories: 1,
            total_bytes: 1792,
        };

        let html = render_dashboard(Path::new("/logs"), &tree, stats, true, false);

        assert!(html.contains("app.log"));
        assert!(html.contains("<summary>archive</summary>"));
        assert!(html.contains("old.log"));
        assert!(html.contains("1.50 KB"));
        assert!(html.contains("/logs/download?file=%2Flogs%2Farchive%2Fold.log"));
        assert!(html.contains("2 files in 1 directories"));
        assert!(!html.contains("/assets/"));
    }

    #[test]
    fn test_render_dashboard_not_ready() {
        let html = render_dashboard(
            Path::new("/logs"),
            &[],
            IndexStats::default(),
            false,
            true,
        );
        assert!(html.contains("Initial scan in progress"));
        assert!(html.contains("/assets/js/app.js"));
    }

    #[test]
    fn test_render_dashboard_escapes_names() {
        let tree = vec![file("/logs/<b>.log", 0.0)];
        let html = render_dashboard(
            Path::new("/logs"),
            &tree,
            IndexStats::default(),
            true,
            false,
        );
        assert!(html.contains("&lt;b&gt;.log"));
        assert!(!html.contains("<b>.log"));
    }

    #[test]
    fn test_render_file_view_escapes_contents() {
        let html = render_file_view(
            Path::new("/logs/app.log"),
            "GET /<script>evil()</script>\n",
            false,
        );

        assert!(html.contains("<title>app.log</title>"));
        assert!(html.contains("&lt;script&gt;evil()&lt;/script&gt;"));
        assert!(!html.contains("<script>evil"));
        assert!(html.contains("/logs/download?file=%2Flogs%2Fapp.log"));
    }
}
