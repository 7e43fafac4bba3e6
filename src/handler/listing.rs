//! Generated directory index pages

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::path::Path;

/// Characters left unescaped in listing links
const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Read a directory's entries, sorted case-insensitively by name
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await?;
        // follow symlinks so a link to a directory still gets a trailing slash
        let is_dir = if file_type.is_symlink() {
            tokio::fs::metadata(entry.path())
                .await
                .is_ok_and(|m| m.is_dir())
        } else {
            file_type.is_dir()
        };
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink: file_type.is_symlink(),
        });
    }
    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Render the HTML listing for `url_path` (as received, still percent-encoded)
pub fn render(url_path: &str, entries: &[ListingEntry]) -> String {
    let display_path = escape_html(&percent_decode_str(url_path).decode_utf8_lossy());
    let title = format!("Directory listing for {display_path}");

    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for entry in entries {
        let mut link = entry.name.clone();
        let mut label = entry.name.clone();
        if entry.is_dir {
            link.push('/');
            label.push('/');
        }
        if entry.is_symlink {
            label.push('@');
        }
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(&link, HREF),
            escape_html(&label)
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
            is_symlink: false,
        }
    }

    #[test]
    fn test_render_links_and_escaping() {
        let html = render(
            "/assets%20v2/",
            &[entry("maps", true), entry("a b&c.png", false)],
        );
        assert!(html.contains("<title>Directory listing for /assets v2/</title>"));
        assert!(html.contains("<a href=\"maps/\">maps/</a>"));
        assert!(html.contains("<a href=\"a%20b%26c.png\">a b&amp;c.png</a>"));
    }

    #[test]
    fn test_symlink_marker() {
        let mut link = entry("current", true);
        link.is_symlink = true;
        let html = render("/", &[link]);
        assert!(html.contains("<a href=\"current/\">current/@</a>"));
    }

    #[tokio::test]
    async fn test_read_entries_sorted() {
        let dir = std::env::temp_dir().join(format!("devserve-listing-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("Zeta")).unwrap();
        std::fs::write(dir.join("alpha.txt"), b"a").unwrap();
        std::fs::write(dir.join("Beta.txt"), b"b").unwrap();

        let entries = read_entries(&dir).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "Beta.txt", "Zeta"]);
        assert!(entries[2].is_dir);

        let _ = std::fs::remove_dir_all(dir);
    }
}
