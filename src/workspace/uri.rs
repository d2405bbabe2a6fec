//! Conversions between `file://` URIs and local paths.

use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Local path named by a `file://` URI or a bare path.
///
/// Returns `None` for other schemes, remote hosts and undecodable input.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let Some(rest) = uri.strip_prefix(FILE_SCHEME) else {
        if uri.contains("://") {
            return None;
        }
        return Some(PathBuf::from(uri));
    };

    // file://localhost/x and file:///x name the same file.
    let rest = match rest.find('/') {
        Some(0) => rest,
        Some(i) if rest[..i].eq_ignore_ascii_case("localhost") => &rest[i..],
        _ => return None,
    };

    let decoded = urlencoding::decode(rest).ok()?;
    Some(PathBuf::from(strip_drive_slash(&decoded)))
}

/// `/c:/work` -> `c:/work`
fn strip_drive_slash(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':'
    {
        &path[1..]
    } else {
        path
    }
}

/// `file://` URI for an absolute path, percent-encoding each segment.
pub fn path_to_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let encoded: Vec<String> = raw
        .split('/')
        .map(|segment| {
            if segment.len() == 2 && segment.ends_with(':') {
                segment.to_string()
            } else {
                urlencoding::encode(segment).into_owned()
            }
        })
        .collect();
    let joined = encoded.join("/");
    if joined.starts_with('/') {
        format!("{}{}", FILE_SCHEME, joined)
    } else {
        format!("{}/{}", FILE_SCHEME, joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_file_uri() {
        assert_eq!(
            uri_to_path("file:///home/dev/my%20app/server.xml"),
            Some(PathBuf::from("/home/dev/my app/server.xml"))
        );
    }

    #[test]
    fn accepts_localhost_authority() {
        assert_eq!(
            uri_to_path("file://localhost/srv/app"),
            Some(PathBuf::from("/srv/app"))
        );
    }

    #[test]
    fn rejects_remote_hosts_and_other_schemes() {
        assert_eq!(uri_to_path("file://fileserver/share/app"), None);
        assert_eq!(uri_to_path("untitled://Untitled-1"), None);
        assert_eq!(uri_to_path("https://example.com/server.xml"), None);
    }

    #[test]
    fn bare_paths_pass_through() {
        assert_eq!(uri_to_path("/ws/app"), Some(PathBuf::from("/ws/app")));
    }

    #[test]
    fn strips_slash_before_drive_letter() {
        assert_eq!(
            uri_to_path("file:///c%3A/work/app"),
            Some(PathBuf::from("c:/work/app"))
        );
    }

    #[test]
    fn encodes_spaces_but_not_separators() {
        assert_eq!(
            path_to_uri(Path::new("/home/dev/my app/pom.xml")),
            "file:///home/dev/my%20app/pom.xml"
        );
    }

    #[test]
    fn path_to_uri_round_trips_through_uri_to_path() {
        let path = Path::new("/tmp/ws #1/app");
        assert_eq!(uri_to_path(&path_to_uri(path)).as_deref(), Some(path));
    }
}
