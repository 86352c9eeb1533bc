// Small formatting helpers shared by the render functions

/// Formats a byte count with a binary unit ("1.5 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Shortens `name` to `width` characters, ending in an ellipsis when cut
pub fn truncate_name(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width {
        return name.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut short: String = name.chars().take(width - 1).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short.png", 12), "short.png");
        assert_eq!(truncate_name("holiday-photo.jpeg", 8), "holiday…");
        assert_eq!(truncate_name("äöü.png", 3), "äö…");
        assert_eq!(truncate_name("x", 1), "x");
        assert_eq!(truncate_name("xy", 0), "");
    }
}
