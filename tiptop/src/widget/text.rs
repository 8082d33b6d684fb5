/// Replaces the end of `line` with `label`, keeping the cell count.
pub fn overlay_tail(line: &str, label: &str) -> String {
    let keep = line
        .chars()
        .count()
        .saturating_sub(label.chars().count());
    line.chars().take(keep).chain(label.chars()).collect()
}

/// Four-cell human readable size: switches unit at 1000 but divides by 1024.
pub fn sizeof_fmt(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in ["B", "k", "M", "G", "T", "P", "E", "Z"] {
        if num < 1000.0 {
            return format!("{:3}{}", num.round() as u64, unit);
        }
        num /= 1024.0;
    }
    format!("{:3}Y", num.round() as u64)
}

/// Left-aligns `text` in exactly `width` cells, cutting it if needed.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{:<width$}", clipped, width = width)
}
