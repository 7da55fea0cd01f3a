//! Intrinsic size of an SVG document.
//!
//! Reads `width`/`height` on the root `<svg>` element when they are plain
//! numbers or pixel values, otherwise the `viewBox` extent. Relative units
//! (`%`, `em`) have no intrinsic pixel size and yield `None`.

/// Extract `(width, height)` from SVG source text.
pub fn svg_dimensions(source: &str) -> Option<(u32, u32)> {
    let tag = root_tag(source)?;

    let width = attribute(tag, "width").and_then(parse_length);
    let height = attribute(tag, "height").and_then(parse_length);
    if let (Some(w), Some(h)) = (width, height) {
        return Some((w, h));
    }

    let view_box = attribute(tag, "viewBox")?;
    let values: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [_, _, w, h] => Some((to_pixels(*w)?, to_pixels(*h)?)),
        _ => None,
    }
}

/// The attribute text of the first `<svg ...>` tag.
fn root_tag(source: &str) -> Option<&str> {
    let start = source.find("<svg")?;
    let rest = &source[start + 4..];
    // `<svgfoo` is not an svg element
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/') {
        return None;
    }
    let end = rest.find('>')?;
    Some(&rest[..end])
}

/// Value of `name="..."` or `name='...'` inside a tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut search = tag;
    while let Some(idx) = search.find(name) {
        let before_ok = search[..idx]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        let after = search[idx + name.len()..].trim_start();
        if before_ok {
            if let Some(after_eq) = after.strip_prefix('=') {
                let after_eq = after_eq.trim_start();
                let quote = after_eq.chars().next()?;
                if quote == '"' || quote == '\'' {
                    let value = &after_eq[1..];
                    let close = value.find(quote)?;
                    return Some(&value[..close]);
                }
            }
        }
        search = &search[idx + name.len()..];
    }
    None
}

fn parse_length(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    to_pixels(number.parse().ok()?)
}

fn to_pixels(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 1.0 && value <= u32::MAX as f64).then(|| value.round() as u32)
}
