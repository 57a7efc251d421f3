use rust_embed::RustEmbed;

/// Stylesheet and icon bundle compiled into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
pub struct Assets;

/// Raw bytes of an embedded asset, addressed relative to `assets/`.
pub fn get(path: &str) -> Option<Vec<u8>> {
    Assets::get(path).map(|file| file.data.into_owned())
}

/// Raw SVG markup for the icon named `<name>.svg`, if bundled.
pub fn svg_icon(name: &str) -> Option<String> {
    let file = Assets::get(&format!("icons/{name}.svg"))?;
    String::from_utf8(file.data.into_owned()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_is_bundled() {
        assert!(get("styles.css").is_some());
    }

    #[test]
    fn every_file_kind_has_an_icon() {
        for name in [
            "folder",
            "audio",
            "video",
            "zip",
            "image",
            "subtitles",
            "other-media",
        ] {
            let icon = svg_icon(name).unwrap_or_else(|| panic!("missing icon: {name}"));
            assert!(icon.contains("<svg"));
        }
    }

    #[test]
    fn unknown_asset_is_none() {
        assert!(get("nope.css").is_none());
        assert!(svg_icon("nope").is_none());
    }
}
