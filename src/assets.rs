// Fruit image lookup against the local assets directory

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shown when no image file matches
pub const PLACEHOLDER: &str = "🍎";

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Korean fruit name → asset file stem
const KOREAN_KEYS: &[(&str, &str)] = &[
    ("사과", "apple"),
    ("살구", "apricot"),
    ("아보카도", "avocado"),
    ("바나나", "banana"),
    ("블루베리", "blueberry"),
    ("체리모야", "cherimoya"),
    ("체리", "cherry"),
    ("용과", "dragonfruit"),
    ("두리안", "durian"),
    ("무화과", "fig"),
    ("포도", "grape"),
    ("자몽", "grapefruit"),
    ("청포도", "greengrape"),
    ("구아바", "guava"),
    ("키위", "kiwi"),
    ("참외", "koreamelon"),
    ("자두", "plum"),
    ("한국 자두", "koreanplum"),
    ("레몬", "lemon"),
    ("리치", "lychee"),
    ("망고", "mango"),
    ("망고스틴", "mangosteen"),
    ("멜론", "melon"),
    ("오렌지", "orange"),
    ("파파야", "papaya"),
    ("복숭아", "peach"),
    ("배", "pear"),
    ("감", "persimmon"),
    ("파인애플", "pineapple"),
    ("석류", "pomegranate"),
    ("람부탄", "rambutan"),
    ("적포도", "redgrape"),
    ("스타프루트", "starfruit"),
    ("딸기", "strawberry"),
    ("귤", "tangerine"),
    ("감귤", "tangerine"),
    ("수박", "watermelon"),
    ("백포도", "white"),
    ("황금키위", "yellow"),
    ("유자", "yuzu"),
    ("매실", "plum"),
    ("크랜베리", "cranberry"),
    ("건포도", "raisin"),
    ("토마토", "tomato"),
];

/// English spellings (lower-case) → asset file stem
const ENGLISH_KEYS: &[(&str, &str)] = &[
    ("apple", "apple"),
    ("apricot", "apricot"),
    ("avocado", "avocado"),
    ("banana", "banana"),
    ("blueberry", "blueberry"),
    ("cherimoya", "cherimoya"),
    ("cherry", "cherry"),
    ("dragonfruit", "dragonfruit"),
    ("dragon fruit", "dragonfruit"),
    ("durian", "durian"),
    ("fig", "fig"),
    ("grape", "grape"),
    ("grapefruit", "grapefruit"),
    ("green grape", "greengrape"),
    ("guava", "guava"),
    ("kiwi", "kiwi"),
    ("korean melon", "koreamelon"),
    ("plum", "plum"),
    ("korean plum", "koreanplum"),
    ("lemon", "lemon"),
    ("lychee", "lychee"),
    ("mango", "mango"),
    ("mangosteen", "mangosteen"),
    ("melon", "melon"),
    ("orange", "orange"),
    ("papaya", "papaya"),
    ("peach", "peach"),
    ("pear", "pear"),
    ("persimmon", "persimmon"),
    ("pineapple", "pineapple"),
    ("pomegranate", "pomegranate"),
    ("rambutan", "rambutan"),
    ("red grape", "redgrape"),
    ("star fruit", "starfruit"),
    ("starfruit", "starfruit"),
    ("strawberry", "strawberry"),
    ("tangerine", "tangerine"),
    ("watermelon", "watermelon"),
    ("yuzu", "yuzu"),
];

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Asset file stem for a Korean fruit name, if one is registered
pub fn asset_key(name: &str) -> Option<&'static str> {
    lookup(KOREAN_KEYS, name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ImageAsset {
    File(PathBuf),
    Placeholder(&'static str),
}

impl ImageAsset {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, ImageAsset::Placeholder(_))
    }

    /// File name inside the assets directory, if any
    pub fn file_name(&self) -> Option<String> {
        match self {
            ImageAsset::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            ImageAsset::Placeholder(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageResolver {
    dir: PathBuf,
}

impl ImageResolver {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        ImageResolver {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve an image for a fruit. Tried in order:
    /// 1. registered Korean name, English name, variety base or the name itself
    /// 2. each word of a multi-word name against the English table
    /// 3. any image whose stem contains the name or is contained in it
    /// 4. the placeholder
    pub fn resolve(&self, name: &str, kind: Option<&str>) -> ImageAsset {
        let lowered = name.to_lowercase();

        let stem = if let Some(key) = asset_key(name) {
            key.to_string()
        } else if let Some(key) = lookup(ENGLISH_KEYS, &lowered) {
            key.to_string()
        } else if let Some(kind) = kind.filter(|k| !k.is_empty()) {
            let base = kind.split('_').next().unwrap_or(kind);
            lookup(ENGLISH_KEYS, base)
                .map(str::to_string)
                .unwrap_or_else(|| base.to_string())
        } else {
            lowered.clone()
        };

        if let Some(path) = self.find_with_extension(&stem) {
            return ImageAsset::File(path);
        }

        if lowered.contains(' ') {
            for part in lowered.split_whitespace() {
                if let Some(path) = lookup(ENGLISH_KEYS, part).and_then(|k| self.find_with_extension(k)) {
                    return ImageAsset::File(path);
                }
            }
        }

        if let Some(path) = self.scan_directory(&lowered) {
            return ImageAsset::File(path);
        }

        debug!(name, "no image found, using placeholder");
        ImageAsset::Placeholder(PLACEHOLDER)
    }

    fn find_with_extension(&self, stem: &str) -> Option<PathBuf> {
        if stem.is_empty() {
            return None;
        }
        IMAGE_EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
    }

    /// Substring match in either direction between the name and a file stem.
    /// Files are visited in name order so the result does not depend on the
    /// directory listing order.
    fn scan_directory(&self, lowered: &str) -> Option<PathBuf> {
        if lowered.is_empty() {
            return None;
        }

        let entries = fs::read_dir(&self.dir).ok()?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        files.into_iter().find(|path| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().to_lowercase())
                .map(|stem| stem.contains(lowered) || lowered.contains(stem.as_str()))
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset_dir(tag: &str, files: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fruit_dashboard_assets_{}", tag));
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"img").unwrap();
        }
        dir
    }

    #[test]
    fn test_korean_name_maps_to_file() {
        let dir = asset_dir("korean", &["apple.png", "pear.jpg"]);
        let resolver = ImageResolver::new(&dir);

        assert_eq!(resolver.resolve("사과", None), ImageAsset::File(dir.join("apple.png")));
        assert_eq!(
            resolver.resolve("배", Some("신고")).file_name().as_deref(),
            Some("pear.jpg")
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_extension_order_prefers_jpg() {
        let dir = asset_dir("ext", &["mango.png", "mango.jpg"]);
        let resolver = ImageResolver::new(&dir);

        assert_eq!(resolver.resolve("망고", None).file_name().as_deref(), Some("mango.jpg"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_english_name_and_kind_fallbacks() {
        let dir = asset_dir("english", &["kiwi.gif", "hallabong.png"]);
        let resolver = ImageResolver::new(&dir);

        assert_eq!(resolver.resolve("Kiwi", None).file_name().as_deref(), Some("kiwi.gif"));
        assert_eq!(
            resolver.resolve("한라봉", Some("hallabong_jeju")).file_name().as_deref(),
            Some("hallabong.png")
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_multi_word_and_directory_scan() {
        let dir = asset_dir("words", &["watermelon.png", "goldenberry_fresh.jpeg", "notes.txt"]);
        let resolver = ImageResolver::new(&dir);

        assert_eq!(
            resolver.resolve("seedless watermelon", None).file_name().as_deref(),
            Some("watermelon.png")
        );
        assert_eq!(
            resolver.resolve("Goldenberry", None).file_name().as_deref(),
            Some("goldenberry_fresh.jpeg")
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_placeholder_when_nothing_matches() {
        let dir = asset_dir("empty", &["apple.png"]);
        let resolver = ImageResolver::new(&dir);

        let asset = resolver.resolve("두리안", None);
        assert!(asset.is_placeholder());
        assert_eq!(asset, ImageAsset::Placeholder(PLACEHOLDER));

        let missing = ImageResolver::new("/nonexistent/fruit-dashboard/images");
        assert!(missing.resolve("사과", None).is_placeholder());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_asset_key_table() {
        assert_eq!(asset_key("감귤"), Some("tangerine"));
        assert_eq!(asset_key("한국 자두"), Some("koreanplum"));
        assert_eq!(asset_key("키위새"), None);
    }
}
