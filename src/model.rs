//! Input data model: year entries and the photos hung under each one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{MecateError, MecateResult, RenderWarning};
use crate::text::FontStack;

/// Most photos a single year may hang on its strand.
pub const MAX_PHOTOS_PER_YEAR: usize = 3;

/// One uploaded photo: raw PNG/JPEG bytes plus a display name for warnings.
#[derive(Clone, Debug)]
pub struct PhotoSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PhotoSource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// The photos attached to one year label, in upload order.
///
/// Holds at most [`MAX_PHOTOS_PER_YEAR`] photos; [`CollageSpec::insert_year`]
/// enforces the cap.
#[derive(Clone, Debug, Default)]
pub struct YearEntry {
    photos: Vec<PhotoSource>,
}

impl YearEntry {
    pub fn photos(&self) -> &[PhotoSource] {
        &self.photos
    }
}

/// Everything one render needs: year entries keyed by label, plus the seed
/// that pins tilt and light jitter.
///
/// Entries iterate in lexicographic label order, and that order IS the
/// timeline: page assignment follows it directly. Note this sorts label text,
/// not numbers, so "10" comes before "2" — surprising for numeric years but
/// the established behavior of the document.
#[derive(Clone, Debug, Default)]
pub struct CollageSpec {
    entries: BTreeMap<String, YearEntry>,
    pub seed: u64,
}

impl CollageSpec {
    pub fn new(seed: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            seed,
        }
    }

    /// Attach photos to a year label.
    ///
    /// A label with no photos is dropped (it never occupies a strand). More
    /// than [`MAX_PHOTOS_PER_YEAR`] photos are truncated to the first three
    /// and reported. Re-inserting a label replaces its photos.
    pub fn insert_year(
        &mut self,
        label: impl Into<String>,
        mut photos: Vec<PhotoSource>,
    ) -> Option<RenderWarning> {
        let label = label.into();
        if photos.is_empty() {
            return None;
        }

        let supplied = photos.len();
        let warning = if supplied > MAX_PHOTOS_PER_YEAR {
            photos.truncate(MAX_PHOTOS_PER_YEAR);
            Some(RenderWarning::PhotosTruncated {
                label: label.clone(),
                supplied,
                kept: MAX_PHOTOS_PER_YEAR,
            })
        } else {
            None
        };

        self.entries.insert(label, YearEntry { photos });
        warning
    }

    /// Entries in lexicographic label order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &YearEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn year_count(&self) -> usize {
        self.entries.len()
    }

    pub fn validate(&self) -> MecateResult<()> {
        if self.entries.is_empty() {
            return Err(MecateError::validation(
                "no year has any photos; nothing to render",
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated year text into trimmed labels, dropping empties.
pub fn parse_year_labels(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// JSON input document for the CLI.
///
/// `years` carries the comma-separated label text exactly as typed; `photos`
/// maps each label to photo files, resolved relative to the manifest's own
/// directory. Labels in `years` without a `photos` entry simply contribute no
/// strand.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    pub years: String,
    #[serde(default)]
    pub photos: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    pub seed: u64,
    /// Preferred caption fonts, tried before the built-in candidates.
    #[serde(default)]
    pub fonts: Vec<PathBuf>,
}

impl Manifest {
    /// Load photo bytes and build the render input.
    pub fn into_spec(&self, assets_root: &Path) -> MecateResult<(CollageSpec, Vec<RenderWarning>)> {
        let labels = parse_year_labels(&self.years);
        if labels.is_empty() {
            return Err(MecateError::validation("manifest lists no year labels"));
        }

        let mut spec = CollageSpec::new(self.seed);
        let mut warnings = Vec::new();
        for label in &labels {
            let Some(paths) = self.photos.get(label) else {
                continue;
            };
            let mut photos = Vec::with_capacity(paths.len());
            for rel in paths {
                let path = assets_root.join(rel);
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("read photo '{}'", path.display()))?;
                photos.push(PhotoSource::new(rel.display().to_string(), bytes));
            }
            if let Some(w) = spec.insert_year(label.clone(), photos) {
                warnings.push(w);
            }
        }
        Ok((spec, warnings))
    }

    /// Caption font chain: manifest-preferred files first, then the built-in
    /// system candidates.
    pub fn font_stack(&self, assets_root: &Path) -> FontStack {
        FontStack::with_defaults().prefer(self.fonts.iter().map(|p| assets_root.join(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> PhotoSource {
        PhotoSource::new(name, vec![0u8; 4])
    }

    #[test]
    fn labels_split_trim_and_drop_empties() {
        assert_eq!(
            parse_year_labels(" 2017, 2018 ,2019,, "),
            vec!["2017", "2018", "2019"]
        );
        assert!(parse_year_labels("  ,  ,").is_empty());
    }

    #[test]
    fn entries_iterate_in_lexicographic_label_order() {
        let mut spec = CollageSpec::new(0);
        for label in ["2", "10", "1"] {
            assert!(spec.insert_year(label, vec![photo("p")]).is_none());
        }
        let order: Vec<&str> = spec.entries().map(|(label, _)| label).collect();
        assert_eq!(order, vec!["1", "10", "2"]);
    }

    #[test]
    fn excess_photos_are_truncated_with_warning() {
        let mut spec = CollageSpec::new(0);
        let w = spec
            .insert_year("2020", (0..5).map(|i| photo(&format!("p{i}"))).collect())
            .expect("expected truncation warning");
        match w {
            RenderWarning::PhotosTruncated {
                label,
                supplied,
                kept,
            } => {
                assert_eq!(label, "2020");
                assert_eq!(supplied, 5);
                assert_eq!(kept, MAX_PHOTOS_PER_YEAR);
            }
            other => panic!("unexpected warning: {other}"),
        }
        let (_, entry) = spec.entries().next().unwrap();
        assert_eq!(entry.photos().len(), MAX_PHOTOS_PER_YEAR);
        assert_eq!(entry.photos()[0].name, "p0");
    }

    #[test]
    fn year_without_photos_never_becomes_an_entry() {
        let mut spec = CollageSpec::new(0);
        assert!(spec.insert_year("2020", Vec::new()).is_none());
        assert_eq!(spec.year_count(), 0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn manifest_defaults_and_parse() {
        let m: Manifest =
            serde_json::from_str(r#"{ "years": "2019, 2020", "photos": { "2019": ["a.png"] } }"#)
                .unwrap();
        assert_eq!(m.seed, 0);
        assert!(m.fonts.is_empty());
        assert_eq!(m.photos["2019"], vec![PathBuf::from("a.png")]);
    }

    #[test]
    fn manifest_with_no_labels_is_rejected() {
        let m: Manifest = serde_json::from_str(r#"{ "years": " , " }"#).unwrap();
        let err = m.into_spec(Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("validation error:"));
    }

    #[test]
    fn manifest_reads_photos_relative_to_root() {
        let dir = std::env::temp_dir().join("mecate_manifest_test");
        std::fs::create_dir_all(&dir).unwrap();
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(dir.join("a.png"), &png).unwrap();

        let m: Manifest = serde_json::from_str(
            r#"{ "years": "2019", "photos": { "2019": ["a.png"] }, "seed": 7 }"#,
        )
        .unwrap();
        let (spec, warnings) = m.into_spec(&dir).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(spec.seed, 7);
        assert_eq!(spec.year_count(), 1);
        let (_, entry) = spec.entries().next().unwrap();
        assert_eq!(entry.photos()[0].bytes, png);
    }
}
