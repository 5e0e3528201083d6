//! Path extension filtering

use regex::Regex;

/// Built-in exclude list covering common static-asset extensions.
pub const DEFAULT_EXCLUDE: &str = "js,css,png,jpg,jpeg,gif,svg,webp,ico,bmp,tif,tiff,woff,woff2,ttf,eot,mp4,mp3,wav,avi,mov,mkv,zip,rar,7z,pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep only paths matching the extension list
    Include,
    /// Drop paths matching the extension list
    Exclude,
}

/// Case-insensitive "path ends with one of these extensions" matcher,
/// compiled once at startup.
#[derive(Debug)]
pub struct ExtFilter {
    re: Regex,
    mode: FilterMode,
}

impl ExtFilter {
    /// Compile from comma-separated lists. A non-empty include list takes
    /// precedence over the exclude list. Parts are trimmed and leading dots
    /// stripped; an effectively empty list yields no filter at all.
    pub fn compile(
        include_csv: &str,
        exclude_csv: &str,
    ) -> Result<Option<Self>, regex::Error> {
        let (csv, mode) = if include_csv.trim().is_empty() {
            (exclude_csv, FilterMode::Exclude)
        } else {
            (include_csv, FilterMode::Include)
        };

        let parts: Vec<String> = csv
            .split(',')
            .map(|p| p.trim().trim_start_matches('.'))
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }

        let re = Regex::new(&format!(r"(?i)\.({})$", parts.join("|")))?;
        Ok(Some(Self { re, mode }))
    }

    /// Whether a record with this path survives the filter.
    pub fn keeps(&self, path: &str) -> bool {
        match self.mode {
            FilterMode::Include => self.re.is_match(path),
            FilterMode::Exclude => !self.re.is_match(path),
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_drops_matches_any_case() {
        let f = ExtFilter::compile("", "js,png").unwrap().unwrap();
        assert_eq!(f.mode(), FilterMode::Exclude);
        assert!(!f.keeps("/static/app.JS"));
        assert!(!f.keeps("/img/logo.png"));
        assert!(f.keeps("/api/users"));
        assert!(f.keeps("/download.jsp")); // suffix only, not substring
    }

    #[test]
    fn include_keeps_only_matches() {
        let f = ExtFilter::compile("json", "js,png").unwrap().unwrap();
        assert_eq!(f.mode(), FilterMode::Include);
        assert!(f.keeps("/api/data.json"));
        assert!(f.keeps("/API/DATA.JSON"));
        assert!(!f.keeps("/api/data.xml"));
        assert!(!f.keeps("/static/app.js"));
    }

    #[test]
    fn include_overrides_exclude() {
        let f = ExtFilter::compile("pdf", DEFAULT_EXCLUDE).unwrap().unwrap();
        assert_eq!(f.mode(), FilterMode::Include);
        assert!(f.keeps("/doc/report.pdf"));
    }

    #[test]
    fn empty_lists_disable_filtering() {
        assert!(ExtFilter::compile("", "").unwrap().is_none());
        assert!(ExtFilter::compile("  ", " , ,, ").unwrap().is_none());
    }

    #[test]
    fn leading_dots_and_spaces_are_tolerated() {
        let f = ExtFilter::compile("", ".js, .css ").unwrap().unwrap();
        assert!(!f.keeps("/a.js"));
        assert!(!f.keeps("/b.css"));
        assert!(f.keeps("/c.html"));
    }

    #[test]
    fn special_characters_are_escaped() {
        // "7z" is harmless, but a part like "c++" must not break the regex
        let f = ExtFilter::compile("", "c++").unwrap().unwrap();
        assert!(!f.keeps("/src/main.c++"));
        assert!(f.keeps("/src/main.cc"));
    }

    #[test]
    fn default_exclude_list_compiles() {
        let f = ExtFilter::compile("", DEFAULT_EXCLUDE).unwrap().unwrap();
        assert!(!f.keeps("/site/bundle.woff2"));
        assert!(f.keeps("/login"));
    }
}
