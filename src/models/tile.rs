use chrono::{Datelike, NaiveDate};
use memory_media::MediaFile;

pub const TITLE_MAX: usize = 30;
pub const DESCRIPTION_MAX: usize = 250;

/// The four parts a tile needs before it counts as complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TilePart {
    Image,
    Title,
    Period,
    Description,
}

impl TilePart {
    pub fn label(&self) -> &'static str {
        match self {
            TilePart::Image => "image",
            TilePart::Title => "title",
            TilePart::Period => "month/year",
            TilePart::Description => "description",
        }
    }
}

/// Month + year value as produced by `<input type="month">` (`YYYY-MM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn parse(s: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").ok()?;
        Some(Self {
            year: date.year(),
            month: date.month(),
        })
    }

    /// e.g. "March 2024"
    pub fn display_name(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One of the fixed memory slots
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTile {
    /// 1-based, never reordered
    pub slot: u8,
    pub image: Option<MediaFile>,
    pub title: String,
    /// Raw month input value
    pub period: String,
    pub description: String,
}

impl MemoryTile {
    pub fn new(slot: u8) -> Self {
        Self {
            slot,
            image: None,
            title: String::new(),
            period: String::new(),
            description: String::new(),
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|f| !f.is_empty())
    }

    pub fn missing_parts(&self) -> Vec<TilePart> {
        let mut missing = Vec::new();
        if !self.has_image() {
            missing.push(TilePart::Image);
        }
        if self.title.trim().is_empty() {
            missing.push(TilePart::Title);
        }
        if self.period.trim().is_empty() {
            missing.push(TilePart::Period);
        }
        if self.description.trim().is_empty() {
            missing.push(TilePart::Description);
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_parts().is_empty()
    }

    /// Context string attached to the tile's image upload
    pub fn upload_context(&self) -> String {
        format!(
            "memory_number={}|title={}|date={}|description={}",
            self.slot,
            self.title.trim(),
            self.period.trim(),
            self.description.trim()
        )
    }
}
