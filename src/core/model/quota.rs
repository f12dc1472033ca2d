use super::file::{File, FileCategory};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Storage ceiling for every user, 2 GiB.
pub const TOTAL_STORAGE_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Usage of a single [FileCategory].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUsage {
    /// Cumulative size in bytes.
    pub size: u64,

    /// Most recent modification among the files in the category.
    pub latest_date: Option<DateTime<Utc>>,
}

impl CategoryUsage {
    fn add(&mut self, size: u64, modified: DateTime<Utc>) {
        self.size += size;
        self.latest_date = match self.latest_date {
            Some(latest) if latest >= modified => Some(latest),
            _ => Some(modified),
        };
    }
}

/// Derived snapshot of a user's storage usage. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSummary {
    pub document: CategoryUsage,
    pub image: CategoryUsage,
    pub video: CategoryUsage,
    pub audio: CategoryUsage,
    pub other: CategoryUsage,

    /// Total bytes used over all categories.
    pub used: u64,

    /// The storage ceiling.
    pub all: u64,
}

impl Default for QuotaSummary {
    fn default() -> Self {
        Self {
            document: CategoryUsage::default(),
            image: CategoryUsage::default(),
            video: CategoryUsage::default(),
            audio: CategoryUsage::default(),
            other: CategoryUsage::default(),
            used: 0,
            all: TOTAL_STORAGE_BYTES,
        }
    }
}

impl QuotaSummary {
    /// Fold the owner's files into per category usage.
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a File>) -> Self {
        files.into_iter().fold(Self::default(), |mut summary, file| {
            // Negative sizes cannot come out of an upload
            let size = u64::try_from(file.size).unwrap_or_default();
            summary.category_mut(file.category).add(size, file.updated_at);
            summary.used += size;
            summary
        })
    }

    pub fn category(&self, category: FileCategory) -> &CategoryUsage {
        match category {
            FileCategory::Document => &self.document,
            FileCategory::Image => &self.image,
            FileCategory::Video => &self.video,
            FileCategory::Audio => &self.audio,
            FileCategory::Other => &self.other,
        }
    }

    fn category_mut(&mut self, category: FileCategory) -> &mut CategoryUsage {
        match category {
            FileCategory::Document => &mut self.document,
            FileCategory::Image => &mut self.image,
            FileCategory::Video => &mut self.video,
            FileCategory::Audio => &mut self.audio,
            FileCategory::Other => &mut self.other,
        }
    }

    /// Percentage of the ceiling in use, rounded to two decimals.
    pub fn percentage(&self) -> f64 {
        let raw = self.used as f64 / self.all as f64 * 100.0;
        (raw * 100.0).round() / 100.0
    }

    pub fn remaining(&self) -> u64 {
        self.all.saturating_sub(self.used)
    }
}
