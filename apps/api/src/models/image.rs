use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::validation::{optional_non_blank, Required};

/// Gallery slot an image belongs to. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageCategory {
    Home,
    About,
    General,
    CareerGlobe,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 4] = [
        ImageCategory::Home,
        ImageCategory::About,
        ImageCategory::General,
        ImageCategory::CareerGlobe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Home => "home",
            ImageCategory::About => "about",
            ImageCategory::General => "general",
            ImageCategory::CareerGlobe => "career-globe",
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ImageCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<_> = ImageCategory::ALL.iter().map(|c| c.as_str()).collect();
                AppError::Validation(format!(
                    "Invalid category '{s}': expected one of {}",
                    allowed.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Uuid,
    pub category: ImageCategory,
    /// Public URL, or a `/uploads/...` path for locally stored files.
    pub src: String,
    pub alt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageInput {
    pub category: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub category: ImageCategory,
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImagePatch {
    pub category: Option<ImageCategory>,
    pub src: Option<String>,
    pub alt: Option<String>,
}

impl ImageInput {
    pub fn into_new(self) -> Result<NewImage, AppError> {
        let mut req = Required::new();
        let category = req.take("category", self.category);
        let src = req.take("src", self.src);
        req.finish()?;
        Ok(NewImage {
            category: category.parse()?,
            src,
            alt: self.alt.unwrap_or_default(),
        })
    }

    pub fn into_patch(self) -> Result<ImagePatch, AppError> {
        let category = optional_non_blank("category", self.category)?
            .map(|c| c.parse())
            .transpose()?;
        Ok(ImagePatch {
            category,
            src: optional_non_blank("src", self.src)?,
            alt: self.alt,
        })
    }
}

impl ImagePatch {
    pub fn apply(self, image: &mut Image) {
        if let Some(category) = self.category {
            image.category = category;
        }
        if let Some(src) = self.src {
            image.src = src;
        }
        if let Some(alt) = self.alt {
            image.alt = alt;
        }
    }
}
