//! Sample content for a fresh database. Each set is only filled when empty,
//! so running the seeder twice is a no-op.

use tracing::info;

use crate::models::{ImageCategory, NewImage, NewJob};
use crate::store::{Store, StoreResult};

const SAMPLE_JOBS: &[(&str, &str, &str)] = &[
    (
        "Senior Editor",
        "Remote / New York",
        "We are looking for an experienced editor to lead our content team. You will be responsible for overseeing the quality and consistency of all our publications.",
    ),
    (
        "Digital Publishing Specialist",
        "London, UK",
        "Join our technical team to help transform traditional manuscripts into digital formats. Experience with XML and ePub is required.",
    ),
    (
        "Graphic Designer",
        "Remote",
        "Create stunning visuals for our e-books and marketing materials. Proficiency in Adobe Creative Suite is a must.",
    ),
];

const HOME_IMAGES: &[(&str, &str)] = &[
    ("https://images.unsplash.com/photo-1497366216548-37526070297c?auto=format&fit=crop&w=800&q=80", "Office Workspace"),
    ("https://images.unsplash.com/photo-1522071820081-009f0129c71c?auto=format&fit=crop&w=800&q=80", "Team Collaboration"),
    ("https://images.unsplash.com/photo-1556761175-5973dc0f32e7?auto=format&fit=crop&w=800&q=80", "Meeting"),
    ("https://images.unsplash.com/photo-1531482615713-2afd69097998?auto=format&fit=crop&w=800&q=80", "Presentation"),
    ("https://images.unsplash.com/photo-1600880292203-757bb62b4baf?auto=format&fit=crop&w=800&q=80", "Coworking"),
];

const GLOBE_IMAGES: &[(&str, &str)] = &[
    ("https://images.unsplash.com/photo-1755331039789-7e5680e26e8f?q=80&w=774&auto=format&fit=crop", "Abstract art"),
    ("https://images.unsplash.com/photo-1755569309049-98410b94f66d?q=80&w=772&auto=format&fit=crop", "Modern sculpture"),
    ("https://images.unsplash.com/photo-1755497595318-7e5e3523854f?q=80&w=774&auto=format&fit=crop", "Digital artwork"),
    ("https://images.unsplash.com/photo-1755353985163-c2a0fe5ac3d8?q=80&w=774&auto=format&fit=crop", "Contemporary art"),
    ("https://images.unsplash.com/photo-1745965976680-d00be7dc0377?q=80&w=774&auto=format&fit=crop", "Geometric pattern"),
    ("https://images.unsplash.com/photo-1752588975228-21f44630bb3c?q=80&w=774&auto=format&fit=crop", "Textured surface"),
];

/// How many records each set received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub jobs: usize,
    pub home_images: usize,
    pub globe_images: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        *self == SeedReport::default()
    }
}

pub async fn seed_samples(store: &dyn Store) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    if store.list_jobs().await?.is_empty() {
        for (title, location, description) in SAMPLE_JOBS {
            store
                .insert_job(NewJob {
                    title: title.to_string(),
                    location: location.to_string(),
                    description: description.to_string(),
                })
                .await?;
            report.jobs += 1;
        }
        info!("Added {} sample jobs", report.jobs);
    } else {
        info!("Jobs already present, skipping");
    }

    report.home_images = seed_images(store, ImageCategory::Home, HOME_IMAGES).await?;
    report.globe_images = seed_images(store, ImageCategory::CareerGlobe, GLOBE_IMAGES).await?;

    Ok(report)
}

async fn seed_images(
    store: &dyn Store,
    category: ImageCategory,
    samples: &[(&str, &str)],
) -> StoreResult<usize> {
    let existing = store.list_images(Some(category)).await?.len();
    if existing > 0 {
        info!("Found {existing} existing '{category}' images, skipping");
        return Ok(0);
    }
    for (src, alt) in samples {
        store
            .insert_image(NewImage {
                category,
                src: src.to_string(),
                alt: alt.to_string(),
            })
            .await?;
    }
    info!("Added {} '{category}' images", samples.len());
    Ok(samples.len())
}
