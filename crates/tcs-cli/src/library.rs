//! Case library and catalog selection from settings.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use tcs_catalog::{Catalog, StaticCaseLibrary};

use crate::settings::Settings;

/// The collaborator the commands talk to and the catalog built from it.
pub struct Library {
    pub service: StaticCaseLibrary,
    pub catalog: Catalog,
}

impl Library {
    /// Loads the configured fixture, or falls back to the offline library
    /// and built-in catalog when none is configured.
    pub async fn open(settings: &Settings, flag: Option<&Path>) -> Result<Self> {
        let Some(path) = settings.catalog(flag) else {
            info!("no case library configured; using built-in catalog");
            return Ok(Self {
                service: StaticCaseLibrary::offline(),
                catalog: Catalog::builtin(),
            });
        };
        let service = StaticCaseLibrary::from_path(&path)?;
        let catalog = Catalog::load(&service).await;
        Ok(Self { service, catalog })
    }
}
