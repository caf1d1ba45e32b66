//! # Server-Side Generator
//!
//! The `ServerSideGenerator` is the top-level entry point for server
//! container generation. It takes a [`ContainerModel`] and a
//! [`MigrationAnalysis`], builds a fresh [`GenerationContext`], and runs the
//! generation passes to produce a [`GenerationOutput`].
//!
//! ## Pipeline
//!
//! ```text
//! ContainerModel + MigrationAnalysis
//!         │
//!         ▼
//!   analysis.filter_vendors(config.vendors)
//!         │
//!         ▼
//!   GenerationContext::new(config, clock)
//!         │
//!         ├──► folders → constants → event data → templates → clients
//!         ├──► plan tags → triggers → tags
//!         │
//!         ▼
//!   export::assemble() → GenerationOutput { export, summary }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tagforge_codegen::{GeneratorConfig, ServerSideGenerator, StaticCatalog};
//! use tagforge_ir::{MigrationAnalysis, load_container};
//!
//! let model = load_container("GTM-XXXX_workspace.json")?;
//! let analysis = MigrationAnalysis::from_container(&model);
//! let generator = ServerSideGenerator::new(GeneratorConfig::default(), StaticCatalog::new());
//!
//! let output = generator.generate(&model, &analysis);
//! println!("{}", output.summary().display());
//! output.write_export("server-container.json")?;
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;
use tagforge_ir::{ContainerModel, MigrationAnalysis};

use crate::catalog::TemplateCatalog;
use crate::client_patch::patch_client_container;
use crate::context::GenerationContext;
use crate::export;
use crate::passes::{self, clients, constants, folders, tags, templates, triggers, variables};
use crate::{GenerationOutput, GeneratorConfig};

// ============================================================================
// ServerSideGenerator
// ============================================================================

/// Generates server containers from client containers.
///
/// The generator holds only its configuration, the template catalogue and
/// a clock reading; every call to [`generate`](Self::generate) starts from
/// a new context, so repeated calls with the same inputs produce identical
/// documents.
pub struct ServerSideGenerator {
    config: GeneratorConfig,
    catalog: Box<dyn TemplateCatalog>,
    now: DateTime<Utc>,
}

impl ServerSideGenerator {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create a generator that reads the clock now
    pub fn new(config: GeneratorConfig, catalog: impl TemplateCatalog + 'static) -> Self {
        Self {
            config,
            catalog: Box::new(catalog),
            now: Utc::now(),
        }
    }

    /// Use a fixed clock reading for fingerprints and the export time
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Generate the server container for a client container.
    ///
    /// Generation never fails: values that cannot be found become
    /// placeholders and tags without a server counterpart are skipped, both
    /// reported in the summary.
    pub fn generate(&self, model: &ContainerModel, analysis: &MigrationAnalysis) -> GenerationOutput {
        // ── 1. Vendor filtering ──────────────────────────────────────────
        let analysis = analysis.filter_vendors(&self.config.vendors);

        // ── 2. Context ───────────────────────────────────────────────────
        let mut ctx = GenerationContext::new(self.config.clone(), self.now);

        // ── 3. Passes ────────────────────────────────────────────────────
        folders::generate_folders(&mut ctx, &analysis);
        constants::generate_constants(&mut ctx, model, &analysis);
        variables::generate_event_data_variables(&mut ctx);
        templates::generate_templates(&mut ctx, &analysis, self.catalog.as_ref());
        clients::generate_clients(&mut ctx, &analysis);

        let plans = passes::plan_tags(&ctx, &analysis);
        triggers::generate_triggers(&mut ctx, model, &analysis, &plans);
        tags::generate_tags(&mut ctx, model, &analysis, &plans);

        // ── 4. Assembly ──────────────────────────────────────────────────
        let (export, summary) = export::assemble(ctx);

        tracing::info!(
            tags = summary.tags_created,
            triggers = summary.triggers_created,
            constants = summary.constants_created,
            placeholders = summary.placeholders.len(),
            warnings = summary.warnings.len(),
            "server container generated",
        );

        GenerationOutput { export, summary }
    }

    /// Copy of the client container with its GA4 tags pointed at the
    /// configured transport URL (or the placeholder)
    pub fn generate_modified_client_container(&self, model: &ContainerModel) -> Value {
        patch_client_container(model.raw(), self.config.transport_url_or_placeholder())
    }
}

impl std::fmt::Debug for ServerSideGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSideGenerator")
            .field("config", &self.config)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
