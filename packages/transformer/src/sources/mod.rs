//! Source families and the per-source layer lists.
//!
//! Each source is an ordered list of static [`Layer`]s, from the base layer
//! for its serialization to the most specific source rules. The list is
//! folded into a [`HandlerRegistry`] once per run.

mod aardvark;
mod common;
pub mod crosswalks;
mod datacite;
mod dspace_dim;
mod dspace_mets;
mod ead;
mod marc;
mod oai_dc;
mod springshare;

use crate::config::SourceName;
use crate::error::Result;
use crate::registry::{HandlerRegistry, Layer};

use aardvark::AARDVARK;
use common::{JSON_BASE, XML_BASE};
use datacite::{DATACITE, ZENODO};
use dspace_dim::{DSPACE_DIM, WHOAS};
use dspace_mets::DSPACE_METS;
use ead::EAD;
use marc::MARC;
use oai_dc::OAI_DC;
use springshare::{LIBGUIDES, SPRINGSHARE};

static ALMA: [&Layer; 2] = [&XML_BASE, &MARC];
static ASPACE: [&Layer; 2] = [&XML_BASE, &EAD];
static DSPACE: [&Layer; 2] = [&XML_BASE, &DSPACE_METS];
static JPAL: [&Layer; 2] = [&XML_BASE, &DATACITE];
static ZENODO_LAYERS: [&Layer; 3] = [&XML_BASE, &DATACITE, &ZENODO];
static WHOAS_LAYERS: [&Layer; 3] = [&XML_BASE, &DSPACE_DIM, &WHOAS];
static LIBGUIDES_LAYERS: [&Layer; 4] = [&XML_BASE, &OAI_DC, &SPRINGSHARE, &LIBGUIDES];
static RESEARCH_DATABASES: [&Layer; 3] = [&XML_BASE, &OAI_DC, &SPRINGSHARE];
static GEOSPATIAL: [&Layer; 2] = [&JSON_BASE, &AARDVARK];

/// Layers for a source, least specific first.
#[must_use]
pub fn layers_for(source: SourceName) -> &'static [&'static Layer] {
    match source {
        SourceName::Alma => &ALMA,
        SourceName::Aspace => &ASPACE,
        SourceName::Dspace => &DSPACE,
        SourceName::Jpal => &JPAL,
        SourceName::Zenodo => &ZENODO_LAYERS,
        SourceName::Whoas => &WHOAS_LAYERS,
        SourceName::Libguides => &LIBGUIDES_LAYERS,
        SourceName::Researchdatabases => &RESEARCH_DATABASES,
        SourceName::Gismit | SourceName::Gisogm => &GEOSPATIAL,
    }
}

/// Build the handler registry for a source.
///
/// # Errors
/// Returns `TransformError::Configuration` when the layers leave a mandatory
/// attribute or identity hook without a provider.
///
/// # Examples
/// ```
/// use crosswalk_transformer::config::SourceName;
/// use crosswalk_transformer::models::Field;
/// use crosswalk_transformer::sources::registry_for;
///
/// let registry = registry_for(SourceName::Zenodo).unwrap();
/// assert_eq!(registry.layers(), ["xml-base", "datacite", "zenodo"]);
/// assert!(registry.has_handler(Field::FundingInformation));
/// ```
pub fn registry_for(source: SourceName) -> Result<HandlerRegistry> {
    HandlerRegistry::build(layers_for(source))
}
