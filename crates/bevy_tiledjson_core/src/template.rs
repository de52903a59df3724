//! Object templates (`.tj` / `.tx.json` files).
//!
//! An object referencing a template is a diff: it only declares the fields it changes. Each
//! distinct template path is loaded once per [`LoadSession`] and merged into every instance
//! that references it.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result, ResultExt};
use crate::loader::LoadSession;
use crate::object::{Object, ObjectRecord, merge_template_object};

/// The abbreviated tileset reference a tile template carries.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TemplateTileset {
    #[serde(rename = "firstgid")]
    pub first_gid: u32,
    pub source: String,
}

/// A parsed template file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Always `template`
    #[serde(rename = "type")]
    pub kind: String,
    pub object: Option<ObjectRecord>,
    pub tileset: Option<TemplateTileset>,
}

/// Templates loaded during one map load, keyed by the reference string as written.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: HashMap<String, Template>,
}

impl TemplateCache {
    pub fn get(&self, path: &str) -> Option<&Template> {
        self.templates.get(path)
    }

    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.templates.contains_key(path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Insert a template unless the path is already cached.
    pub(crate) fn insert(&mut self, path: &str, template: Template) {
        self.templates.entry(path.to_string()).or_insert(template);
    }
}

/// Apply templates to an object layer's records.
///
/// Runs in two passes: every distinct template path is loaded first, then each record is
/// merged. Records without a template pass through unchanged.
pub fn apply_templates(records: Vec<ObjectRecord>, session: &mut LoadSession<'_>) -> Result<Vec<Object>> {
    for record in &records {
        if let Some(path) = record.template_path() {
            session
                .ensure_template(path)
                .in_object(record.id.unwrap_or_default())?;
        }
    }

    records
        .into_iter()
        .map(|record| {
            let id = record.id.unwrap_or_default();
            instantiate(record, session).in_object(id)
        })
        .collect()
}

fn instantiate(record: ObjectRecord, session: &LoadSession<'_>) -> Result<Object> {
    let Some(path) = record.template_path() else {
        return Ok(Object::from(record));
    };

    let template = session
        .templates()
        .get(path)
        .ok_or_else(|| Error::TemplateNotLoaded(path.to_string()))?;
    let base = template
        .object
        .clone()
        .ok_or_else(|| Error::MergeNotRecord(format!("template `{path}`")))?;

    debug!("Applying template {} to object {:?}", path, record.id);

    // A gid the instance does not override still counts from the template's tileset
    let instance_sets_gid = record.gid.is_some_and(|gid| gid != 0);
    let merged = merge_template_object(base, &record);

    let mut object = Object::from(merged);
    object.template_tileset = template.tileset.clone();
    object.template_local_gid = !instance_sets_gid && object.gid != 0 && template.tileset.is_some();
    Ok(object)
}
