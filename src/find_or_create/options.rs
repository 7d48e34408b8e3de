//! Find-or-create options and their layered resolution.

use serde::{Deserialize, Serialize};

use crate::store::SaveOptions;

/// Effective options for one find-or-create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindOrCreateOptions {
    /// Concatenate onto existing array fields instead of replacing them.
    pub append_to_array: bool,
    /// Passed verbatim to the store's save.
    pub save_options: SaveOptions,
    /// When false, a found document is returned untouched even if
    /// additional fields were supplied.
    pub save_if_found: bool,
    /// Resolve to a [`Status`](super::Status) instead of the bare record.
    pub status: bool,
}

impl Default for FindOrCreateOptions {
    fn default() -> Self {
        Self {
            append_to_array: false,
            save_options: SaveOptions::default(),
            save_if_found: true,
            status: false,
        }
    }
}

impl FindOrCreateOptions {
    /// Built-in defaults, then schema defaults, then per-call overrides.
    pub fn resolve(schema_defaults: &OptionsOverride, call: &OptionsOverride) -> Self {
        Self::default().merged(schema_defaults).merged(call)
    }

    /// Apply every field `layer` sets on top of these options.
    pub fn merged(mut self, layer: &OptionsOverride) -> Self {
        if let Some(append) = layer.append_to_array {
            self.append_to_array = append;
        }
        if let Some(save_options) = &layer.save_options {
            self.save_options = save_options.clone();
        }
        if let Some(save_if_found) = layer.save_if_found {
            self.save_if_found = save_if_found;
        }
        if let Some(status) = layer.status {
            self.status = status;
        }
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A partial set of options; unset fields defer to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_to_array: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_options: Option<SaveOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_if_found: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl OptionsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_to_array(mut self, append: bool) -> Self {
        self.append_to_array = Some(append);
        self
    }

    pub fn save_options(mut self, options: SaveOptions) -> Self {
        self.save_options = Some(options);
        self
    }

    pub fn save_if_found(mut self, save: bool) -> Self {
        self.save_if_found = Some(save);
        self
    }

    pub fn status(mut self, status: bool) -> Self {
        self.status = Some(status);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
