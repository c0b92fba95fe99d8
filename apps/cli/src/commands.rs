// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command implementations. Each returns `anyhow::Result` so `main` can
//! report the error chain and pick the exit status.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use df_radiance::{Model, TranslationOptions};
use serde_json::Value;

/// Read and load a model file.
pub fn load_model(path: &Path) -> Result<Model> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let model = Model::from_dict(&data)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;
    tracing::info!(model = %model.identifier, "Loaded model");
    Ok(model)
}

/// Serialize `value` to `output`, or to stdout when `None`.
pub fn write_json(value: &Value, output: Option<&Path>, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", text),
    }
    Ok(())
}

/// The translated 3D model dictionary.
///
/// A single model is written as an object; one model per building is
/// written as an array of objects.
pub fn model_to_honeybee(model: &Model, options: &TranslationOptions) -> Result<Value> {
    let mut dicts = model
        .to_honeybee(options)
        .context("Model translation failed")?
        .iter()
        .map(|m| m.to_dict())
        .collect::<df_radiance_core::Result<Vec<_>>>()?;
    if dicts.len() == 1 {
        return Ok(dicts.remove(0));
    }
    Ok(Value::Array(dicts))
}

/// Write one `<grid>.json` per sensor grid of the translated model plus an
/// `_info.json` summary, returning the written grid files.
pub fn model_to_grids(
    model: &Model,
    options: &TranslationOptions,
    folder: &Path,
    pretty: bool,
) -> Result<Vec<PathBuf>> {
    let hb_models = model.to_honeybee(options).context("Model translation failed")?;
    fs::create_dir_all(folder)
        .with_context(|| format!("Failed to create folder {}", folder.display()))?;

    let mut written = Vec::new();
    let mut info = Vec::new();
    for grid in hb_models
        .iter()
        .flat_map(|m| m.properties.radiance.sensor_grids.iter())
    {
        let path = folder.join(format!("{}.json", grid.identifier));
        write_json(&grid.to_dict()?, Some(&path), pretty)?;
        info.push(grid.info_dict());
        written.push(path);
    }
    write_json(&Value::Array(info), Some(&folder.join("_info.json")), pretty)?;
    tracing::info!(grids = written.len(), folder = %folder.display(), "Wrote sensor grids");
    Ok(written)
}

/// Duplicate identifier report for the model; empty when the model is valid.
pub fn check(model: &Model, raise: bool) -> Result<String> {
    let report = model
        .properties
        .radiance
        .check_all(model, raise)
        .context("Model check failed")?;
    Ok(report)
}
