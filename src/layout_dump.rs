use crate::ir::LayoutSpec;
use crate::layout::{LayoutSummary, Space, SpaceRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Self-describing JSON document for a generated layout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub spec: LayoutSpec,
    pub double_decker: bool,
    pub summary: LayoutSummary,
    pub spaces: Vec<SpaceRecord>,
}

impl LayoutDump {
    pub fn from_layout(spec: &LayoutSpec, double_decker: bool, spaces: &[Space]) -> Self {
        LayoutDump {
            spec: spec.clone(),
            double_decker,
            summary: LayoutSummary::from_spaces(spec, spaces),
            spaces: spaces.iter().map(SpaceRecord::from).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, dump)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
