use crate::error::{EngineError, EngineResult};
use crate::modifiers::{ImageRequest, InsertImage, Modifier, SizePolicy};
use crate::registry::{CommandHandler, CommandResult};
use crate::selection::Selection;
use std::path::Path;

/// `${Image resource:"logo.png", name:"logo.png", width:120}`
///
/// With only `width` or only `height` the other side keeps the aspect
/// ratio; with neither the image keeps its pixel size.
pub struct ImageCommand;

impl CommandHandler for ImageCommand {
    fn keys(&self) -> &'static [&'static str] {
        &["Image"]
    }

    fn execute(&self, selection: &mut Selection<'_>) -> EngineResult<CommandResult> {
        let resource = selection.require_str("resource")?.to_string();
        let name = match selection.str_param("name") {
            Some(name) => name.to_string(),
            None => Path::new(&resource)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| resource.clone()),
        };

        let width = dimension(selection, "width")?;
        let height = dimension(selection, "height")?;
        let size = match (width, height) {
            (Some(width), Some(height)) => SizePolicy::Fixed { width, height },
            (Some(width), None) => SizePolicy::KeepWidth(width),
            (None, Some(height)) => SizePolicy::KeepHeight(height),
            (None, None) => SizePolicy::Original,
        };

        let request = ImageRequest { resource, name, size };
        Ok(InsertImage.modify(selection, request)?.into())
    }
}

fn dimension(selection: &Selection<'_>, key: &str) -> EngineResult<Option<u32>> {
    match selection.invocation.param(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| EngineError::invalid_value(format!("'{}' must be a positive integer", key))),
    }
}
