use super::{Modifier, ModifierResult};
use crate::error::EngineResult;
use crate::selection::Selection;
use docweave_document::ImageElement;

/// How the inserted image is sized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Pixel size of the resource
    Original,
    /// Fixed width, height follows the aspect ratio
    KeepWidth(u32),
    /// Fixed height, width follows the aspect ratio
    KeepHeight(u32),
    Fixed { width: u32, height: u32 },
}

impl SizePolicy {
    pub fn apply(&self, (width, height): (u32, u32)) -> (u32, u32) {
        let scale = |value: u32, num: u32, den: u32| -> u32 {
            if den == 0 {
                return 0;
            }
            ((value as u64 * num as u64 + den as u64 / 2) / den as u64) as u32
        };
        match *self {
            SizePolicy::Original => (width, height),
            SizePolicy::KeepWidth(w) => (w, scale(height, w, width)),
            SizePolicy::KeepHeight(h) => (scale(width, h, height), h),
            SizePolicy::Fixed { width, height } => (width, height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// Handle given to the resource provider
    pub resource: String,
    /// File name of the image inside the document
    pub name: String,
    pub size: SizePolicy,
}

/// Replace the placeholder with an image resource. Pixel dimensions come
/// from the engine's dimension cache; read and decode failures propagate.
pub struct InsertImage;

impl Modifier<ImageRequest> for InsertImage {
    fn modify(&self, selection: &mut Selection<'_>, request: ImageRequest) -> EngineResult<ModifierResult> {
        let Some(toolkit) = selection.toolkit else {
            return Ok(ModifierResult::Ignored);
        };
        let services = selection.services;
        let source = services.resources.identify(&request.resource)?;
        let original = services
            .dimensions
            .lookup(services.resources.as_ref(), &request.resource)?;
        let (width, height) = request.size.apply(original);

        let image = ImageElement {
            name: request.name,
            source,
            width,
            height,
        };
        let element = toolkit.insert_image(selection.doc, selection.node, &image)?;
        Ok(ModifierResult::success_at(selection.doc, Some(element), true))
    }
}
