//! Bitmap boundary of the shape decoder.
//!
//! The decoder never touches pixels: bitmap fills are resolved to
//! indices in a per-shape dependency set, and the renderer maps those
//! indices back to ids and then to pixels through a `BitmapProvider`.

use fxhash::FxHashMap;

/// Decoded bitmap pixels, straight RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Input side of the provider: a bitmap definition tag. Palette and
/// run decompression happen upstream of this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineBitmap {
    pub id: u16,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait BitmapProvider {
    fn add_bitmap(&mut self, tag: DefineBitmap);
    fn get_by_id(&self, id: u16) -> Option<&Bitmap>;
}

/// Plain id-keyed provider for hosts and tests.
#[derive(Debug, Default)]
pub struct BitmapRegistry {
    bitmaps: FxHashMap<u16, Bitmap>,
}

impl BitmapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }
}

impl BitmapProvider for BitmapRegistry {
    fn add_bitmap(&mut self, tag: DefineBitmap) {
        self.bitmaps.insert(
            tag.id,
            Bitmap {
                width: tag.width,
                height: tag.height,
                pixels: tag.pixels,
            },
        );
    }

    fn get_by_id(&self, id: u16) -> Option<&Bitmap> {
        self.bitmaps.get(&id)
    }
}

/// Ordered set of the bitmap ids referenced by one shape. Decoded
/// bitmap fills store an index into this set instead of the raw id.
/// Scoped to a single decode call as an in/out parameter.
#[derive(Debug, Default)]
pub struct BitmapDeps {
    ids: Vec<u16>,
    index: FxHashMap<u16, usize>,
}

impl BitmapDeps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `id`, appending it on first sight.
    pub fn index_of(&mut self, id: u16) -> usize {
        if let Some(&index) = self.index.get(&id) {
            return index;
        }
        let index = self.ids.len();
        self.ids.push(id);
        self.index.insert(id, index);
        index
    }

    /// Referenced ids in first-sight order.
    pub fn ids(&self) -> &[u16] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
