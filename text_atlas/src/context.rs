// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The text rendering context.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

use hashbrown::HashMap;
use linebender_resource_handle::Blob;

use crate::atlas::Atlas;
use crate::batch::{Quad, VertexBatch};
use crate::error::{Error, ErrorAction, ErrorKind};
use crate::font::{Font, FontEngine, FontId, truncate_name};
use crate::renderer::{DirtyRect, Renderer, TextureData};
use crate::scratch::ScratchArena;
use crate::state::{Alignment, Origin, StackError, StateStack, TextStyle};

/// Size of the opaque block packed at the atlas origin for solid fills.
const WHITE_RECT_SIZE: u16 = 2;

/// Construction parameters for a [`Context`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ContextConfig {
    /// Initial atlas width in pixels.
    pub width: u16,
    /// Initial atlas height in pixels.
    pub height: u16,
    /// Direction of the vertical axis for positions and quads.
    pub origin: Origin,
    /// Bytes of scratch memory available to the font engine per glyph.
    pub scratch_size: usize,
    /// Vertices buffered before drawing, rounded down to whole quads.
    pub vertex_capacity: usize,
    /// Maximum depth of the style stack.
    pub max_states: usize,
    /// Maximum number of fallbacks per font.
    pub max_fallbacks: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            origin: Origin::TopLeft,
            scratch_size: 64_000,
            vertex_capacity: 1024,
            max_states: 20,
            max_fallbacks: 20,
        }
    }
}

type ErrorCallback = Box<dyn FnMut(&Error) -> ErrorAction>;

/// Glyph atlas, font registry and text layout state for one renderer.
///
/// Text is drawn with [`draw_text`](Self::draw_text): glyphs missing from
/// the atlas are rasterized through the [`FontEngine`], the changed part of
/// the atlas is uploaded and the glyph quads are handed to the [`Renderer`]
/// as triangles.
pub struct Context<E: FontEngine, R: Renderer> {
    pub(crate) config: ContextConfig,
    pub(crate) engine: E,
    pub(crate) renderer: R,
    pub(crate) fonts: Vec<Font<E::Font>>,
    names: HashMap<String, FontId>,
    pub(crate) atlas: Atlas,
    pub(crate) texture: Vec<u8>,
    pub(crate) dirty: DirtyRect,
    pub(crate) scratch: ScratchArena,
    pub(crate) batch: VertexBatch,
    pub(crate) states: StateStack,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl<E: FontEngine, R: Renderer> Debug for Context<E, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("fonts", &self.fonts.len())
            .field("atlas", &self.atlas)
            .field("dirty", &self.dirty)
            .field("batch", &self.batch.len())
            .field("states", &self.states)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: FontEngine, R: Renderer> Context<E, R> {
    /// Creates a context and asks `renderer` for the atlas texture.
    pub fn new(config: ContextConfig, engine: E, mut renderer: R) -> Result<Self, Error> {
        renderer.create(config.width, config.height)?;
        let mut cx = Self {
            config,
            engine,
            renderer,
            fonts: Vec::new(),
            names: HashMap::new(),
            atlas: Atlas::new(config.width, config.height),
            texture: vec![0; usize::from(config.width) * usize::from(config.height)],
            dirty: DirtyRect::empty(config.width, config.height),
            scratch: ScratchArena::new(config.scratch_size),
            batch: VertexBatch::new(config.vertex_capacity),
            states: StateStack::new(config.max_states),
            on_error: None,
        };
        cx.add_white_rect();
        Ok(cx)
    }

    /// Installs the handler for capacity errors.
    ///
    /// See [`ErrorAction`] for what the handler can ask for.
    pub fn set_error_callback(&mut self, callback: impl FnMut(&Error) -> ErrorAction + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Removes the error handler.
    pub fn clear_error_callback(&mut self) {
        self.on_error = None;
    }

    /// The font engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The font engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// The vertical axis direction chosen at creation.
    pub fn origin(&self) -> Origin {
        self.config.origin
    }

    pub(crate) fn signal(&mut self, error: &Error) -> ErrorAction {
        match self.on_error.as_mut() {
            Some(callback) => callback(error),
            None => ErrorAction::Ignore,
        }
    }

    pub(crate) fn apply_error_action(&mut self, action: ErrorAction) {
        let result = match action {
            ErrorAction::Ignore => Ok(()),
            ErrorAction::ExpandAtlas { width, height } => self.expand_atlas(width, height),
            ErrorAction::ResetAtlas { width, height } => self.reset_atlas(width, height),
        };
        if let Err(err) = result {
            log::warn!("error callback action {action:?} failed: {err}");
        }
    }

    // --- Fonts ---

    /// Registers a font under `name`.
    ///
    /// Names longer than 63 bytes are truncated. If the name is already
    /// taken, lookups keep finding the first font registered with it.
    pub fn add_font(&mut self, name: &str, data: Blob<u8>) -> Result<FontId, Error> {
        self.scratch.reset();
        let Some(handle) = self.engine.load_font(&data) else {
            log::warn!("font engine rejected font data for {name:?}");
            return Err(Error::new(ErrorKind::FontLoad));
        };
        let id = u32::try_from(self.fonts.len())
            .map(FontId::new)
            .map_err(|_| Error::new(ErrorKind::FontLoad))?;
        let metrics = self.engine.vertical_metrics(&handle);
        let font = Font::new(name, handle, data, metrics);
        self.names.entry(font.name.clone()).or_insert(id);
        self.fonts.push(font);
        Ok(id)
    }

    /// Reads a font file and registers it under `name`.
    #[cfg(feature = "std")]
    pub fn add_font_file(
        &mut self,
        name: &str,
        path: impl AsRef<std::path::Path>,
    ) -> Result<FontId, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            log::warn!("failed to read font file {}: {err}", path.display());
            Error::new(ErrorKind::FontLoad)
        })?;
        self.add_font(name, Blob::from(bytes))
    }

    /// Finds the first font registered as `name`.
    pub fn font_by_name(&self, name: &str) -> Option<FontId> {
        self.names.get(truncate_name(name)).copied()
    }

    /// Number of registered fonts.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// The name a font was registered with.
    pub fn font_name(&self, font: FontId) -> Option<&str> {
        self.fonts.get(font.index()).map(|f| f.name.as_str())
    }

    /// The bytes a font was loaded from.
    pub fn font_data(&self, font: FontId) -> Option<&Blob<u8>> {
        self.fonts.get(font.index()).map(|f| &f.data)
    }

    /// Number of glyphs currently cached for `font`.
    pub fn glyph_count(&self, font: FontId) -> usize {
        self.fonts.get(font.index()).map_or(0, |f| f.glyphs.len())
    }

    /// Makes `fallback` the next font consulted for codepoints `base` lacks.
    ///
    /// Unknown ids are ignored.
    pub fn add_fallback_font(&mut self, base: FontId, fallback: FontId) -> Result<(), Error> {
        if fallback.index() >= self.fonts.len() {
            log::debug!("ignoring unknown fallback font {}", fallback.to_u32());
            return Ok(());
        }
        let max = self.config.max_fallbacks;
        let Some(font) = self.fonts.get_mut(base.index()) else {
            log::debug!("ignoring fallback for unknown font {}", base.to_u32());
            return Ok(());
        };
        if font.fallbacks.len() >= max {
            log::warn!("font {:?} already has {max} fallbacks", font.name);
            let err = Error::new(ErrorKind::FallbacksFull);
            self.signal(&err);
            return Err(err);
        }
        font.fallbacks.push(fallback);
        Ok(())
    }

    // --- Style state ---

    /// The active style.
    pub fn state(&self) -> &TextStyle {
        self.states.top()
    }

    /// Number of frames on the style stack.
    pub fn state_depth(&self) -> usize {
        self.states.depth()
    }

    /// Saves the active style.
    pub fn push_state(&mut self) {
        if let Err(StackError::Overflow) = self.states.push() {
            log::warn!("style stack overflow at depth {}", self.states.depth());
            self.signal(&Error::new(ErrorKind::StatesOverflow));
        }
    }

    /// Restores the last saved style.
    pub fn pop_state(&mut self) {
        if let Err(StackError::Underflow) = self.states.pop() {
            log::warn!("style stack underflow");
            self.signal(&Error::new(ErrorKind::StatesUnderflow));
        }
    }

    /// Resets the active style to the defaults.
    pub fn clear_state(&mut self) {
        self.states.clear();
    }

    /// Sets the font size in pixels.
    pub fn set_size(&mut self, size: f32) {
        self.states.top_mut().size = size;
    }

    /// Sets the packed RGBA text colour.
    pub fn set_color(&mut self, color: u32) {
        self.states.top_mut().color = color;
    }

    /// Sets extra space between glyphs in pixels.
    pub fn set_spacing(&mut self, spacing: f32) {
        self.states.top_mut().spacing = spacing;
    }

    /// Sets the blur radius in pixels.
    pub fn set_blur(&mut self, blur: f32) {
        self.states.top_mut().blur = blur;
    }

    /// Sets the alignment relative to the drawing position.
    pub fn set_align(&mut self, align: Alignment) {
        self.states.top_mut().align = align;
    }

    /// Sets the active font.
    pub fn set_font(&mut self, font: FontId) {
        self.states.top_mut().font = font;
    }

    // --- Atlas ---

    /// Current atlas size in pixels.
    pub fn atlas_size(&self) -> (u16, u16) {
        (self.atlas.width(), self.atlas.height())
    }

    /// The atlas texture.
    pub fn texture_data(&self) -> TextureData<'_> {
        TextureData {
            pixels: &self.texture,
            width: self.atlas.width(),
            height: self.atlas.height(),
        }
    }

    /// Takes the pending dirty region, for renderers that upload on their
    /// own schedule.
    pub fn validate_texture(&mut self) -> Option<DirtyRect> {
        if self.dirty.is_empty() {
            return None;
        }
        let dirty = self.dirty;
        self.dirty = DirtyRect::empty(self.atlas.width(), self.atlas.height());
        Some(dirty)
    }

    /// Grows the atlas, keeping every cached glyph.
    ///
    /// Dimensions smaller than the current ones are ignored.
    pub fn expand_atlas(&mut self, width: u16, height: u16) -> Result<(), Error> {
        let (old_width, old_height) = self.atlas_size();
        let width = width.max(old_width);
        let height = height.max(old_height);
        if (width, height) == (old_width, old_height) {
            return Ok(());
        }

        self.flush();
        self.renderer.resize(width, height)?;

        let (w, old_w) = (usize::from(width), usize::from(old_width));
        let mut texture = vec![0; w * usize::from(height)];
        if old_w > 0 {
            for (dst, src) in texture
                .chunks_exact_mut(w)
                .zip(self.texture.chunks_exact(old_w))
            {
                dst[..old_w].copy_from_slice(src);
            }
        }
        self.texture = texture;
        self.atlas.expand(width, height);

        // Everything packed so far has to be uploaded into the new texture.
        self.dirty = DirtyRect {
            min_x: 0,
            min_y: 0,
            max_x: old_width,
            max_y: self.atlas.max_y(),
        };
        log::debug!("expanded glyph atlas from {old_width}x{old_height} to {width}x{height}");
        Ok(())
    }

    /// Drops every cached glyph and starts over with a `width` x `height`
    /// atlas.
    pub fn reset_atlas(&mut self, width: u16, height: u16) -> Result<(), Error> {
        self.flush();
        self.renderer.resize(width, height)?;

        self.atlas.reset(width, height);
        self.texture.clear();
        self.texture
            .resize(usize::from(width) * usize::from(height), 0);
        self.dirty = DirtyRect::empty(width, height);
        for font in &mut self.fonts {
            font.glyphs.clear();
        }
        self.add_white_rect();
        log::debug!("reset glyph atlas to {width}x{height}");
        Ok(())
    }

    fn add_white_rect(&mut self) {
        let size = WHITE_RECT_SIZE;
        let Some((gx, gy)) = self.atlas.add_rect(size, size) else {
            return;
        };
        let stride = usize::from(self.atlas.width());
        for row in 0..usize::from(size) {
            let start = usize::from(gx) + (usize::from(gy) + row) * stride;
            self.texture[start..start + usize::from(size)].fill(0xff);
        }
        self.dirty.include(gx, gy, gx + size, gy + size);
    }

    // --- Output ---

    /// Uploads pending atlas changes and draws the buffered triangles.
    pub fn flush(&mut self) {
        if !self.dirty.is_empty() {
            let texture = TextureData {
                pixels: &self.texture,
                width: self.atlas.width(),
                height: self.atlas.height(),
            };
            self.renderer.update(self.dirty, texture);
            self.dirty = DirtyRect::empty(self.atlas.width(), self.atlas.height());
        }
        if !self.batch.is_empty() {
            self.renderer.draw(
                self.batch.positions(),
                self.batch.texcoords(),
                self.batch.colors(),
            );
            self.batch.clear();
        }
    }

    /// Draws the whole atlas at `(x, y)` with its skyline in red.
    pub fn draw_debug(&mut self, x: f32, y: f32) {
        let (width, height) = self.atlas_size();
        let (w, h) = (f32::from(width), f32::from(height));
        // Center of the white rect at the origin.
        let u = if width == 0 { 0.0 } else { 1.0 / w };
        let v = if height == 0 { 0.0 } else { 1.0 / h };

        // Background.
        self.push_debug_rect([x, y, x + w, y + h], [u, v, u, v], 0x0fff_ffff);
        // Texture.
        self.push_debug_rect(
            [x, y, x + w, y + h],
            [0.0, 0.0, 1.0, 1.0],
            0xffff_ffff,
        );

        for i in 0..self.atlas.nodes().len() {
            let node = self.atlas.nodes()[i];
            let nx = x + f32::from(node.x);
            let ny = y + f32::from(node.y);
            let nw = f32::from(node.width);
            self.push_debug_rect([nx, ny, nx + nw, ny + 1.0], [u, v, u, v], 0xc000_00ff);
        }

        self.flush();
    }

    /// Queues a debug quad, flushing first if the batch is full.
    fn push_debug_rect(
        &mut self,
        [x0, y0, x1, y1]: [f32; 4],
        [s0, t0, s1, t1]: [f32; 4],
        color: u32,
    ) {
        if !self.batch.has_room(6) {
            self.flush();
        }
        let quad = Quad {
            x0,
            y0,
            s0,
            t0,
            x1,
            y1,
            s1,
            t1,
        };
        self.batch.push_quad(&quad, color);
    }
}

impl<E: FontEngine, R: Renderer> Drop for Context<E, R> {
    fn drop(&mut self) {
        self.renderer.delete();
    }
}
