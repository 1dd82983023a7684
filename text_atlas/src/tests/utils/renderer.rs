// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::{DirtyRect, Renderer, RendererError, TextureData};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawCall {
    pub(crate) positions: Vec<[f32; 2]>,
    pub(crate) texcoords: Vec<[f32; 2]>,
    pub(crate) colors: Vec<u32>,
}

/// Records every call a context makes.
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) created: Option<(u16, u16)>,
    pub(crate) resized: Vec<(u16, u16)>,
    /// Dirty rect and texture size of every upload.
    pub(crate) updates: Vec<(DirtyRect, u16, u16)>,
    pub(crate) draws: Vec<DrawCall>,
    pub(crate) deleted: Rc<Cell<bool>>,
    pub(crate) refuse_create: bool,
    pub(crate) refuse_resize: bool,
}

impl RecordingRenderer {
    pub(crate) fn vertex_counts(&self) -> Vec<usize> {
        self.draws.iter().map(|d| d.positions.len()).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn create(&mut self, width: u16, height: u16) -> Result<(), RendererError> {
        if self.refuse_create {
            return Err(RendererError);
        }
        self.created = Some((width, height));
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<(), RendererError> {
        if self.refuse_resize {
            return Err(RendererError);
        }
        self.resized.push((width, height));
        Ok(())
    }

    fn update(&mut self, dirty: DirtyRect, texture: TextureData<'_>) {
        assert_eq!(
            texture.pixels.len(),
            usize::from(texture.width) * usize::from(texture.height)
        );
        self.updates.push((dirty, texture.width, texture.height));
    }

    fn draw(&mut self, positions: &[[f32; 2]], texcoords: &[[f32; 2]], colors: &[u32]) {
        assert_eq!(positions.len(), texcoords.len());
        assert_eq!(positions.len(), colors.len());
        assert_eq!(positions.len() % 6, 0);
        self.draws.push(DrawCall {
            positions: positions.to_vec(),
            texcoords: texcoords.to_vec(),
            colors: colors.to_vec(),
        });
    }

    fn delete(&mut self) {
        self.deleted.set(true);
    }
}
