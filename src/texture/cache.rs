//! A pool of same-sized 2D textures for transient contents, e.g. decoded video frames.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use crate::context::Context;
use crate::errors::*;
use crate::image::Surface8u;
use crate::math::Vector2;

use super::base::Texture;
use super::format::Format;
use super::texture2d::Texture2d;

/// Marks a slot whose texture is not leased.
const AVAILABLE: i32 = -1;

#[derive(Debug)]
struct CacheState {
    format: Format,
    size: Vector2<u32>,
    next_id: i32,
    /// Pairs of reservation id and master texture.
    slots: Vec<(i32, Texture2d)>,
}

/// Hands out 2D textures holding the surfaces passed to `cache`. A texture is leased
/// until the returned `CachedTexture` is dropped, then its slot is reused by the next
/// call. The pool only grows.
pub struct Texture2dCache {
    ctx: Context,
    state: Rc<RefCell<CacheState>>,
}

impl Texture2dCache {
    /// Creates an empty pool of textures of the size of `prototype`.
    pub fn new(ctx: &Context, prototype: &Surface8u, format: Format) -> Self {
        let state = CacheState {
            format,
            size: prototype.size(),
            next_id: 0,
            slots: Vec::new(),
        };

        Texture2dCache {
            ctx: ctx.clone(),
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Uploads `surface` into an available texture, or a new one if all of them are
    /// leased, and leases it.
    pub fn cache(&self, surface: &Surface8u) -> Result<CachedTexture> {
        let mut state = self.state.borrow_mut();
        if surface.size() != state.size {
            return Err(Error::ResizeMismatch {
                attempted: surface.size(),
                expected: state.size,
            });
        }

        let id = state.next_id;
        state.next_id = state.next_id.wrapping_add(1).max(0);

        let slot = match state.slots.iter().position(|v| v.0 == AVAILABLE) {
            Some(slot) => {
                state.slots[slot].1.update_surface(surface, 0)?;
                state.slots[slot].0 = id;
                slot
            }
            None => {
                let texture = Texture2d::from_surface(&self.ctx, surface, state.format.clone())?;
                debug!(
                    "Texture2dCache grows to {} slots of {:?}.",
                    state.slots.len() + 1,
                    state.size
                );

                state.slots.push((id, texture));
                state.slots.len() - 1
            }
        };

        Ok(CachedTexture {
            texture: state.slots[slot].1.alias(),
            slot,
            state: self.state.clone(),
        })
    }

    /// Returns the number of master textures.
    pub fn slot_count(&self) -> usize {
        self.state.borrow().slots.len()
    }

    /// Returns the number of master textures which are not leased.
    pub fn available_count(&self) -> usize {
        let state = self.state.borrow();
        state.slots.iter().filter(|v| v.0 == AVAILABLE).count()
    }

    /// Returns the size of the cached textures.
    pub fn size(&self) -> Vector2<u32> {
        self.state.borrow().size
    }
}

/// A leased texture of a `Texture2dCache`. It does not own the GL object; dropping it
/// returns the texture to the pool, together with any parameter changed through it.
#[derive(Debug)]
pub struct CachedTexture {
    texture: Texture2d,
    slot: usize,
    state: Rc<RefCell<CacheState>>,
}

impl CachedTexture {
    /// Returns the index of the slot of the pool this texture belongs to.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl Deref for CachedTexture {
    type Target = Texture2d;

    fn deref(&self) -> &Self::Target {
        &self.texture
    }
}

impl DerefMut for CachedTexture {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.texture
    }
}

impl Drop for CachedTexture {
    fn drop(&mut self) {
        match self.state.try_borrow_mut() {
            Ok(mut state) => {
                if let Some(v) = state.slots.get_mut(self.slot) {
                    v.1.adopt_state(&self.texture);
                    v.0 = AVAILABLE;
                }
            }
            Err(_) => error!(
                "Failed to return texture {} to its cache.",
                self.texture.base().id()
            ),
        }
    }
}
