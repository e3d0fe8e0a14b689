//! The shared handle on a graphics device.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::os::raw::c_void;
use std::rc::Rc;

use crate::backends::gl::GLDevice;
use crate::backends::{Capabilities, Device, HeadlessDevice};
use crate::errors::*;

/// A cheap, clonable handle on the `Device` of the current thread.
///
/// Every resource keeps a clone so it can release its GPU objects when dropped. The
/// handle is neither `Send` nor `Sync`: devices are bound to the thread which owns the
/// graphics context.
#[derive(Clone)]
pub struct Context {
    device: Rc<RefCell<Box<dyn Device>>>,
    capabilities: Rc<Capabilities>,
}

impl Context {
    pub fn new<T: Device + 'static>(device: T) -> Self {
        let capabilities = Rc::new(device.capabilities().clone());
        Context {
            device: Rc::new(RefCell::new(Box::new(device))),
            capabilities,
        }
    }

    /// Creates a context on a fresh `HeadlessDevice`.
    pub fn headless() -> Self {
        Context::new(HeadlessDevice::new())
    }

    /// Creates a context on the OpenGL context current in this thread, loading the
    /// function pointers with `loader`.
    ///
    /// *Safety*: an OpenGL context must be current in the thread, and stay current while
    /// this context and any resource created from it are alive.
    pub unsafe fn gl<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        let device = GLDevice::load_with(loader)?;
        Ok(Context::new(device))
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns true if both handles refer to the same device.
    #[inline]
    pub fn ptr_eq(&self, rhs: &Context) -> bool {
        Rc::ptr_eq(&self.device, &rhs.device)
    }

    /// Borrows the device for the duration of a command.
    ///
    /// # Panics
    ///
    /// If the device is already borrowed, i.e. a command is issued from inside another.
    #[inline]
    pub(crate) fn device(&self) -> RefMut<Box<dyn Device>> {
        self.device.borrow_mut()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("version", &self.capabilities.version)
            .field("renderer", &self.capabilities.renderer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared() {
        let device = HeadlessDevice::new();
        let ctx = Context::new(device.clone());
        let other = ctx.clone();

        assert!(ctx.ptr_eq(&other));
        assert!(!ctx.ptr_eq(&Context::headless()));
        assert_eq!(ctx.capabilities().renderer, "headless");

        let id = ctx.device().create_texture(gl::TEXTURE_2D).unwrap();
        assert!(device.is_texture(id));
    }
}
