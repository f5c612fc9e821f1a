//! Texture placeholders shared between the resolver and background fetches

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::assets::ImageData;

/// Texture wrapping modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Repeat the texture
    #[default]
    Repeat,
    /// Clamp to edge
    ClampToEdge,
    /// Mirror the texture
    MirroredRepeat,
}

/// Lifecycle of the image behind a texture placeholder
#[derive(Debug, Clone)]
pub enum TextureState {
    /// Fetch still in flight (including retry waits)
    Pending,
    /// Image arrived and is ready for upload
    Loaded(Arc<ImageData>),
    /// All attempts failed; the surface stays untextured
    Failed,
}

#[derive(Debug)]
struct TextureSlot {
    url: String,
    state: TextureState,
    wrap_s: WrapMode,
    wrap_t: WrapMode,
    needs_update: bool,
}

/// Shared texture handle
///
/// Cloning is cheap and every clone observes the same slot, so the resolver can
/// return a material immediately while a background task fills the image in.
#[derive(Debug, Clone)]
pub struct Texture {
    slot: Arc<RwLock<TextureSlot>>,
}

impl Texture {
    /// Create a placeholder for an image that has not arrived yet
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(TextureSlot {
                url: url.into(),
                state: TextureState::Pending,
                wrap_s: WrapMode::default(),
                wrap_t: WrapMode::default(),
                needs_update: false,
            })),
        }
    }

    /// Source URL of the image
    pub fn url(&self) -> String {
        self.slot.read().url.clone()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> TextureState {
        self.slot.read().state.clone()
    }

    /// True while the fetch has neither succeeded nor failed
    pub fn is_pending(&self) -> bool {
        matches!(self.slot.read().state, TextureState::Pending)
    }

    /// True once the image has arrived
    pub fn is_loaded(&self) -> bool {
        matches!(self.slot.read().state, TextureState::Loaded(_))
    }

    /// True once the fetch has given up
    pub fn is_failed(&self) -> bool {
        matches!(self.slot.read().state, TextureState::Failed)
    }

    /// The loaded image, if any
    pub fn image(&self) -> Option<Arc<ImageData>> {
        match &self.slot.read().state {
            TextureState::Loaded(image) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Wrap modes on the S and T axes
    pub fn wrap(&self) -> (WrapMode, WrapMode) {
        let slot = self.slot.read();
        (slot.wrap_s, slot.wrap_t)
    }

    /// Set the wrap modes on both axes
    pub fn set_wrap(&self, wrap_s: WrapMode, wrap_t: WrapMode) {
        let mut slot = self.slot.write();
        slot.wrap_s = wrap_s;
        slot.wrap_t = wrap_t;
    }

    /// Whether a freshly arrived image still has to be uploaded
    pub fn needs_update(&self) -> bool {
        self.slot.read().needs_update
    }

    /// Acknowledge the upload of the current image
    pub fn mark_uploaded(&self) {
        self.slot.write().needs_update = false;
    }

    /// Whether both handles point at the same slot
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    pub(crate) fn fulfill(&self, image: Arc<ImageData>) {
        let mut slot = self.slot.write();
        slot.state = TextureState::Loaded(image);
        slot.needs_update = true;
    }

    pub(crate) fn fail(&self) {
        self.slot.write().state = TextureState::Failed;
    }
}
