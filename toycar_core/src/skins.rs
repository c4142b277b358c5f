// toycar_core/src/skins.rs

//! Body-paint selection and application, independent of any renderer.

use crate::error::SkinError;

/// Cyclic cursor over a non-empty skin catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinSelector {
    count: usize,
    current: usize,
}

impl SkinSelector {
    pub fn new(count: usize, initial: usize) -> Result<Self, SkinError> {
        if count == 0 {
            return Err(SkinError::EmptyCatalog);
        }
        Ok(Self {
            count,
            current: initial.min(count - 1),
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.count;
        self.current
    }

    pub fn previous(&mut self) -> usize {
        self.current = (self.current + self.count - 1) % self.count;
        self.current
    }
}

/// What `SkinApplier::apply` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The skin went into `slot`. `fallback` is set when no slot matched the body
    /// material name and slot 0 was used instead.
    Applied {
        skin: usize,
        slot: usize,
        fallback: bool,
    },
    /// The body is hidden; the skin is applied on the next tracking-found event.
    Queued { skin: usize },
}

/// Puts a skin from the catalog onto the body's material slots.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinApplier {
    skins: Vec<String>,
    body_material_name: String,
    slots: Vec<String>,
    visible: bool,
    applied: bool,
    pending: Option<usize>,
}

impl SkinApplier {
    /// `slots` are the material names currently on the body renderer.
    pub fn new(
        skins: Vec<String>,
        body_material_name: impl Into<String>,
        slots: Vec<String>,
        visible: bool,
    ) -> Result<Self, SkinError> {
        if skins.is_empty() {
            return Err(SkinError::EmptyCatalog);
        }
        if slots.is_empty() {
            return Err(SkinError::NoMaterialSlots);
        }
        Ok(Self {
            skins,
            body_material_name: body_material_name.into(),
            slots,
            visible,
            applied: false,
            pending: None,
        })
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn skin_name(&self, index: usize) -> &str {
        &self.skins[index.min(self.skins.len() - 1)]
    }

    /// Applies `index`, clamped into the catalog.
    pub fn apply(&mut self, index: usize) -> ApplyOutcome {
        let skin = index.min(self.skins.len() - 1);
        if !self.visible {
            self.pending = Some(skin);
            return ApplyOutcome::Queued { skin };
        }

        let matched = self
            .slots
            .iter()
            .position(|slot| slot.contains(&self.body_material_name));
        let (slot, fallback) = match matched {
            Some(slot) => (slot, false),
            None => (0, true),
        };
        self.slots[slot] = self.skins[skin].clone();
        self.applied = true;
        ApplyOutcome::Applied {
            skin,
            slot,
            fallback,
        }
    }

    /// Shows the body and applies the queued skin, or `preferred` if nothing is queued.
    pub fn on_tracking_found(&mut self, preferred: usize) -> ApplyOutcome {
        self.visible = true;
        let skin = self.pending.take().unwrap_or(preferred);
        self.apply(skin)
    }

    pub fn on_tracking_lost(&mut self) {
        self.visible = false;
        self.applied = false;
    }
}
