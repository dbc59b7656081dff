// SPDX-License-Identifier: GPL-3.0-only
//! Global hotkey registration table
//!
//! The registrar tracks which actions are currently bound and drives a
//! [`HotkeyBackend`] that talks to the OS. Every binding moves through
//! `Unbound -> Registered -> Unbound`; a conflict is reported to the caller
//! and never retried.

use std::collections::BTreeMap;

use crate::error::HotkeyError;

use super::binding::{HotkeyAction, HotkeyBinding, Modifiers};
use super::keys::KeyCode;

/// `MOD_NOREPEAT`: holding the combination down fires once
pub const MOD_NOREPEAT: u32 = 0x4000;

/// Native side of hotkey registration
pub trait HotkeyBackend {
    /// Register `id` for the combination. `modifiers` already carries
    /// [`MOD_NOREPEAT`].
    fn register(&mut self, id: i32, modifiers: Modifiers, key: KeyCode) -> Result<(), HotkeyError>;

    fn unregister(&mut self, id: i32);

    /// Tear down the native message target. Called once, after every id was
    /// unregistered.
    fn shutdown(&mut self);
}

/// Outcome of [`HotkeyRegistrar::apply_bindings`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub registered: Vec<HotkeyAction>,
    pub failed: Vec<(HotkeyAction, HotkeyError)>,
}

/// Owns the registration table for one message target
pub struct HotkeyRegistrar<B: HotkeyBackend> {
    backend: B,
    registered: BTreeMap<HotkeyAction, HotkeyBinding>,
    disposed: bool,
}

impl<B: HotkeyBackend> HotkeyRegistrar<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registered: BTreeMap::new(),
            disposed: false,
        }
    }

    /// Register one binding, replacing any registration of the same action
    ///
    /// A binding without a key fails with [`HotkeyError::NoKey`] before the
    /// backend is touched.
    pub fn register(&mut self, binding: &HotkeyBinding) -> Result<(), HotkeyError> {
        let Some(key) = binding.combo.key else {
            return Err(HotkeyError::NoKey);
        };

        self.unregister(binding.action);

        let modifiers = Modifiers(binding.combo.modifiers.bits() | MOD_NOREPEAT);
        self.backend.register(binding.registration_id(), modifiers, key)?;

        info!("Registered hotkey {} for {}", binding.combo, binding.action);
        self.registered.insert(binding.action, *binding);
        Ok(())
    }

    /// Drop the registration of `action`, if any
    pub fn unregister(&mut self, action: HotkeyAction) {
        if self.registered.remove(&action).is_some() {
            self.backend.unregister(action.registration_id());
            debug!("Unregistered hotkey for {}", action);
        }
    }

    /// Replace every registration with `bindings`
    ///
    /// Each binding is registered independently. Unbound entries are skipped
    /// and appear in neither list of the report.
    pub fn apply_bindings<'a>(
        &mut self,
        bindings: impl IntoIterator<Item = &'a HotkeyBinding>,
    ) -> ApplyReport {
        self.unregister_all();

        let mut report = ApplyReport::default();
        for binding in bindings {
            if !binding.is_valid() {
                continue;
            }
            match self.register(binding) {
                Ok(()) => report.registered.push(binding.action),
                Err(err) => {
                    warn!("Hotkey {} for {} not registered: {}", binding.combo, binding.action, err);
                    report.failed.push((binding.action, err));
                }
            }
        }
        report
    }

    pub fn unregister_all(&mut self) {
        let actions: Vec<_> = self.registered.keys().copied().collect();
        for action in actions {
            self.unregister(action);
        }
    }

    pub fn is_registered(&self, action: HotkeyAction) -> bool {
        self.registered.contains_key(&action)
    }

    /// Binding currently registered for `action`
    pub fn binding(&self, action: HotkeyAction) -> Option<&HotkeyBinding> {
        self.registered.get(&action)
    }

    /// Map a native registration id back to a live action
    pub fn resolve(&self, id: i32) -> Option<HotkeyAction> {
        HotkeyAction::from_registration_id(id).filter(|action| self.is_registered(*action))
    }

    /// Unregister everything and release the message target
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.unregister_all();
        self.backend.shutdown();
        self.disposed = true;
    }
}

impl<B: HotkeyBackend> Drop for HotkeyRegistrar<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
