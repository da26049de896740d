//! Navigation: user intent (next / back / jump) filtered through the gate.

use super::action::WizardAction;
use super::gate::{can_advance, can_jump_to, can_retreat};
use super::store::WizardStore;
use super::step::WizardStep;

/// Why a navigation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationBlocked {
    /// The current step's prerequisites are not met (or it is terminal).
    Gated(WizardStep),
    /// Already on the first step.
    AtStart,
    /// Target lies ahead of the current step.
    AheadOfProgress(WizardStep),
}

impl std::fmt::Display for NavigationBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationBlocked::Gated(step) => write!(f, "cannot leave {step} yet"),
            NavigationBlocked::AtStart => write!(f, "already on the first step"),
            NavigationBlocked::AheadOfProgress(step) => {
                write!(f, "{step} has not been reached yet")
            }
        }
    }
}

/// Advance one step if the gate allows it.
pub fn next(store: &mut WizardStore) -> Result<WizardStep, NavigationBlocked> {
    let state = store.state();
    let current = state.current_step;
    let target = match current.next() {
        Some(step) if can_advance(state) => step,
        _ => return Err(NavigationBlocked::Gated(current)),
    };
    store.dispatch(WizardAction::SetStep(target));
    log::info!("wizard: {current} → {target}");
    Ok(target)
}

/// Go back one step.
pub fn prev(store: &mut WizardStore) -> Result<WizardStep, NavigationBlocked> {
    let state = store.state();
    let target = match state.current_step.prev() {
        Some(step) if can_retreat(state) => step,
        _ => return Err(NavigationBlocked::AtStart),
    };
    store.dispatch(WizardAction::SetStep(target));
    Ok(target)
}

/// Jump to an already-reached step.
pub fn jump_to(store: &mut WizardStore, target: WizardStep) -> Result<WizardStep, NavigationBlocked> {
    if !can_jump_to(store.state(), target) {
        return Err(NavigationBlocked::AheadOfProgress(target));
    }
    store.dispatch(WizardAction::SetStep(target));
    Ok(target)
}
