#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskLifecycle {
    #[default]
    Uninitialized,
    Active,
}

impl MaskLifecycle {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

pub fn can_transition(from: MaskLifecycle, to: MaskLifecycle) -> bool {
    matches!(
        (from, to),
        (MaskLifecycle::Uninitialized, MaskLifecycle::Active)
            | (MaskLifecycle::Active, MaskLifecycle::Uninitialized)
    )
}
