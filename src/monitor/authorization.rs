/// Edge reported by [`AuthorizationWatch::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationChange {
    Revoked,
    Restored,
}

/// Tracks usage authorization across ticks so a revocation is reported once,
/// not once per skipped tick.
#[derive(Debug, Default)]
pub struct AuthorizationWatch {
    revoked: bool,
}

impl AuthorizationWatch {
    pub fn update(&mut self, granted: bool) -> Option<AuthorizationChange> {
        match (self.revoked, granted) {
            (false, false) => {
                self.revoked = true;
                Some(AuthorizationChange::Revoked)
            }
            (true, true) => {
                self.revoked = false;
                Some(AuthorizationChange::Restored)
            }
            (false, true) | (true, false) => None,
        }
    }
}
