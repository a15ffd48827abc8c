/// Collapses redraw requests: however many arrive before the frame runs, one frame runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedrawState {
    #[default]
    Idle,
    Pending,
}

impl RedrawState {
    /// Marks a redraw as pending. Returns `true` only when nothing was pending yet, i.e. when
    /// the caller should actually ask the window for a redraw.
    pub fn request(&mut self) -> bool {
        match self {
            RedrawState::Idle => {
                *self = RedrawState::Pending;
                true
            }
            RedrawState::Pending => false,
        }
    }

    /// Called when the frame runs. Returns whether a request was pending.
    pub fn take(&mut self) -> bool {
        std::mem::take(self) == RedrawState::Pending
    }

    pub fn is_pending(&self) -> bool {
        *self == RedrawState::Pending
    }

    /// Requests a redraw from `target` unless one is already pending. With no target nothing
    /// is recorded, so the first request once a target exists still reaches it.
    pub fn request_on<W: ?Sized>(&mut self, target: Option<&W>, send: impl FnOnce(&W)) -> bool {
        let Some(target) = target else {
            return false;
        };
        if self.request() {
            send(target);
            true
        } else {
            false
        }
    }
}
