/// Lifecycle of the render loop.
///
/// The only transition is `Running -> ShuttingDown`; there is no way back.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RunState {
    #[default]
    Running,
    ShuttingDown,
}

impl RunState {
    /// State after a close request (Escape, OS close, app exit, fatal error).
    #[must_use]
    pub fn close(self) -> Self {
        RunState::ShuttingDown
    }

    #[inline]
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}
