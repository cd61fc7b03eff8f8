use crate::controllers::interactive::events::input_event::InputEvent;

/// Event source injected by the host environment.
pub trait HostEvents {
    /// Takes every event received since the previous call, oldest first.
    fn drain(&mut self) -> Vec<InputEvent>;
}
