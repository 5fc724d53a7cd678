//! StatusReporter trait - single-line on-screen readout

/// Pure text sink, replaced on every sampling step
pub trait StatusReporter: Send {
    fn set_text(&mut self, text: &str);
}
