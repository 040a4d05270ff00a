//! Test and helper sinks for tank_core

/// A text sink that drops everything; the default controller surface and log
/// when the host does not provide one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl tank_traits::TextSink for NullSink {
    fn write_text(&mut self, _text: &str, _append: bool) -> Result<(), tank_traits::PortError> {
        Ok(())
    }
}
