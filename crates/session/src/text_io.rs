//! Text side-channel capabilities
//!
//! The transmitter pulls characters from a [`TextSource`] one at a time as
//! text bit slots free up; the receiver pushes every decoded character into
//! a [`TextSink`]. Both are called synchronously from inside a transmit or
//! receive call and must not call back into the session.

/// Supplies characters to transmit
pub trait TextSource {
    /// Next character, or `None` when there is nothing to send right now
    fn next_char(&mut self) -> Option<char>;
}

/// Receives decoded characters
pub trait TextSink {
    fn put_char(&mut self, ch: char);
}

impl<F> TextSource for F
where
    F: FnMut() -> Option<char>,
{
    fn next_char(&mut self) -> Option<char> {
        self()
    }
}

impl<F> TextSink for F
where
    F: FnMut(char),
{
    fn put_char(&mut self, ch: char) {
        self(ch)
    }
}

/// Sends the same message over and over
#[derive(Debug, Clone)]
pub struct RepeatingText {
    chars: Vec<char>,
    pos: usize,
}

impl RepeatingText {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }
}

impl TextSource for RepeatingText {
    fn next_char(&mut self) -> Option<char> {
        let ch = *self.chars.get(self.pos)?;
        self.pos = (self.pos + 1) % self.chars.len();
        Some(ch)
    }
}
