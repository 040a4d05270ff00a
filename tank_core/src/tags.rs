//! Device label classification.
//!
//! A label is a list of space-separated tags; roles are read from tag
//! membership, never from substrings. `"Tank Control Lefty"` is not a left
//! lever and `"Unreversed"` does not reverse anything.

/// Tag shared by every device of the tank.
pub const FAMILY: &str = "Tank";
/// Marks a control lever hinge.
pub const CONTROL: &str = "Control";
/// Marks a drive rotor.
pub const DRIVE: &str = "Drive";
/// Marks a status panel.
pub const LCD: &str = "LCD";
pub const LEFT: &str = "Left";
pub const RIGHT: &str = "Right";
pub const GEAR: &str = "Gear";
/// Inverts the sign of a lever.
pub const REVERSED: &str = "Reversed";

/// True iff every tag in `required` is a whole token of `label`.
/// Case-sensitive; an empty `required` matches everything.
pub fn matches(label: &str, required: &[&str]) -> bool {
    required.iter().all(|tag| has_token(label, tag))
}

/// True iff `token` is one of the whitespace-separated tags of `label`.
pub fn has_token(label: &str, token: &str) -> bool {
    label.split_whitespace().any(|t| t == token)
}

/// Parsed label, for callers that test several tags against the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Label<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            tokens: raw.split_whitespace().collect(),
        }
    }

    pub fn has(&self, token: &str) -> bool {
        self.tokens.contains(&token)
    }
}
