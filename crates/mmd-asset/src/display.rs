/// Entry of a display frame, pointing at a bone or a morph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayElement {
    Bone(Option<usize>),
    Morph(Option<usize>),
}

/// Group of bones and morphs shown together in the editor UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub name: String,
    pub name_en: String,
    /// Special frames ("Root" and the expression frame) can't be removed.
    pub special: bool,
    pub elements: Vec<DisplayElement>,
}
