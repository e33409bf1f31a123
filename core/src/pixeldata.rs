//! The encapsulated pixel data container (§3, §4.2 "Encapsulated pixel data").

/// A distinguished OB value holding the fragments of encapsulated
/// (compressed) pixel data, plus the basic offset table that relates
/// fragments to frames.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PixelFragmentSequence {
    /// The basic offset table: one entry per frame, each the byte offset of
    /// the frame's first fragment measured from the first byte after the
    /// offset-table item. Empty in fragments-only mode.
    offset_table: Vec<u32>,
    /// The data fragments, in encounter order, each retained verbatim.
    fragments: Vec<Vec<u8>>,
}

impl PixelFragmentSequence {
    /// Build a pixel fragment sequence in compressed-frames mode, with an
    /// explicit basic offset table.
    pub fn with_offset_table(offset_table: Vec<u32>, fragments: Vec<Vec<u8>>) -> Self {
        PixelFragmentSequence {
            offset_table,
            fragments,
        }
    }

    /// Build a pixel fragment sequence in fragments-only mode (empty offset
    /// table).
    pub fn fragments_only(fragments: Vec<Vec<u8>>) -> Self {
        PixelFragmentSequence {
            offset_table: Vec::new(),
            fragments,
        }
    }

    /// Whether this container uses the fragments-only regime (no basic
    /// offset table).
    pub fn is_fragments_only(&self) -> bool {
        self.offset_table.is_empty()
    }

    /// The basic offset table entries (frame start byte offsets), empty in
    /// fragments-only mode.
    pub fn offset_table(&self) -> &[u32] {
        &self.offset_table
    }

    /// The data fragments.
    pub fn fragments(&self) -> &[Vec<u8>] {
        &self.fragments
    }

    /// Consume this value, returning its fragments.
    pub fn into_fragments(self) -> Vec<Vec<u8>> {
        self.fragments
    }

    /// The set of byte offsets (into the concatenated fragment stream, not
    /// counting item headers) at which a frame begins, as derived from the
    /// basic offset table. Empty when in fragments-only mode: frame
    /// boundaries then coincide with fragment boundaries one-to-one.
    pub fn frame_starts(&self) -> &[u32] {
        &self.offset_table
    }
}
