//! The in-memory dataset tree: an ordered mapping from tag to data element,
//! whose sequence elements nest item datasets of the same type (§3 "Dataset").

use std::collections::BTreeMap;

use crate::header::{DataElement, Header};
use crate::tag::Tag;
use crate::value::Value;

/// An owned DICOM dataset: an ordered mapping from [`Tag`] to
/// [`DataElement`], ordered by the tag comparator (§3). Sequence elements
/// nest further `InMemDataSet` values for their items, making the whole
/// structure a finite tree whose internal nodes are SQ elements and whose
/// leaves are value-bearing elements.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct InMemDataSet {
    entries: BTreeMap<Tag, InMemElement>,
}

/// A data element whose nested sequence items are themselves
/// [`InMemDataSet`]s.
pub type InMemElement = DataElement<InMemDataSet>;

impl InMemDataSet {
    /// An empty dataset.
    pub fn new() -> Self {
        InMemDataSet::default()
    }

    /// Insert an element, replacing and returning any prior element with
    /// the same tag.
    pub fn insert(&mut self, element: InMemElement) -> Option<InMemElement> {
        self.entries.insert(element.tag(), element)
    }

    /// Look up an element by tag.
    pub fn get(&self, tag: Tag) -> Option<&InMemElement> {
        self.entries.get(&tag)
    }

    /// Remove an element by tag.
    pub fn remove(&mut self, tag: Tag) -> Option<InMemElement> {
        self.entries.remove(&tag)
    }

    /// The number of elements directly held by this dataset (not counting
    /// elements nested within sequences).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this dataset holds no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the dataset's elements in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &InMemElement> {
        self.entries.values()
    }

    /// Borrow a primitive-valued element's string representation.
    pub fn get_str(&self, tag: Tag) -> Option<Vec<&str>> {
        self.get(tag)?.value().primitive()?.strings()
    }

    /// Borrow a sequence element's items.
    pub fn get_sequence(&self, tag: Tag) -> Option<&[InMemDataSet]> {
        self.get(tag)?.value().items()
    }
}

impl<'a> IntoIterator for &'a InMemDataSet {
    type Item = &'a InMemElement;
    type IntoIter = std::collections::btree_map::Values<'a, Tag, InMemElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

impl FromIterator<InMemElement> for InMemDataSet {
    fn from_iter<T: IntoIterator<Item = InMemElement>>(iter: T) -> Self {
        let mut set = InMemDataSet::new();
        for element in iter {
            set.insert(element);
        }
        set
    }
}

/// A builder for an [`InMemDataSet`], chaining element insertions.
#[derive(Debug, Default)]
pub struct DataSetBuilder {
    set: InMemDataSet,
}

impl DataSetBuilder {
    /// Start a new, empty builder.
    pub fn new() -> Self {
        DataSetBuilder::default()
    }

    /// Insert an element and return the builder for chaining.
    pub fn with(mut self, element: InMemElement) -> Self {
        self.set.insert(element);
        self
    }

    /// Insert a sequence element with the given items.
    pub fn with_sequence(
        mut self,
        tag: Tag,
        items: Vec<InMemDataSet>,
        length: crate::length::Length,
    ) -> Self {
        let header = crate::header::DataElementHeader::new(tag, crate::vr::VR::SQ, length);
        self.set
            .insert(DataElement::new(header, Value::Sequence { items, length }));
        self
    }

    /// Finish building, returning the dataset.
    pub fn build(self) -> InMemDataSet {
        self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::DataElementHeader;
    use crate::value::PrimitiveValue;
    use crate::vr::VR;

    #[test]
    fn insert_and_get() {
        let mut set = InMemDataSet::new();
        let header = DataElementHeader::new(Tag(0x0008, 0x0005), VR::CS, 10u32);
        set.insert(DataElement::new(
            header,
            Value::Primitive(PrimitiveValue::from("ISO_IR 100")),
        ));
        assert_eq!(set.len(), 1);
        assert!(set.get(Tag(0x0008, 0x0005)).is_some());
        assert!(set.get(Tag(0x0008, 0x0006)).is_none());
    }

    #[test]
    fn iteration_is_tag_ordered() {
        let mut set = InMemDataSet::new();
        for (g, e) in [(0x0010, 0x0010), (0x0008, 0x0005), (0x0008, 0x0000)] {
            let header = DataElementHeader::new(Tag(g, e), VR::CS, 0u32);
            set.insert(DataElement::new(
                header,
                Value::Primitive(PrimitiveValue::Empty),
            ));
        }
        let tags: Vec<_> = set.iter().map(|e| e.tag()).collect();
        assert_eq!(
            tags,
            vec![Tag(0x0008, 0x0000), Tag(0x0008, 0x0005), Tag(0x0010, 0x0010)]
        );
    }
}
