//! Ordered pick-list accumulation.

use crate::catalog::{Catalog, CatalogResult};
use crate::models::PickListItem;

/// Accumulates pick-list lines, merging repeated parts in first-seen order.
pub struct PickListBuilder<'a> {
    catalog: &'a Catalog,
    items: Vec<PickListItem>,
}

impl<'a> PickListBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            items: Vec::new(),
        }
    }

    /// Add `quantity` of a part. Zero quantities are ignored.
    pub fn add(&mut self, part: &str, quantity: u32) -> CatalogResult<&mut Self> {
        self.add_with_note(part, quantity, None)
    }

    /// Add a part with an optional note; the first note for a part wins.
    pub fn add_with_note(
        &mut self,
        part: &str,
        quantity: u32,
        note: Option<String>,
    ) -> CatalogResult<&mut Self> {
        if quantity == 0 {
            return Ok(self);
        }

        if let Some(existing) = self.items.iter_mut().find(|item| item.part == part) {
            existing.quantity += quantity;
            if existing.note.is_none() {
                existing.note = note;
            }
            return Ok(self);
        }

        let component = self.catalog.component(part)?;
        self.items.push(PickListItem {
            part: component.part.clone(),
            description: component.description.clone(),
            quantity,
            location: component.location.clone(),
            note,
        });
        Ok(self)
    }

    pub fn build(self) -> Vec<PickListItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_repeated_parts() {
        let catalog = Catalog::kelp();
        let mut builder = PickListBuilder::new(&catalog);
        builder.add("Box_01", 1).unwrap();
        builder.add("Bottle_02", 1).unwrap();
        builder.add("Box_01", 2).unwrap();

        let items = builder.build();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].part, "Box_01");
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].location, "Shelf A5");
    }

    #[test]
    fn test_zero_quantity_skipped() {
        let catalog = Catalog::kelp();
        let mut builder = PickListBuilder::new(&catalog);
        builder.add("Pack_PFAS", 0).unwrap();
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_unknown_part_is_an_error() {
        let catalog = Catalog::kelp();
        let mut builder = PickListBuilder::new(&catalog);
        assert!(builder.add("Bottle_99", 1).is_err());
    }

    #[test]
    fn test_first_note_wins() {
        let catalog = Catalog::kelp();
        let mut builder = PickListBuilder::new(&catalog);
        builder
            .add_with_note("Bottle_GenChem", 1, Some("shared".into()))
            .unwrap();
        builder
            .add_with_note("Bottle_GenChem", 1, Some("other".into()))
            .unwrap();

        let items = builder.build();
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].note.as_deref(), Some("shared"));
    }
}
