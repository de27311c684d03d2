//! `InventoryItemView`: item state joined with its supplier's name.

use serde::{Deserialize, Serialize};

use nostify_core::{AggregateId, AggregateRoot, DomainResult, PayloadFields};
use nostify_events::{Aggregate, Event, InitState, PROJECTION_INIT, Projection};

use crate::item::{CREATE_ITEM, DELETE_ITEM, InventoryItem, UPDATE_ITEM};
use crate::supplier::{CREATE_SUPPLIER, UPDATE_SUPPLIER};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    pub id: AggregateId,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub supplier_id: Option<AggregateId>,
    pub supplier_name: Option<String>,
    pub is_deleted: bool,
    #[serde(rename = "initialized", default)]
    pub init_state: InitState,
}

impl AggregateRoot for InventoryItemView {
    fn id(&self) -> AggregateId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Aggregate for InventoryItemView {
    const AGGREGATE_TYPE: &'static str = "inventoryItemView";

    fn empty(id: AggregateId) -> Self {
        Self {
            id,
            name: String::new(),
            sku: String::new(),
            quantity: 0,
            supplier_id: None,
            supplier_name: None,
            is_deleted: false,
            init_state: InitState::Uninitialized,
        }
    }

    fn apply(&mut self, event: &Event) -> DomainResult<()> {
        let fields = PayloadFields::new(event.payload());
        match event.command().name() {
            PROJECTION_INIT | CREATE_ITEM | UPDATE_ITEM => {
                fields.merge("name", &mut self.name)?;
                fields.merge("sku", &mut self.sku)?;
                fields.merge("quantity", &mut self.quantity)?;
                fields.merge("supplierId", &mut self.supplier_id)?;
                fields.merge("isDeleted", &mut self.is_deleted)?;
            }
            DELETE_ITEM => self.is_deleted = true,
            CREATE_SUPPLIER | UPDATE_SUPPLIER => {
                if let Some(name) = fields.get::<String>("name")? {
                    self.supplier_name = Some(name);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Projection for InventoryItemView {
    type Source = InventoryItem;

    fn init_state(&self) -> InitState {
        self.init_state
    }

    fn set_init_state(&mut self, state: InitState) {
        self.init_state = state;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use nostify_events::{EventFactory, init_event};

    use super::*;
    use crate::item::InventoryCommands;
    use crate::supplier::{Supplier, SupplierCommands};

    fn seeded_item(id: AggregateId, supplier: AggregateId) -> InventoryItem {
        InventoryItem {
            supplier_id: Some(supplier),
            name: "Bolt".into(),
            sku: "B-1".into(),
            quantity: 3,
            ..InventoryItem::empty(id)
        }
    }

    #[test]
    fn seeded_from_aggregate_state() {
        let id = AggregateId::new();
        let supplier = AggregateId::new();
        let mut view = InventoryItemView::empty(id);
        view.apply(&init_event(&seeded_item(id, supplier)).unwrap()).unwrap();

        assert_eq!(view.name, "Bolt");
        assert_eq!(view.quantity, 3);
        assert_eq!(view.supplier_id, Some(supplier));
        assert_eq!(view.supplier_name, None);
    }

    #[test]
    fn persisted_document_carries_initialized_flag() {
        let mut view = InventoryItemView::empty(AggregateId::new());
        view.set_init_state(InitState::Rehydrating);
        let doc = serde_json::to_value(&view).unwrap();
        assert_eq!(doc["initialized"], json!(false));
    }

    proptest! {
        /// Supplier data lands the same whether it arrives before or after the
        /// item's own events.
        #[test]
        fn external_and_item_events_commute(
            names in prop::collection::vec("[A-Za-z]{1,12}", 1..5),
            quantities in prop::collection::vec(0_i64..1000, 1..5),
            supplier_first in any::<bool>(),
        ) {
            let item_cmds = InventoryCommands::new().unwrap();
            let supplier_cmds = SupplierCommands::new().unwrap();
            let id = AggregateId::new();
            let supplier_id = AggregateId::new();
            let factory = EventFactory::new();

            let item_events: Vec<Event> = std::iter::once(init_event(&seeded_item(id, supplier_id)).unwrap())
                .chain(quantities.iter().map(|q| {
                    factory.create::<InventoryItem>(&item_cmds.update, id, json!({ "quantity": q })).unwrap()
                }))
                .collect();
            let supplier_events: Vec<Event> = names
                .iter()
                .map(|n| factory.create::<Supplier>(&supplier_cmds.update, supplier_id, json!({ "name": n })).unwrap())
                .collect();

            let mut expected = InventoryItemView::empty(id);
            for e in item_events.iter().chain(supplier_events.iter()) {
                expected.apply(e).unwrap();
            }

            let mut actual = InventoryItemView::empty(id);
            let ordered: Vec<&Event> = if supplier_first {
                supplier_events.iter().chain(item_events.iter()).collect()
            } else {
                item_events.iter().chain(supplier_events.iter()).collect()
            };
            for e in ordered {
                actual.apply(e).unwrap();
            }

            prop_assert_eq!(expected, actual);
        }
    }
}
