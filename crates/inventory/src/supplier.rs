//! Supplier aggregate, owned by another service; item views pull its data in
//! as external data.

use serde::{Deserialize, Serialize};

use nostify_core::{AggregateId, AggregateRoot, DomainResult, PayloadFields};
use nostify_events::{Aggregate, Command, CommandRegistry, Event};

pub const CREATE_SUPPLIER: &str = "Create_Supplier";
pub const UPDATE_SUPPLIER: &str = "Update_Supplier";

#[derive(Debug, Clone)]
pub struct SupplierCommands {
    pub create: Command,
    pub update: Command,
}

impl SupplierCommands {
    pub fn new() -> DomainResult<Self> {
        Ok(Self {
            create: Command::create(CREATE_SUPPLIER)?,
            update: Command::update(UPDATE_SUPPLIER)?,
        })
    }

    pub fn register(&self, registry: &mut CommandRegistry) {
        registry
            .register(self.create.clone())
            .register(self.update.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: AggregateId,
    pub name: String,
    pub is_deleted: bool,
}

impl AggregateRoot for Supplier {
    fn id(&self) -> AggregateId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Aggregate for Supplier {
    const AGGREGATE_TYPE: &'static str = "supplier";

    fn empty(id: AggregateId) -> Self {
        Self {
            id,
            name: String::new(),
            is_deleted: false,
        }
    }

    fn required_fields(command: &Command) -> &'static [&'static str] {
        match command.name() {
            CREATE_SUPPLIER => &["name"],
            _ => &[],
        }
    }

    fn apply(&mut self, event: &Event) -> DomainResult<()> {
        if matches!(event.command().name(), CREATE_SUPPLIER | UPDATE_SUPPLIER) {
            PayloadFields::new(event.payload()).merge("name", &mut self.name)?;
        }
        Ok(())
    }
}
