use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use nostify_core::{
    AggregateId, AggregateRoot, DomainResult, MaxLength, PayloadFields, Validate, ValidationRules,
};
use nostify_events::{Aggregate, Command, CommandRegistry, Event};

pub const CREATE_ITEM: &str = "Create_InventoryItem";
pub const UPDATE_ITEM: &str = "Update_InventoryItem";
pub const ADJUST_STOCK: &str = "AdjustStock_InventoryItem";
pub const DELETE_ITEM: &str = "Delete_InventoryItem";

/// Config key for the SKU length limit.
pub const SKU_MAX_LENGTH_KEY: &str = "Inventory:SkuMaxLength";

/// Shared command instances for the inventory item aggregate.
#[derive(Debug, Clone)]
pub struct InventoryCommands {
    pub create: Command,
    pub update: Command,
    pub adjust_stock: Command,
    pub delete: Command,
}

impl InventoryCommands {
    pub fn new() -> DomainResult<Self> {
        Ok(Self {
            create: Command::create(CREATE_ITEM)?,
            update: Command::update(UPDATE_ITEM)?,
            adjust_stock: Command::update(ADJUST_STOCK)?,
            delete: Command::without_payload(DELETE_ITEM)?,
        })
    }

    pub fn register(&self, registry: &mut CommandRegistry) {
        registry
            .register(self.create.clone())
            .register(self.update.clone())
            .register(self.adjust_stock.clone())
            .register(self.delete.clone());
    }
}

/// Aggregate root: InventoryItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: AggregateId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub supplier_id: Option<AggregateId>,
    pub is_deleted: bool,
}

impl AggregateRoot for InventoryItem {
    fn id(&self) -> AggregateId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Aggregate for InventoryItem {
    const AGGREGATE_TYPE: &'static str = "inventoryItem";

    fn empty(id: AggregateId) -> Self {
        Self {
            id,
            name: String::new(),
            sku: String::new(),
            description: None,
            quantity: 0,
            supplier_id: None,
            is_deleted: false,
        }
    }

    fn required_fields(command: &Command) -> &'static [&'static str] {
        match command.name() {
            CREATE_ITEM => &["name", "sku"],
            _ => &[],
        }
    }

    fn apply(&mut self, event: &Event) -> DomainResult<()> {
        let fields = PayloadFields::new(event.payload());
        match event.command().name() {
            CREATE_ITEM | UPDATE_ITEM => {
                fields.merge("name", &mut self.name)?;
                fields.merge("sku", &mut self.sku)?;
                fields.merge("description", &mut self.description)?;
                fields.merge("quantity", &mut self.quantity)?;
                fields.merge("supplierId", &mut self.supplier_id)?;
            }
            ADJUST_STOCK => {
                if let Some(delta) = fields.get::<i64>("delta")? {
                    self.quantity += delta;
                }
            }
            DELETE_ITEM => self.is_deleted = true,
            _ => {}
        }
        Ok(())
    }
}

static ITEM_RULES: LazyLock<ValidationRules> = LazyLock::new(|| {
    ValidationRules::new()
        .max_length("name", MaxLength::Literal(64))
        .max_length("sku", MaxLength::config_key(SKU_MAX_LENGTH_KEY))
        .max_length("description", MaxLength::Default)
});

impl Validate for InventoryItem {
    fn validation_rules() -> &'static ValidationRules {
        &ITEM_RULES
    }

    fn text_value(&self, property: &str) -> Option<&str> {
        match property {
            "name" => Some(&self.name),
            "sku" => Some(&self.sku),
            "description" => self.description.as_deref(),
            _ => None,
        }
    }
}
