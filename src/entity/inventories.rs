use sea_orm::entity::prelude::*;

use super::types::{AdjustmentLog, ReservationLog};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;
pub const DEFAULT_REORDER_POINT: i32 = 10;
pub const DEFAULT_REORDER_QUANTITY: i32 = 20;
pub const DEFAULT_WAREHOUSE: &str = "Main Warehouse";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub variant_id: Uuid,
    pub quantity: i32,
    pub reserved: i32,
    pub low_stock_threshold: i32,
    pub reorder_point: i32,
    pub reorder_quantity: i32,
    pub warehouse_location: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub adjustment_log: AdjustmentLog,
    #[sea_orm(column_type = "JsonBinary")]
    pub reservation_log: ReservationLog,
    #[sea_orm(column_type = "JsonBinary")]
    pub release_log: ReservationLog,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::variants::Entity",
        from = "Column::VariantId",
        to = "super::variants::Column::Id"
    )]
    Variants,
}

impl Related<super::variants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn available(&self) -> i32 {
        (self.quantity - self.reserved).max(0)
    }

    pub fn is_low_stock(&self) -> bool {
        self.available() <= self.low_stock_threshold
    }

    pub fn needs_reorder(&self) -> bool {
        self.available() <= self.reorder_point
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available() <= 0
    }
}
