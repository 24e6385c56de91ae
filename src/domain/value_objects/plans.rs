use serde::{Deserialize, Serialize};

use crate::domain::entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanModel {
    pub id: i32,
    pub name: String,
    pub price_minor: i64,
    pub duration_months: i32,
    pub is_active: bool,
}

impl From<PlanEntity> for PlanModel {
    fn from(entity: PlanEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            price_minor: entity.price_minor,
            duration_months: entity.duration_months,
            is_active: entity.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertPlanModel {
    pub name: String,
    pub price_minor: i64,
    pub duration_months: i32,
}

impl InsertPlanModel {
    pub fn to_entity(&self) -> InsertPlanEntity {
        InsertPlanEntity {
            name: self.name.clone(),
            price_minor: self.price_minor,
            duration_months: self.duration_months,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlanModel {
    pub name: Option<String>,
    pub price_minor: Option<i64>,
    pub duration_months: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdatePlanModel {
    pub fn to_entity(&self) -> UpdatePlanEntity {
        UpdatePlanEntity {
            name: self.name.clone(),
            price_minor: self.price_minor,
            duration_months: self.duration_months,
            is_active: self.is_active,
        }
    }
}
