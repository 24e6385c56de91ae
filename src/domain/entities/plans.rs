use diesel::prelude::*;

use crate::infrastructure::postgres::schema::plans;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans)]
pub struct PlanEntity {
    pub id: i32,
    pub name: String,
    pub price_minor: i64,
    pub duration_months: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plans)]
pub struct InsertPlanEntity {
    pub name: String,
    pub price_minor: i64,
    pub duration_months: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = plans)]
pub struct UpdatePlanEntity {
    pub name: Option<String>,
    pub price_minor: Option<i64>,
    pub duration_months: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdatePlanEntity {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price_minor.is_none()
            && self.duration_months.is_none()
            && self.is_active.is_none()
    }
}
