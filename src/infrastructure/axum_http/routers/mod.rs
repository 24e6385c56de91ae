pub mod payments;
pub mod plans;
pub mod renewals;
pub mod subscriptions;
