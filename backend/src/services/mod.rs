//! Business logic services for the Food Logistics Management Platform

pub mod aggregator;
pub mod allocator;
pub mod catalog;
pub mod depletion;
pub mod ledger;
pub mod menu;
pub mod reconciler;
pub mod units;
pub mod withdrawal;

pub use catalog::ProductCatalogService;
pub use depletion::DepletionEngine;
pub use ledger::LedgerService;
pub use menu::MenuService;
pub use reconciler::ReconciliationService;
pub use units::UnitRegistryService;
pub use withdrawal::WithdrawalService;
