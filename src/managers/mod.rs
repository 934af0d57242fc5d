// Registry state managers
// Managers own or inspect tab state: window strips, the hidden pool, lookups, identity, closed tabs.

pub mod closed_tab_log;
pub mod hidden_tab_pool;
pub mod identity_bridge;
pub mod tab_locator;
pub mod tab_strip;
