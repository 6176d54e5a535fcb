use super::number::RouletteNumber;
use serde::{Deserialize, Serialize};

/// One live roulette table as reported by the casino feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouletteTable {
    pub table_id: String,
    pub table_name: String,
    pub vendor_name: String,
    /// Vendor's recent-results window, oldest first.
    pub results: Vec<RouletteNumber>,
    pub game_type: Option<String>,
}

/// Identifies the table the session follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub vendor: String,
    pub table_id: String,
}

impl TableKey {
    pub fn new(vendor: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            table_id: table_id.into(),
        }
    }
}

impl RouletteTable {
    pub fn key(&self) -> TableKey {
        TableKey::new(&self.vendor_name, &self.table_id)
    }

    pub fn matches(&self, key: &TableKey) -> bool {
        self.table_id == key.table_id && self.vendor_name == key.vendor
    }

    /// Raw signature of the results window. Two polls with the same
    /// signature carry no new spins.
    pub fn results_signature(&self) -> String {
        self.results
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Distinct vendor names in first-seen order.
pub fn vendors(tables: &[RouletteTable]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for table in tables {
        if !out.iter().any(|v| v == &table.vendor_name) {
            out.push(table.vendor_name.clone());
        }
    }
    out
}

pub fn tables_for_vendor<'a>(tables: &'a [RouletteTable], vendor: &str) -> Vec<&'a RouletteTable> {
    tables.iter().filter(|t| t.vendor_name == vendor).collect()
}

pub fn find_table<'a>(tables: &'a [RouletteTable], key: &TableKey) -> Option<&'a RouletteTable> {
    tables.iter().find(|t| t.matches(key))
}
