use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Wood,
    Plank,
    Fish,
    Wool,
    Clothes,
    Potato,
    Schnapps,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Wood,
        ResourceType::Plank,
        ResourceType::Fish,
        ResourceType::Wool,
        ResourceType::Clothes,
        ResourceType::Potato,
        ResourceType::Schnapps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Wood => "wood",
            ResourceType::Plank => "plank",
            ResourceType::Fish => "fish",
            ResourceType::Wool => "wool",
            ResourceType::Clothes => "clothes",
            ResourceType::Potato => "potato",
            ResourceType::Schnapps => "schnapps",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared resource stock. Every resource type has a counter from the start
/// and no counter ever drops below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    stock: BTreeMap<ResourceType, i64>,
}

impl Warehouse {
    pub fn new() -> Self {
        Self {
            stock: ResourceType::ALL.iter().map(|&kind| (kind, 0)).collect(),
        }
    }

    pub fn available_amount(&self, resource: ResourceType) -> i64 {
        self.stock.get(&resource).copied().unwrap_or(0)
    }

    pub fn is_available(&self, resource: ResourceType, amount: i64) -> Result<bool, SimError> {
        check_amount(resource, amount)?;
        Ok(amount <= self.available_amount(resource))
    }

    /// Debit `amount`. Fails without touching the stock when it is short.
    pub fn pick(&mut self, resource: ResourceType, amount: i64) -> Result<(), SimError> {
        check_amount(resource, amount)?;
        let available = self.available_amount(resource);
        if amount > available {
            return Err(SimError::InsufficientResources {
                resource,
                requested: amount,
                available,
            });
        }
        self.stock.insert(resource, available - amount);
        Ok(())
    }

    /// Credit `amount`. Fails without touching the stock when the counter
    /// would overflow.
    pub fn store(&mut self, resource: ResourceType, amount: i64) -> Result<(), SimError> {
        check_amount(resource, amount)?;
        let available = self.available_amount(resource);
        let total = available.checked_add(amount).ok_or_else(|| {
            SimError::invalid(format!(
                "storing {amount} {resource} on top of {available} overflows the stock"
            ))
        })?;
        self.stock.insert(resource, total);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, i64)> + '_ {
        self.stock.iter().map(|(&kind, &amount)| (kind, amount))
    }
}

impl Default for Warehouse {
    fn default() -> Self {
        Self::new()
    }
}

fn check_amount(resource: ResourceType, amount: i64) -> Result<(), SimError> {
    if amount < 0 {
        return Err(SimError::invalid(format!(
            "amount of {resource} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
