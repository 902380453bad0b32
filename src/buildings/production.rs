use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ProductionParams;
use crate::error::SimError;
use crate::warehouse::{ResourceType, Warehouse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionState {
    Idle,
    Producing,
}

/// Output of a finished production cycle, to be stored by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedResource {
    pub resource: ResourceType,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionBuilding {
    upkeep_cost: i64,
    generation_interval: u32,
    output_resource: ResourceType,
    output_count: i64,
    input_resources: Vec<ResourceType>,
    efficiency: f32,
    progress: f32,
    state: ProductionState,
}

impl ProductionBuilding {
    pub fn new(upkeep_cost: i64, params: &ProductionParams, efficiency: f32) -> Self {
        Self {
            upkeep_cost,
            generation_interval: params.generation_interval,
            output_resource: params.output_resource,
            output_count: params.output_count,
            input_resources: params.input_resources.clone(),
            efficiency,
            progress: 0.0,
            state: ProductionState::Idle,
        }
    }

    pub fn upkeep_cost(&self) -> i64 {
        self.upkeep_cost
    }

    pub fn generation_interval(&self) -> u32 {
        self.generation_interval
    }

    pub fn output_resource(&self) -> ResourceType {
        self.output_resource
    }

    pub fn output_count(&self) -> i64 {
        self.output_count
    }

    pub fn input_resources(&self) -> &[ResourceType] {
        &self.input_resources
    }

    pub fn efficiency(&self) -> f32 {
        self.efficiency
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn state(&self) -> ProductionState {
        self.state
    }

    /// One tick of the production cycle.
    ///
    /// An idle building starts a cycle when every input is in stock, consuming
    /// one unit per input and seeding the progress with its efficiency. A
    /// producing building adds its efficiency and finishes once the progress
    /// reaches the interval. A building with zero efficiency still starts
    /// cycles, it just never finishes them.
    pub fn advance(
        &mut self,
        warehouse: &mut Warehouse,
    ) -> Result<Option<ProducedResource>, SimError> {
        match self.state {
            ProductionState::Producing => {
                self.progress += self.efficiency;
                let interval = self.generation_interval as f32;
                if self.progress >= interval {
                    self.progress -= interval;
                    self.state = ProductionState::Idle;
                    return Ok(Some(ProducedResource {
                        resource: self.output_resource,
                        amount: self.output_count,
                    }));
                }
                Ok(None)
            }
            ProductionState::Idle => {
                if !self.inputs_available(warehouse)? {
                    return Ok(None);
                }
                for &resource in &self.input_resources {
                    warehouse.pick(resource, 1)?;
                }
                self.progress = self.efficiency;
                self.state = ProductionState::Producing;
                Ok(None)
            }
        }
    }

    // Repeated inputs are checked against their combined demand.
    fn inputs_available(&self, warehouse: &Warehouse) -> Result<bool, SimError> {
        let mut demand: BTreeMap<ResourceType, i64> = BTreeMap::new();
        for &resource in &self.input_resources {
            *demand.entry(resource).or_insert(0) += 1;
        }
        for (resource, amount) in demand {
            if !warehouse.is_available(resource, amount)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
