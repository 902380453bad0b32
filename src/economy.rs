//! Money balance, settled in economy cycles.
//!
//! Each cycle credits the income and then charges every upkeep cost in turn,
//! never letting a single charge push the balance below zero.

use std::fmt;

use crate::error::SimError;

pub type IncomeProvider = Box<dyn FnMut() -> i64>;
pub type UpkeepProvider = Box<dyn FnMut() -> Vec<i64>>;

/// Result of one economy cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub income: i64,
    /// Money actually removed by upkeep after clamping at zero.
    pub upkeep_charged: i64,
    pub balance: i64,
}

pub struct EconomySimulation {
    available_money: i64,
    income_provider: Option<IncomeProvider>,
    upkeep_provider: Option<UpkeepProvider>,
}

impl EconomySimulation {
    pub fn new(initial_money: i64) -> Self {
        Self {
            available_money: initial_money,
            income_provider: None,
            upkeep_provider: None,
        }
    }

    pub fn with_income_provider(mut self, provider: impl FnMut() -> i64 + 'static) -> Self {
        self.income_provider = Some(Box::new(provider));
        self
    }

    pub fn with_upkeep_provider(mut self, provider: impl FnMut() -> Vec<i64> + 'static) -> Self {
        self.upkeep_provider = Some(Box::new(provider));
        self
    }

    pub fn available_money(&self) -> i64 {
        self.available_money
    }

    pub fn can_afford(&self, amount: i64) -> Result<bool, SimError> {
        if amount < 0 {
            return Err(SimError::invalid(format!(
                "cannot spend a negative amount of money ({amount})"
            )));
        }
        Ok(amount <= self.available_money)
    }

    pub fn spend_money(&mut self, amount: i64) -> Result<(), SimError> {
        if !self.can_afford(amount)? {
            return Err(SimError::InsufficientFunds {
                requested: amount,
                available: self.available_money,
            });
        }
        self.available_money -= amount;
        Ok(())
    }

    /// Credit money outside the regular cycle.
    pub fn add_income(&mut self, amount: i64) -> Result<(), SimError> {
        if amount < 0 {
            return Err(SimError::invalid(format!(
                "income must not be negative, got {amount}"
            )));
        }
        self.available_money = self.credited(amount)?;
        Ok(())
    }

    fn credited(&self, amount: i64) -> Result<i64, SimError> {
        self.available_money.checked_add(amount).ok_or_else(|| {
            SimError::invalid(format!(
                "crediting {amount} to a balance of {} overflows",
                self.available_money
            ))
        })
    }

    /// Run one cycle against the installed providers. A missing provider
    /// contributes nothing.
    ///
    /// `Game` does not install providers; it calls `settle` with its own
    /// income and upkeep each economy tick.
    pub fn tick(&mut self) -> Result<Settlement, SimError> {
        let income = self.income_provider.as_mut().map_or(0, |provider| provider());
        let upkeep = self
            .upkeep_provider
            .as_mut()
            .map(|provider| provider())
            .unwrap_or_default();
        self.settle(income, upkeep)
    }

    /// Run one cycle with explicit inputs. Upkeep costs are charged in the
    /// order given. Nothing changes if any input is negative or the income
    /// would overflow the balance.
    pub fn settle<I>(&mut self, income: i64, upkeep_costs: I) -> Result<Settlement, SimError>
    where
        I: IntoIterator<Item = i64>,
    {
        if income < 0 {
            return Err(SimError::invalid(format!(
                "income must not be negative, got {income}"
            )));
        }
        let costs: Vec<i64> = upkeep_costs.into_iter().collect();
        if let Some(cost) = costs.iter().find(|&&cost| cost < 0) {
            return Err(SimError::invalid(format!(
                "upkeep cost must not be negative, got {cost}"
            )));
        }

        let before_upkeep = self.credited(income)?;
        self.available_money = costs
            .into_iter()
            .fold(before_upkeep, |money, cost| money.saturating_sub(cost).max(0));

        Ok(Settlement {
            income,
            upkeep_charged: before_upkeep.saturating_sub(self.available_money),
            balance: self.available_money,
        })
    }
}

impl fmt::Debug for EconomySimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EconomySimulation")
            .field("available_money", &self.available_money)
            .field("income_provider", &self.income_provider.is_some())
            .field("upkeep_provider", &self.upkeep_provider.is_some())
            .finish()
    }
}
