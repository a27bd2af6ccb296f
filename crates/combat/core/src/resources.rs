//! Resource pools and the reservation ledger.
//!
//! Every combat action may declare costs against an actor's consumable
//! pools. Reservation is all-or-nothing: either every listed cost is
//! deducted in one step, or nothing changes and the first deficient
//! resource is reported. There is no refund path; a miss keeps the cost
//! spent unless the action's commit policy says otherwise.

use std::fmt;

use strum::{Display, EnumString};
use thiserror::Error;

/// Consumable combat resources tracked per actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    Health,
    Mana,
    Stamina,
}

/// Integer resource meter with the invariant `0 <= current <= maximum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    /// Full meter at the given maximum.
    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.maximum
    }
}

impl fmt::Display for ResourceMeter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.maximum)
    }
}

/// Per-actor resource pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub stamina: ResourceMeter,
}

impl ResourcePool {
    pub fn new(health: ResourceMeter, mana: ResourceMeter, stamina: ResourceMeter) -> Self {
        Self {
            health,
            mana,
            stamina,
        }
    }

    /// Full pools at the given maximums.
    pub fn full(health: u32, mana: u32, stamina: u32) -> Self {
        Self::new(
            ResourceMeter::full(health),
            ResourceMeter::full(mana),
            ResourceMeter::full(stamina),
        )
    }

    pub fn meter(&self, kind: ResourceKind) -> ResourceMeter {
        match kind {
            ResourceKind::Health => self.health,
            ResourceKind::Mana => self.mana,
            ResourceKind::Stamina => self.stamina,
        }
    }

    pub fn meter_mut(&mut self, kind: ResourceKind) -> &mut ResourceMeter {
        match kind {
            ResourceKind::Health => &mut self.health,
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::Stamina => &mut self.stamina,
        }
    }
}

/// How a declared cost amount is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostBasis {
    /// Flat amount.
    Fixed,
    /// Percentage of the resource's maximum, recomputed at reservation time.
    PercentOfMax,
}

/// A single resource cost declared by an action definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub kind: ResourceKind,
    pub basis: CostBasis,
    pub amount: u32,
}

impl ResourceCost {
    pub fn fixed(kind: ResourceKind, amount: u32) -> Self {
        Self {
            kind,
            basis: CostBasis::Fixed,
            amount,
        }
    }

    /// Percentage-of-maximum cost, the stock content's default.
    pub fn percent(kind: ResourceKind, amount: u32) -> Self {
        Self {
            kind,
            basis: CostBasis::PercentOfMax,
            amount,
        }
    }

    /// Concrete amount this cost withdraws from the given pools.
    pub fn cost_for(&self, pool: &ResourcePool) -> u32 {
        match self.basis {
            CostBasis::Fixed => self.amount,
            CostBasis::PercentOfMax => self.amount * pool.meter(self.kind).maximum / 100,
        }
    }
}

/// Reservation failure; nothing has been deducted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough {resource} ({available} of {required} required)")]
    Insufficient {
        resource: ResourceKind,
        required: u32,
        available: u32,
    },
}

/// Atomically check and deduct every listed cost.
///
/// Costs against the same resource are summed first, so a definition that
/// lists a kind twice is checked against the combined total. The check pass
/// fails on the first deficient resource (in cost order) without touching
/// anything; only after all checks pass is anything withdrawn.
pub fn reserve(pool: &mut ResourcePool, costs: &[ResourceCost]) -> Result<(), LedgerError> {
    // Totals per kind, in first-appearance order. Concrete amounts depend
    // only on the meters' maximums, which deduction never changes, so one
    // pass up front is sound.
    let mut totals: Vec<(ResourceKind, u32)> = Vec::with_capacity(costs.len());
    for cost in costs {
        let required = cost.cost_for(pool);
        match totals.iter_mut().find(|(kind, _)| *kind == cost.kind) {
            Some((_, total)) => *total += required,
            None => totals.push((cost.kind, required)),
        }
    }

    for &(resource, required) in &totals {
        let available = pool.meter(resource).current;
        if available < required {
            return Err(LedgerError::Insufficient {
                resource,
                required,
                available,
            });
        }
    }

    for (kind, required) in totals {
        pool.meter_mut(kind).current -= required;
    }
    Ok(())
}

/// Clamped instantaneous adjustment of a resource pool.
///
/// Positive amounts heal, negative amounts damage. Returns the delta that
/// was actually applied, which may be smaller in magnitude than requested
/// when the meter hits either bound; callers must not assume full
/// application.
pub fn apply_instant(pool: &mut ResourcePool, kind: ResourceKind, amount: i64) -> i64 {
    let meter = pool.meter_mut(kind);
    let before = i64::from(meter.current);
    let after = (before + amount).clamp(0, i64::from(meter.maximum));
    meter.current = after as u32;
    after - before
}
