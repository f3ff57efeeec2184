//! Storage seam for deal records.
//!
//! The engine never touches storage. Collaborators load deals through
//! [`DealRepository`] and hand plain values to the calculators.

use std::collections::BTreeMap;
use std::sync::RwLock;

use log::{debug, warn};
use uuid::Uuid;

use crate::deal::VehicleDeal;
use crate::error::CarFinanceError;
use crate::CarFinanceResult;

/// Trait for deal storage operations
pub trait DealRepository: Send + Sync {
    /// All stored deals, ordered by id.
    fn list(&self) -> CarFinanceResult<Vec<VehicleDeal>>;
    fn get(&self, id: &str) -> CarFinanceResult<VehicleDeal>;
    /// Inserts or replaces by id. A deal with an empty id is given a new one.
    fn save(&self, deal: VehicleDeal) -> CarFinanceResult<VehicleDeal>;
    fn delete(&self, id: &str) -> CarFinanceResult<VehicleDeal>;
}

/// Process-local repository, mostly for tests and single-session tools.
#[derive(Debug, Default)]
pub struct InMemoryDealRepository {
    deals: RwLock<BTreeMap<String, VehicleDeal>>,
}

fn poisoned<T>(_: T) -> CarFinanceError {
    warn!("deal store lock poisoned");
    CarFinanceError::Repository("deal store lock poisoned".into())
}

impl InMemoryDealRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deals(deals: impl IntoIterator<Item = VehicleDeal>) -> CarFinanceResult<Self> {
        let repo = Self::new();
        for deal in deals {
            repo.save(deal)?;
        }
        Ok(repo)
    }
}

impl DealRepository for InMemoryDealRepository {
    fn list(&self) -> CarFinanceResult<Vec<VehicleDeal>> {
        let deals = self.deals.read().map_err(poisoned)?;
        Ok(deals.values().cloned().collect())
    }

    fn get(&self, id: &str) -> CarFinanceResult<VehicleDeal> {
        let deals = self.deals.read().map_err(poisoned)?;
        deals
            .get(id)
            .cloned()
            .ok_or_else(|| CarFinanceError::NotFound(id.to_string()))
    }

    fn save(&self, mut deal: VehicleDeal) -> CarFinanceResult<VehicleDeal> {
        let mut deals = self.deals.write().map_err(poisoned)?;
        if deal.id.trim().is_empty() {
            deal.id = Uuid::new_v4().to_string();
        }
        debug!("saving deal '{}'", deal.id);
        deals.insert(deal.id.clone(), deal.clone());
        Ok(deal)
    }

    fn delete(&self, id: &str) -> CarFinanceResult<VehicleDeal> {
        let mut deals = self.deals.write().map_err(poisoned)?;
        debug!("deleting deal '{id}'");
        deals
            .remove(id)
            .ok_or_else(|| CarFinanceError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deal(id: &str) -> VehicleDeal {
        VehicleDeal {
            id: id.to_string(),
            negotiated_price: dec!(20000),
            apr: dec!(0.05),
            term_length: 48,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_assigns_id_when_missing() {
        let repo = InMemoryDealRepository::new();
        let first = repo.save(deal("")).unwrap();
        let second = repo.save(deal("  ")).unwrap();

        assert!(!first.id.is_empty());
        assert!(!second.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(repo.list().unwrap().len(), 2);
        assert_eq!(repo.get(&first.id).unwrap(), first);
    }

    #[test]
    fn test_generated_ids_are_unique_across_stores() {
        let morning = InMemoryDealRepository::new();
        let evening = InMemoryDealRepository::new();

        let a = morning.save(VehicleDeal::default()).unwrap();
        let b = evening.save(VehicleDeal::default()).unwrap();

        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(Uuid::parse_str(&b.id).is_ok());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_save_replaces_existing() {
        let repo = InMemoryDealRepository::new();
        repo.save(deal("a")).unwrap();

        let mut updated = deal("a");
        updated.negotiated_price = dec!(18500);
        repo.save(updated).unwrap();

        let deals = repo.list().unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(repo.get("a").unwrap().negotiated_price, dec!(18500));
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let repo = InMemoryDealRepository::with_deals([deal("c"), deal("a"), deal("b")]).unwrap();
        let ids: Vec<String> = repo.list().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delete() {
        let repo = InMemoryDealRepository::with_deals([deal("a"), deal("b")]).unwrap();

        let removed = repo.delete("a").unwrap();
        assert_eq!(removed.id, "a");
        assert_eq!(repo.get("a"), Err(CarFinanceError::NotFound("a".into())));
        assert_eq!(repo.delete("a"), Err(CarFinanceError::NotFound("a".into())));
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let repo: Box<dyn DealRepository> = Box::new(InMemoryDealRepository::new());
        repo.save(deal("x")).unwrap();
        assert_eq!(repo.get("x").unwrap().term_length, 48);
    }
}
