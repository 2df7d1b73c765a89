//! Asset bundles: a quantity per asset, never negative, never zero.
//!
//! Zero entries are dropped on insert so two bundles holding the same assets
//! compare equal regardless of how they were built.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use std::fmt;

use crate::asset::{AssetId, PolicyId};
use crate::error::TypesError;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AssetBundle(BTreeMap<AssetId, u128>);

impl AssetBundle {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A bundle holding only the base currency.
    pub fn base(quantity: u128) -> Self {
        let mut bundle = Self::new();
        bundle.set(AssetId::Base, quantity);
        bundle
    }

    /// Quantity of `asset`, zero when absent.
    pub fn get(&self, asset: &AssetId) -> u128 {
        self.0.get(asset).copied().unwrap_or(0)
    }

    pub fn base_quantity(&self) -> u128 {
        self.get(&AssetId::Base)
    }

    /// Set the quantity of `asset`; zero removes the entry.
    pub fn set(&mut self, asset: AssetId, quantity: u128) {
        if quantity == 0 {
            self.0.remove(&asset);
        } else {
            self.0.insert(asset, quantity);
        }
    }

    /// Add `quantity` of `asset`.
    pub fn add(&mut self, asset: AssetId, quantity: u128) -> Result<(), TypesError> {
        let current = self.get(&asset);
        let total = current
            .checked_add(quantity)
            .ok_or_else(|| TypesError::Overflow(asset.to_string()))?;
        self.set(asset, total);
        Ok(())
    }

    /// Add every entry of `other` into this bundle.
    pub fn merge(&mut self, other: &AssetBundle) -> Result<(), TypesError> {
        for (asset, quantity) in other.iter() {
            self.add(asset.clone(), quantity)?;
        }
        Ok(())
    }

    /// `self - other`, failing on the first asset that would go negative.
    pub fn checked_sub(&self, other: &AssetBundle) -> Result<AssetBundle, TypesError> {
        let mut result = self.clone();
        for (asset, needed) in other.iter() {
            let have = result.get(asset);
            let remaining = have.checked_sub(needed).ok_or_else(|| TypesError::NegativeQuantity {
                asset: asset.to_string(),
                deficit: needed - have,
            })?;
            result.set(asset.clone(), remaining);
        }
        Ok(result)
    }

    /// The bundle minus its base-currency entry.
    pub fn without_base(&self) -> AssetBundle {
        Self(
            self.0
                .iter()
                .filter(|(asset, _)| !asset.is_base())
                .map(|(asset, quantity)| (asset.clone(), *quantity))
                .collect(),
        )
    }

    /// Number of non-base assets.
    pub fn native_asset_count(&self) -> usize {
        self.0.keys().filter(|asset| !asset.is_base()).count()
    }

    /// Distinct policies among the non-base assets.
    pub fn policies(&self) -> BTreeSet<PolicyId> {
        self.0.keys().filter_map(|asset| asset.policy().copied()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, u128)> + '_ {
        self.0.iter().map(|(asset, quantity)| (asset, *quantity))
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.0.contains_key(asset)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum several bundles.
    pub fn sum<'a>(bundles: impl IntoIterator<Item = &'a AssetBundle>) -> Result<Self, TypesError> {
        let mut total = Self::new();
        for bundle in bundles {
            total.merge(bundle)?;
        }
        Ok(total)
    }
}

impl fmt::Debug for AssetBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| (k.to_string(), v)))
            .finish()
    }
}

impl FromIterator<(AssetId, u128)> for AssetBundle {
    fn from_iter<I: IntoIterator<Item = (AssetId, u128)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for (asset, quantity) in iter {
            let total = bundle.get(&asset).saturating_add(quantity);
            bundle.set(asset, total);
        }
        bundle
    }
}

impl IntoIterator for AssetBundle {
    type Item = (AssetId, u128);
    type IntoIter = btree_map::IntoIter<AssetId, u128>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// Quantities travel as decimal strings so values above 2^53 survive JSON.
impl Serialize for AssetBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (asset, quantity) in &self.0 {
            map.serialize_entry(&asset.to_string(), &quantity.to_string())?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireQuantity {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for AssetBundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BundleVisitor;

        impl<'de> Visitor<'de> for BundleVisitor {
            type Value = AssetBundle;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of asset unit to quantity")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<AssetBundle, M::Error> {
                let mut bundle = AssetBundle::new();
                while let Some((unit, quantity)) = access.next_entry::<String, WireQuantity>()? {
                    let asset: AssetId = unit.parse().map_err(de::Error::custom)?;
                    let quantity = match quantity {
                        WireQuantity::Number(n) => n as u128,
                        WireQuantity::Text(s) => s
                            .parse::<u128>()
                            .map_err(|_| de::Error::custom(TypesError::InvalidQuantity(s)))?,
                    };
                    bundle.add(asset, quantity).map_err(de::Error::custom)?;
                }
                Ok(bundle)
            }
        }

        deserializer.deserialize_map(BundleVisitor)
    }
}
