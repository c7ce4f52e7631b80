#![allow(missing_docs)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Card record as served by the catalog API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub supertype: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolves_from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evolves_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub abilities: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attacks: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<TypeModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resistances: Vec<TypeModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retreat_cost: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_retreat_cost: Option<u32>,
    #[serde(default)]
    pub set: PokemonSet,
    #[serde(default)]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub national_pokedex_numbers: Vec<u32>,
    #[serde(default)]
    pub legalities: Legalities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation_mark: Option<String>,
    #[serde(default)]
    pub images: CardImages,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcgplayer: Option<TcgPlayer>,
    /// Cardmarket data varies per card; kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardmarket: Option<Value>,
}

impl Card {
    /// Market price from the TCGplayer block, if the catalog supplied one.
    pub fn market_price(&self) -> Option<f64> {
        self.tcgplayer
            .as_ref()
            .and_then(|tcg| market_price(&tcg.prices))
    }
}

/// Weakness or resistance against an energy type, e.g. `{"type": "Water", "value": "×2"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeModifier {
    #[serde(rename = "type")]
    pub energy_type: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    #[serde(default)]
    pub small: String,
    #[serde(default)]
    pub large: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Legalities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlimited: Option<String>,
}

/// Expansion set metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub printed_total: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub legalities: Legalities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptcgo_code: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub images: SetImages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetImages {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcgPlayer {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub updated_at: String,
    /// Price blocks keyed by print variant (`holofoil`, `normal`, ...).
    #[serde(default)]
    pub prices: BTreeMap<String, TcgPlayerPrice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcgPlayerPrice {
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
    pub market: Option<f64>,
    pub direct_low: Option<f64>,
}

/// Variants consulted first, in order, when picking a representative price.
const PREFERRED_VARIANTS: [&str; 7] = [
    "holofoil",
    "reverseHolofoil",
    "normal",
    "1stEditionHolofoil",
    "unlimitedHolofoil",
    "1stEditionNormal",
    "unlimitedNormal",
];

/// Pick a single representative price from a set of variant prices.
///
/// Tries `market`, then `mid`, then `low` across the preferred variants before
/// falling back to any other variant. Zero prices count as missing.
pub fn market_price(prices: &BTreeMap<String, TcgPlayerPrice>) -> Option<f64> {
    let fields: [fn(&TcgPlayerPrice) -> Option<f64>; 3] =
        [|p| p.market, |p| p.mid, |p| p.low];

    for field in fields {
        let found = PREFERRED_VARIANTS
            .iter()
            .filter_map(|variant| prices.get(*variant))
            .find_map(|price| nonzero(field(price)));
        if found.is_some() {
            return found;
        }
    }

    prices
        .values()
        .find_map(|price| nonzero(price.market).or(nonzero(price.mid)).or(nonzero(price.low)))
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
