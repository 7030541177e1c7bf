use crate::error::{ChefError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named alphabet. The base fixes bits per symbol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipe {
    /// Base-64, food emojis.
    Quick,
    /// Base-128, activity emojis.
    Light,
    /// Base-256, smileys.
    #[default]
    Classic,
    /// Base-1024, extended emoji block.
    Gourmet,
}

impl Recipe {
    pub const ALL: [Recipe; 4] = [Recipe::Quick, Recipe::Light, Recipe::Classic, Recipe::Gourmet];

    pub fn name(self) -> &'static str {
        match self {
            Recipe::Quick => "quick",
            Recipe::Light => "light",
            Recipe::Classic => "classic",
            Recipe::Gourmet => "gourmet",
        }
    }

    pub fn base(self) -> u32 {
        match self {
            Recipe::Quick => 64,
            Recipe::Light => 128,
            Recipe::Classic => 256,
            Recipe::Gourmet => 1024,
        }
    }

    pub fn bits_per_symbol(self) -> u8 {
        self.base().trailing_zeros() as u8
    }

    /// First code point of the contiguous glyph range.
    fn start_code(self) -> u32 {
        match self {
            Recipe::Quick => 0x1F345,
            Recipe::Light => 0x1F3B0,
            Recipe::Classic => 0x1F600,
            Recipe::Gourmet => 0x1F900,
        }
    }

    pub fn from_base(base: u32) -> Result<Self> {
        Recipe::ALL
            .into_iter()
            .find(|r| r.base() == base)
            .ok_or_else(|| ChefError::Configuration(format!("unsupported base {base}")))
    }

    /// Smallest-footprint recipe for small inputs, densest for large ones.
    pub fn suggest(size: u64) -> Self {
        match size {
            s if s < 1024 => Recipe::Quick,
            s if s < 10 * 1024 => Recipe::Light,
            s if s < 100 * 1024 => Recipe::Classic,
            _ => Recipe::Gourmet,
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Recipe {
    type Err = ChefError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Recipe::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| ChefError::Configuration(format!("unknown recipe: {s}")))
    }
}

/// Total bijection between `[0, base)` and the recipe's glyphs.
///
/// Glyphs are a contiguous run of Unicode scalar values, so both directions
/// are plain offset arithmetic and the table never has to be materialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    recipe: Recipe,
    start: u32,
}

impl Alphabet {
    pub fn new(recipe: Recipe) -> Self {
        Self {
            recipe,
            start: recipe.start_code(),
        }
    }

    pub fn recipe(&self) -> Recipe {
        self.recipe
    }

    pub fn base(&self) -> u32 {
        self.recipe.base()
    }

    pub fn bits_per_symbol(&self) -> u8 {
        self.recipe.bits_per_symbol()
    }

    pub fn symbol_of(&self, index: u16) -> Result<char> {
        if u32::from(index) >= self.base() {
            return Err(ChefError::Decode(format!(
                "symbol index {index} out of range for base {}",
                self.base()
            )));
        }
        char::from_u32(self.start + u32::from(index)).ok_or_else(|| {
            ChefError::Configuration(format!("no glyph for index {index} in {}", self.recipe))
        })
    }

    pub fn index_of(&self, symbol: char) -> Result<u16> {
        let code = symbol as u32;
        if code < self.start || code - self.start >= self.base() {
            return Err(ChefError::Decode(format!(
                "symbol U+{code:04X} is not in the {} alphabet",
                self.recipe
            )));
        }
        Ok((code - self.start) as u16)
    }

    pub fn render(&self, indices: &[u16]) -> Result<String> {
        let mut out = String::with_capacity(indices.len() * 4);
        for &i in indices {
            out.push(self.symbol_of(i)?);
        }
        Ok(out)
    }

    pub fn parse(&self, symbols: &str) -> Result<Vec<u16>> {
        symbols.chars().map(|c| self.index_of(c)).collect()
    }
}
