//! Product category enumeration.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a [`ProductCategory`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown product category: {0}")]
pub struct ParseCategoryError(pub String);

/// The fixed set of categories a product can belong to.
///
/// Exchanged on the wire and stored in the database by its symbolic name
/// (`"HomeAppliances"`), never as an ordinal. Deserializing goes through
/// [`FromStr`](std::str::FromStr), so it ignores case the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ProductCategory {
    Electronics,
    HomeAppliances,
    Furniture,
    Accessories,
}

impl ProductCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Electronics,
        Self::HomeAppliances,
        Self::Furniture,
        Self::Accessories,
    ];

    /// The symbolic name used on the wire and in storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::HomeAppliances => "HomeAppliances",
            Self::Furniture => "Furniture",
            Self::Accessories => "Accessories",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = ParseCategoryError;

    /// Parses a symbolic name. Matching ignores ASCII case and surrounding
    /// whitespace, so `"electronics"` is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}

impl TryFrom<String> for ProductCategory {
    type Error = ParseCategoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// SQLx support (with postgres feature). Stored as TEXT.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ProductCategory {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ProductCategory {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
