use serde::{Deserialize, Serialize};
use sqlx::mysql::{MySql, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Decode, Type, TypeInfo, ValueRef};

/// Integer column that may be declared signed or unsigned.
///
/// The dialer schema mixes `INT`, `INT UNSIGNED` and `BIGINT UNSIGNED` for
/// the same logical ids across versions, and sqlx refuses to decode an
/// unsigned column into `i64`. Reads go through this wrapper instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbInt(pub i64);

impl DbInt {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<DbInt> for i64 {
    fn from(v: DbInt) -> Self {
        v.0
    }
}

impl Type<MySql> for DbInt {
    fn type_info() -> MySqlTypeInfo {
        <i64 as Type<MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        <i64 as Type<MySql>>::compatible(ty) || <u64 as Type<MySql>>::compatible(ty)
    }
}

impl<'r> Decode<'r, MySql> for DbInt {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let unsigned = value.type_info().name().contains("UNSIGNED");
        if unsigned {
            let v = <u64 as Decode<MySql>>::decode(value)?;
            Ok(DbInt(i64::try_from(v)?))
        } else {
            Ok(DbInt(<i64 as Decode<MySql>>::decode(value)?))
        }
    }
}

/// Convert an `AVG`/`SUM` result (MySQL returns DECIMAL) to a float
pub fn decimal_to_f64(value: Option<rust_decimal::Decimal>) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.and_then(|d| d.to_f64()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&DbInt(42)).unwrap(), "42");
        let parsed: DbInt = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.get(), 7);
    }

    #[test]
    fn decimal_conversion_defaults_to_zero() {
        assert_eq!(decimal_to_f64(None), 0.0);
        assert_eq!(decimal_to_f64(Some(Decimal::from_str("12.5").unwrap())), 12.5);
    }
}
